// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use base64::prelude::*;
use ed25519_dalek::{Signature, SignatureError, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Ord, PartialOrd)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Player,
    Author,
    Admin,
}

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "Inner: Serialize + DeserializeOwned")]
pub struct JwtPayload<Inner: DeserializeOwned> {
    #[serde(flatten)]
    pub custom_fields: Inner,
    pub sub: String,
    #[serde(default)]
    pub aud: Vec<String>,
    exp: usize,
    iat: usize,
    nbf: usize,
}

impl<Inner: DeserializeOwned> JwtPayload<Inner> {
    pub fn is_valid_now(&self) -> bool {
        let current_time = chrono::Utc::now().timestamp() as usize;
        current_time >= self.nbf && current_time <= self.exp
    }
}

/// Claims the host platform puts into its access tokens.
#[derive(Serialize, Deserialize)]
pub struct AuthJwtPayload {
    pub role: UserRole,
    pub username: String,
}

#[derive(Error, Debug)]
pub enum JwtValidationError {
    #[error("Invalid JWT format")]
    InvalidFormat,
    #[error("Base64 decoding error: {0}")]
    Base64DecodingError(#[from] base64::DecodeError),
    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid JWT signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("JWT parsing error: {0}")]
    ParsingError(#[from] serde_json::Error),
    #[error("JWT is not valid at the current time")]
    InvalidTime,
}

/// Validate a JWT and its signature
fn validate_jwt(token: &str, verifying_key: &VerifyingKey) -> Result<(), JwtValidationError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(JwtValidationError::InvalidFormat);
    }
    let header_segment = segments[0];
    let payload_segment = segments[1];
    let signature_segment = segments[2];

    let decoded_header = BASE64_URL_SAFE.decode(header_segment)?;
    let header = serde_json::from_slice::<JwtHeader>(&decoded_header)?;
    if header.alg != "EdDSA" {
        return Err(JwtValidationError::UnsupportedAlgorithm(header.alg));
    }

    let signature_bytes = BASE64_URL_SAFE.decode(signature_segment)?;
    let signature = Signature::from_slice(&signature_bytes)?;
    let signed_data = format!("{}.{}", header_segment, payload_segment);
    verifying_key.verify(signed_data.as_bytes(), &signature)?;
    Ok(())
}

pub fn parse_and_validate_jwt<T: DeserializeOwned + Serialize>(
    token: &str,
    verifying_key: &VerifyingKey,
) -> Result<JwtPayload<T>, JwtValidationError> {
    validate_jwt(token, verifying_key)?;

    let segments: Vec<&str> = token.split('.').collect();
    let payload_segment = segments[1];

    let decoded_payload = BASE64_URL_SAFE.decode(payload_segment)?;
    let payload: JwtPayload<T> = serde_json::from_slice(&decoded_payload)?;

    if !payload.is_valid_now() {
        return Err(JwtValidationError::InvalidTime);
    }

    Ok(payload)
}

/// Extracts the bearer token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{SigningKey, ed25519::signature::Signer};
    use rand::rngs::OsRng;

    fn admin_claims() -> AuthJwtPayload {
        AuthJwtPayload {
            role: UserRole::Admin,
            username: "admin".to_string(),
        }
    }

    /// Claims valid from `nbf` to `exp`, both relative to now in seconds.
    fn payload(nbf: i64, exp: i64) -> JwtPayload<AuthJwtPayload> {
        let now = chrono::Utc::now().timestamp();
        JwtPayload {
            custom_fields: admin_claims(),
            sub: "1".to_string(),
            aud: Vec::new(),
            exp: (now + exp) as usize,
            iat: (now + nbf) as usize,
            nbf: (now + nbf) as usize,
        }
    }

    /// Signs a token the same way the host platform does.
    fn sign<T: Serialize>(payload: &T, signing_key: &SigningKey) -> String {
        let header = JwtHeader {
            alg: "EdDSA".to_string(),
            typ: "JWT".to_string(),
        };
        let header_segment = BASE64_URL_SAFE.encode(serde_json::to_vec(&header).unwrap());
        let payload_segment = BASE64_URL_SAFE.encode(serde_json::to_vec(payload).unwrap());
        let signing_input = format!("{}.{}", header_segment, payload_segment);
        let signature: Signature = signing_key.sign(signing_input.as_bytes());
        format!(
            "{}.{}",
            signing_input,
            BASE64_URL_SAFE.encode(signature.to_bytes())
        )
    }

    #[test]
    fn test_jwt_validation() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);

        let token = sign(&payload(0, 3600), &signing_key);
        let parsed_payload: JwtPayload<AuthJwtPayload> =
            parse_and_validate_jwt(&token, &verifying_key).expect("Failed to parse JWT");

        assert_eq!(parsed_payload.sub, "1");
        assert_eq!(parsed_payload.custom_fields.role, UserRole::Admin);
        assert_eq!(parsed_payload.custom_fields.username, "admin");
    }

    #[test]
    fn test_jwt_invalid_signature() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let another_signing_key = SigningKey::generate(&mut OsRng);
        let another_verifying_key = VerifyingKey::from(&another_signing_key);

        let token = sign(&payload(0, 3600), &signing_key);
        let result = parse_and_validate_jwt::<AuthJwtPayload>(&token, &another_verifying_key);
        assert!(matches!(
            result,
            Err(JwtValidationError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_jwt_outside_validity_window() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);

        let expired = sign(&payload(-120, -60), &signing_key);
        let result = parse_and_validate_jwt::<AuthJwtPayload>(&expired, &verifying_key);
        assert!(matches!(result, Err(JwtValidationError::InvalidTime)));

        let not_yet_valid = sign(&payload(600, 3600), &signing_key);
        let result = parse_and_validate_jwt::<AuthJwtPayload>(&not_yet_valid, &verifying_key);
        assert!(matches!(result, Err(JwtValidationError::InvalidTime)));
    }

    #[test]
    fn test_jwt_invalid_format() {
        let verifying_key = VerifyingKey::from(&SigningKey::generate(&mut OsRng));
        let result = parse_and_validate_jwt::<AuthJwtPayload>("not-a-token", &verifying_key);
        assert!(matches!(result, Err(JwtValidationError::InvalidFormat)));
    }

    #[test]
    fn test_role_ordering() {
        assert!(UserRole::Admin > UserRole::Author);
        assert!(UserRole::Author > UserRole::Player);
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
    }
}

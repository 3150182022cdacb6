// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use hyper::{Response, StatusCode, header};

use crate::{
    graphql::{AuthenticatedUser, auth::UserRole},
    standings::{ScoreStore, StandingsCalculator},
};

pub const CHAMPS_PATH: &str = "/admin/champs";

fn status_response(status: StatusCode) -> Response<String> {
    let mut resp = Response::new(String::new());
    *resp.status_mut() = status;
    resp
}

/// `GET /admin/champs`: the top accounts of every category as a JSON object.
pub async fn category_champs<S: ScoreStore>(
    calculator: &StandingsCalculator<S>,
    user: Option<&AuthenticatedUser>,
) -> Response<String> {
    match user {
        None => return status_response(StatusCode::UNAUTHORIZED),
        Some(user) if user.role < UserRole::Admin => {
            tracing::warn!("{} tried to open the champions page", user.username);
            return status_response(StatusCode::FORBIDDEN);
        }
        Some(_) => {}
    }

    let champs = match calculator.category_champs().await {
        Ok(champs) => champs,
        Err(e) => {
            tracing::error!("Failed to compute category champions: {e}");
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    match serde_json::to_string(&champs) {
        Ok(body) => {
            let mut resp = Response::new(body);
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("application/json"),
            );
            resp
        }
        Err(e) => {
            tracing::error!("Failed to serialize category champions: {e}");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::{AccountMode, FREEZE_CONFIG_KEY, MemoryStore, memory::test_rows::*};

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new(AccountMode::Users);
        store.users = vec![user(1, "alice"), user(2, "bob")];
        store.challenges = vec![challenge(1, "web", 100), challenge(2, "pwn", 200)];
        store.solves = vec![solve(1, 1, 1, at(10)), solve(2, 2, 2, at(11))];
        store
    }

    fn calculator() -> StandingsCalculator<MemoryStore> {
        StandingsCalculator::new(store())
    }

    fn caller(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            username: "someone".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_requires_admin() {
        let calculator = calculator();

        let anonymous = category_champs(&calculator, None).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let player = caller(UserRole::Player);
        let forbidden = category_champs(&calculator, Some(&player)).await;
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_renders_champions_per_category() {
        let calculator = calculator();
        let admin = caller(UserRole::Admin);

        let resp = category_champs(&calculator, Some(&admin)).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body: serde_json::Value = serde_json::from_str(resp.body()).unwrap();
        let categories: Vec<&String> = body.as_object().unwrap().keys().collect();
        assert_eq!(categories, vec!["pwn", "web"]);
        assert_eq!(body["web"][0]["name"], "alice");
        assert_eq!(body["web"][0]["score"], 100);
        assert_eq!(body["pwn"][0]["account_id"], 2);
        // the champions page uses public visibility rules
        assert!(body["pwn"][0].get("hidden").is_none());
    }

    #[tokio::test]
    async fn test_store_errors_become_500() {
        let mut store = store();
        store.set_config(FREEZE_CONFIG_KEY, "not a timestamp");
        let calculator = StandingsCalculator::new(store);
        let admin = caller(UserRole::Admin);

        let resp = category_champs(&calculator, Some(&admin)).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

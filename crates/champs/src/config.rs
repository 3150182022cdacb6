// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{net::SocketAddr, path::PathBuf};

use thiserror::Error;

use crate::standings::AccountMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub signing_key_file: PathBuf,
    /// Overrides the host's `user_mode` setting when set.
    pub user_mode: Option<AccountMode>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the environment may already be set up
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").ok_or(ConfigError::MissingVariable("DATABASE_URL"))?;

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    name: "LISTEN_ADDR",
                    value,
                })?,
            None => SocketAddr::from(([0, 0, 0, 0, 0, 0, 0, 0], 3000)),
        };

        let signing_key_file =
            PathBuf::from(lookup("SIGNING_KEY_FILE").unwrap_or_else(|| "key.json".to_string()));

        let user_mode = match lookup("CHAMPS_USER_MODE") {
            Some(value) => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "CHAMPS_USER_MODE",
                value,
            })?),
            None => None,
        };

        Ok(Config {
            database_url,
            listen_addr,
            signing_key_file,
            user_mode,
        })
    }
}

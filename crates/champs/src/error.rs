// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandingsError {
    #[error("Cannot determine whether accounts are users or teams (user_mode = {0:?})")]
    InvalidModeConfiguration(Option<String>),
    #[error("Invalid freeze timestamp: {0:?}")]
    InvalidFreezeTimestamp(String),
    #[error(transparent)]
    StoreUnavailable(#[from] diesel::result::Error),
    #[error("Failed to get a database connection: {0}")]
    PoolUnavailable(#[from] diesel_async::pooled_connection::bb8::RunError),
}

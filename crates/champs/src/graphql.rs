// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use juniper::{EmptyMutation, EmptySubscription};
pub use query::Query;

use crate::{
    db::PgStore,
    graphql::auth::{AuthJwtPayload, UserRole, parse_and_validate_jwt},
    standings::StandingsCalculator,
};

pub mod auth;
pub mod handlers;
mod query;

#[derive(Clone)]
pub struct BaseContext {
    pub calculator: Arc<StandingsCalculator<PgStore>>,
    pub verifying_key: ed25519_dalek::VerifyingKey,
}

impl BaseContext {
    /// Resolves the caller from a bearer token. Invalid tokens are treated as anonymous.
    pub fn authenticate(&self, token: &str) -> Option<AuthenticatedUser> {
        match parse_and_validate_jwt::<AuthJwtPayload>(token, &self.verifying_key) {
            Ok(jwt) => Some(AuthenticatedUser {
                username: jwt.custom_fields.username,
                role: jwt.custom_fields.role,
            }),
            Err(e) => {
                tracing::debug!("Ignoring invalid bearer token: {e}");
                None
            }
        }
    }
}

pub struct Context {
    base: BaseContext,
    user: Option<AuthenticatedUser>,
}

impl juniper::Context for Context {}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
    pub role: UserRole,
}

impl Context {
    pub fn new(base: BaseContext, user_details: Option<AuthenticatedUser>) -> Self {
        Self {
            base,
            user: user_details,
        }
    }

    pub fn calculator(&self) -> &StandingsCalculator<PgStore> {
        &self.base.calculator
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Fails unless `user` holds at least `required_role`.
pub fn require_role_min(
    user: Option<&AuthenticatedUser>,
    required_role: UserRole,
) -> juniper::FieldResult<()> {
    match user.map(|u| u.role) {
        Some(user_role) if user_role >= required_role => Ok(()),
        _ => Err(juniper::FieldError::new(
            "Insufficient permissions",
            juniper::Value::null(),
        )),
    }
}

pub type Schema = juniper::RootNode<Query, EmptyMutation<Context>, EmptySubscription<Context>>;

pub fn schema() -> Schema {
    Schema::new(Query, EmptyMutation::new(), EmptySubscription::new())
}

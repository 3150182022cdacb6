// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-category standings.
//!
//! Solves (restricted to one challenge category) and awards (category-less) are
//! aggregated per account, merged into one score per account and ranked by
//! score, then by who reached it first.

pub mod freeze;
pub mod memory;
pub mod ranking;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use juniper::GraphQLEnum;
use serde::Serialize;

use crate::{
    db::models::{Team, User},
    error::StandingsError,
};

pub use freeze::parse_freeze;
pub use memory::MemoryStore;
pub use ranking::{ScoreAggregate, merge_aggregates, rank};

/// Number of rows shown per category on the champions page.
pub const CHAMPS_LIMIT: usize = 10;

pub const FREEZE_CONFIG_KEY: &str = "freeze";
pub const USER_MODE_CONFIG_KEY: &str = "user_mode";

/// Which entity is ranked: individual users or teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountMode {
    Users,
    Teams,
}

impl AccountMode {
    pub fn parse(raw: Option<&str>) -> Result<Self, StandingsError> {
        match raw {
            Some(raw) => raw.parse(),
            None => Err(StandingsError::InvalidModeConfiguration(None)),
        }
    }

    /// Column on solves and awards that holds the account id.
    pub fn account_column(&self) -> &'static str {
        match self {
            AccountMode::Users => "user_id",
            AccountMode::Teams => "team_id",
        }
    }
}

impl FromStr for AccountMode {
    type Err = StandingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" | "user" => Ok(AccountMode::Users),
            "teams" | "team" => Ok(AccountMode::Teams),
            _ => Err(StandingsError::InvalidModeConfiguration(Some(s.to_string()))),
        }
    }
}

/// A ranked identity, either a user or a team depending on the [`AccountMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub external_id: Option<i32>,
    pub bracket_id: Option<i32>,
    pub bracket_name: Option<String>,
    pub hidden: bool,
    pub banned: bool,
    pub email: Option<String>,
    pub website: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
    pub created: DateTime<Utc>,
}

impl From<(User, Option<String>)> for Account {
    fn from((user, bracket_name): (User, Option<String>)) -> Self {
        Account {
            id: user.id,
            name: user.name,
            external_id: user.oauth_id,
            bracket_id: user.bracket_id,
            bracket_name,
            hidden: user.hidden,
            banned: user.banned,
            email: user.email,
            website: user.website,
            affiliation: user.affiliation,
            country: user.country,
            created: user.created,
        }
    }
}

impl From<(Team, Option<String>)> for Account {
    fn from((team, bracket_name): (Team, Option<String>)) -> Self {
        Account {
            id: team.id,
            name: team.name,
            external_id: team.oauth_id,
            bracket_id: team.bracket_id,
            bracket_name,
            hidden: team.hidden,
            banned: team.banned,
            email: team.email,
            website: team.website,
            affiliation: team.affiliation,
            country: team.country,
            created: team.created,
        }
    }
}

/// Additional account columns that can be appended to a standing row.
#[derive(GraphQLEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountField {
    Email,
    Website,
    Affiliation,
    Country,
    Created,
}

impl AccountField {
    pub fn name(&self) -> &'static str {
        match self {
            AccountField::Email => "email",
            AccountField::Website => "website",
            AccountField::Affiliation => "affiliation",
            AccountField::Country => "country",
            AccountField::Created => "created",
        }
    }

    pub fn project(&self, account: &Account) -> Option<String> {
        match self {
            AccountField::Email => account.email.clone(),
            AccountField::Website => account.website.clone(),
            AccountField::Affiliation => account.affiliation.clone(),
            AccountField::Country => account.country.clone(),
            AccountField::Created => Some(account.created.to_rfc3339()),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StandingRow {
    pub account_id: i32,
    pub external_id: Option<i32>,
    pub name: String,
    pub bracket_id: Option<i32>,
    pub bracket_name: Option<String>,
    /// Only present in admin views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banned: Option<bool>,
    pub score: i64,
    #[serde(flatten)]
    pub fields: IndexMap<AccountField, Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsQuery {
    pub category: String,
    pub count: Option<usize>,
    pub bracket_id: Option<i32>,
    pub admin: bool,
    pub fields: Vec<AccountField>,
}

impl StandingsQuery {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn bracket(mut self, bracket_id: i32) -> Self {
        self.bracket_id = Some(bracket_id);
        self
    }

    pub fn admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    pub fn fields(mut self, fields: Vec<AccountField>) -> Self {
        self.fields = fields;
        self
    }
}

/// Everything one standings computation reads, taken from a single consistent view of the store.
#[derive(Debug, Clone, Default)]
pub struct ScoringSnapshot {
    /// Freeze instant the aggregates were restricted to, if any.
    pub cutoff: Option<DateTime<Utc>>,
    /// Solve aggregates for the requested category.
    pub solves: Vec<ScoreAggregate>,
    pub awards: Vec<ScoreAggregate>,
    /// Accounts (with their bracket name) for every account id in `solves` and `awards`.
    pub accounts: Vec<Account>,
}

#[async_trait::async_trait]
pub trait ScoreStore: Send + Sync {
    /// Per-account aggregates of nonzero solves in `category` and of nonzero awards.
    ///
    /// With `apply_freeze`, the `freeze` setting is read in the same read as the
    /// aggregates and only events strictly before it are counted.
    async fn category_snapshot(
        &self,
        category: &str,
        apply_freeze: bool,
    ) -> Result<ScoringSnapshot, StandingsError>;

    /// Distinct challenge categories, in ascending order.
    async fn categories(&self) -> Result<Vec<String>, StandingsError>;
}

pub struct StandingsCalculator<S> {
    store: S,
}

impl<S: ScoreStore> StandingsCalculator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get_category_standings(
        &self,
        query: &StandingsQuery,
    ) -> Result<Vec<StandingRow>, StandingsError> {
        let snapshot = self
            .store
            .category_snapshot(&query.category, !query.admin)
            .await?;
        tracing::debug!(
            category = %query.category,
            solves = snapshot.solves.len(),
            awards = snapshot.awards.len(),
            frozen = snapshot.cutoff.is_some(),
            "Loaded scoring snapshot"
        );

        let merged = merge_aggregates(snapshot.solves.into_iter().chain(snapshot.awards));
        Ok(rank(merged, snapshot.accounts, query))
    }

    pub async fn get_all_categories(&self) -> Result<Vec<String>, StandingsError> {
        self.store.categories().await
    }

    /// Top accounts of every category, keyed by category in category order.
    pub async fn category_champs(
        &self,
    ) -> Result<IndexMap<String, Vec<StandingRow>>, StandingsError> {
        let mut standings = IndexMap::new();
        for category in self.get_all_categories().await? {
            let query = StandingsQuery::new(category.clone()).count(CHAMPS_LIMIT);
            let rows = self.get_category_standings(&query).await?;
            standings.insert(category, rows);
        }
        Ok(standings)
    }
}

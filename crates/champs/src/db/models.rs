// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::*;
use crate::standings::AccountMode;

/* =========================
 * USERS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i32,
    pub oauth_id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
    pub bracket_id: Option<i32>,
    pub hidden: bool,
    pub banned: bool,
    pub team_id: Option<i32>,
    pub created: DateTime<Utc>,
}

/* =========================
 * TEAMS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Team {
    pub id: i32,
    pub oauth_id: Option<i32>,
    pub name: String,
    pub email: Option<String>,
    pub website: Option<String>,
    pub affiliation: Option<String>,
    pub country: Option<String>,
    pub bracket_id: Option<i32>,
    pub hidden: bool,
    pub banned: bool,
    pub created: DateTime<Utc>,
}

/* =========================
 * BRACKETS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = brackets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Bracket {
    pub id: i32,
    pub name: String,
}

/* =========================
 * CHALLENGES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = challenges)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Challenge {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub value: i32,
}

/* =========================
 * SOLVES
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone)]
#[diesel(table_name = solves)]
#[diesel(belongs_to(Challenge))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Solve {
    pub id: i32,
    pub challenge_id: i32,
    pub user_id: Option<i32>,
    pub team_id: Option<i32>,
    pub date: DateTime<Utc>,
}

impl Solve {
    /// The ranked account this solve is credited to.
    pub fn account_id(&self, mode: AccountMode) -> Option<i32> {
        match mode {
            AccountMode::Users => self.user_id,
            AccountMode::Teams => self.team_id,
        }
    }
}

/* =========================
 * AWARDS
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = awards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Award {
    pub id: i32,
    pub user_id: Option<i32>,
    pub team_id: Option<i32>,
    pub name: String,
    // Stored by the host, never used for scoring
    pub category: Option<String>,
    pub value: i32,
    pub date: DateTime<Utc>,
}

impl Award {
    pub fn account_id(&self, mode: AccountMode) -> Option<i32> {
        match mode {
            AccountMode::Users => self.user_id,
            AccountMode::Teams => self.team_id,
        }
    }
}

/* =========================
 * CONFIG
 * ========================= */

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = config)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConfigEntry {
    pub id: i32,
    pub key: String,
    pub value: Option<String>,
}

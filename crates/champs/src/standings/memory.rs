// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use super::{
    Account, AccountMode, FREEZE_CONFIG_KEY, ScoreAggregate, ScoreStore, ScoringSnapshot,
    merge_aggregates, parse_freeze,
};
use crate::{
    db::models::{Award, Bracket, Challenge, ConfigEntry, Solve, Team, User},
    error::StandingsError,
};

/// A [`ScoreStore`] over host rows held in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    mode: AccountMode,
    pub users: Vec<User>,
    pub teams: Vec<Team>,
    pub brackets: Vec<Bracket>,
    pub challenges: Vec<Challenge>,
    pub solves: Vec<Solve>,
    pub awards: Vec<Award>,
    pub config: Vec<ConfigEntry>,
}

impl MemoryStore {
    pub fn new(mode: AccountMode) -> Self {
        Self {
            mode,
            users: Vec::new(),
            teams: Vec::new(),
            brackets: Vec::new(),
            challenges: Vec::new(),
            solves: Vec::new(),
            awards: Vec::new(),
            config: Vec::new(),
        }
    }

    pub fn set_config(&mut self, key: &str, value: &str) {
        self.config.retain(|entry| entry.key != key);
        self.config.push(ConfigEntry {
            id: self.config.iter().map(|e| e.id).max().unwrap_or(0) + 1,
            key: key.to_string(),
            value: Some(value.to_string()),
        });
    }

    fn config_value(&self, key: &str) -> Option<&str> {
        self.config
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.value.as_deref())
    }

    fn solve_scores(&self, category: &str, cutoff: Option<DateTime<Utc>>) -> Vec<ScoreAggregate> {
        let challenges: HashMap<i32, &Challenge> =
            self.challenges.iter().map(|c| (c.id, c)).collect();
        let events = self.solves.iter().filter_map(|solve| {
            let account_id = solve.account_id(self.mode)?;
            let challenge = challenges.get(&solve.challenge_id)?;
            let counts = challenge.value != 0
                && challenge.category == category
                && cutoff.is_none_or(|cutoff| solve.date < cutoff);
            counts.then_some(ScoreAggregate {
                account_id,
                score: challenge.value.into(),
                id: solve.id,
                date: solve.date,
            })
        });
        merge_aggregates(events).into_values().collect()
    }

    fn award_scores(&self, cutoff: Option<DateTime<Utc>>) -> Vec<ScoreAggregate> {
        let events = self.awards.iter().filter_map(|award| {
            let account_id = award.account_id(self.mode)?;
            let counts = award.value != 0 && cutoff.is_none_or(|cutoff| award.date < cutoff);
            counts.then_some(ScoreAggregate {
                account_id,
                score: award.value.into(),
                id: award.id,
                date: award.date,
            })
        });
        merge_aggregates(events).into_values().collect()
    }

    fn bracket_name(&self, bracket_id: Option<i32>) -> Option<String> {
        let bracket_id = bracket_id?;
        self.brackets
            .iter()
            .find(|b| b.id == bracket_id)
            .map(|b| b.name.clone())
    }

    fn accounts(&self, ids: &BTreeSet<i32>) -> Vec<Account> {
        match self.mode {
            AccountMode::Users => self
                .users
                .iter()
                .filter(|u| ids.contains(&u.id))
                .map(|u| Account::from((u.clone(), self.bracket_name(u.bracket_id))))
                .collect(),
            AccountMode::Teams => self
                .teams
                .iter()
                .filter(|t| ids.contains(&t.id))
                .map(|t| Account::from((t.clone(), self.bracket_name(t.bracket_id))))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl ScoreStore for MemoryStore {
    async fn category_snapshot(
        &self,
        category: &str,
        apply_freeze: bool,
    ) -> Result<ScoringSnapshot, StandingsError> {
        let cutoff = if apply_freeze {
            parse_freeze(self.config_value(FREEZE_CONFIG_KEY))?
        } else {
            None
        };
        let solves = self.solve_scores(category, cutoff);
        let awards = self.award_scores(cutoff);
        let ids: BTreeSet<i32> = solves
            .iter()
            .chain(awards.iter())
            .map(|a| a.account_id)
            .collect();
        let accounts = self.accounts(&ids);
        Ok(ScoringSnapshot {
            cutoff,
            solves,
            awards,
            accounts,
        })
    }

    async fn categories(&self) -> Result<Vec<String>, StandingsError> {
        let categories: BTreeSet<&str> =
            self.challenges.iter().map(|c| c.category.as_str()).collect();
        Ok(categories.into_iter().map(str::to_string).collect())
    }
}

/// Row builders shared by the unit tests.
#[cfg(test)]
pub mod test_rows {
    use chrono::{DateTime, Utc};

    use crate::db::models::{Award, Bracket, Challenge, Solve, Team, User};

    pub fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    pub fn user(id: i32, name: &str) -> User {
        User {
            id,
            oauth_id: None,
            name: name.to_string(),
            email: None,
            website: None,
            affiliation: None,
            country: None,
            bracket_id: None,
            hidden: false,
            banned: false,
            team_id: None,
            created: at(0),
        }
    }

    pub fn team(id: i32, name: &str) -> Team {
        Team {
            id,
            oauth_id: None,
            name: name.to_string(),
            email: None,
            website: None,
            affiliation: None,
            country: None,
            bracket_id: None,
            hidden: false,
            banned: false,
            created: at(0),
        }
    }

    pub fn bracket(id: i32, name: &str) -> Bracket {
        Bracket {
            id,
            name: name.to_string(),
        }
    }

    pub fn challenge(id: i32, category: &str, value: i32) -> Challenge {
        Challenge {
            id,
            name: format!("{category}-{id}"),
            category: category.to_string(),
            value,
        }
    }

    pub fn solve(id: i32, user_id: i32, challenge_id: i32, date: DateTime<Utc>) -> Solve {
        Solve {
            id,
            challenge_id,
            user_id: Some(user_id),
            team_id: None,
            date,
        }
    }

    pub fn team_solve(
        id: i32,
        user_id: i32,
        team_id: i32,
        challenge_id: i32,
        date: DateTime<Utc>,
    ) -> Solve {
        Solve {
            id,
            challenge_id,
            user_id: Some(user_id),
            team_id: Some(team_id),
            date,
        }
    }

    pub fn award(id: i32, user_id: i32, value: i32, date: DateTime<Utc>) -> Award {
        Award {
            id,
            user_id: Some(user_id),
            team_id: None,
            name: format!("award-{id}"),
            category: None,
            value,
            date,
        }
    }
}

// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use super::{Account, StandingRow, StandingsQuery};

/// Score of one account from one or more scoring sources, together with its tie-break keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAggregate {
    pub account_id: i32,
    pub score: i64,
    /// Highest event id that contributed to `score`.
    pub id: i32,
    /// Latest event date that contributed to `score`.
    pub date: DateTime<Utc>,
}

impl ScoreAggregate {
    pub fn absorb(&mut self, other: &ScoreAggregate) {
        self.score += other.score;
        self.id = self.id.max(other.id);
        self.date = self.date.max(other.date);
    }
}

/// Sums aggregates that belong to the same account.
///
/// Works both for grouping raw events (one aggregate per event) and for merging
/// already grouped solve and award aggregates.
pub fn merge_aggregates(
    aggregates: impl IntoIterator<Item = ScoreAggregate>,
) -> BTreeMap<i32, ScoreAggregate> {
    let mut merged: BTreeMap<i32, ScoreAggregate> = BTreeMap::new();
    for aggregate in aggregates {
        merged
            .entry(aggregate.account_id)
            .and_modify(|existing| existing.absorb(&aggregate))
            .or_insert(aggregate);
    }
    merged
}

/// Joins merged scores to their accounts, applies bracket and visibility filters,
/// orders by score desc, date asc, id asc and applies the row limit.
pub fn rank(
    merged: BTreeMap<i32, ScoreAggregate>,
    accounts: Vec<Account>,
    query: &StandingsQuery,
) -> Vec<StandingRow> {
    let accounts: HashMap<i32, Account> = accounts.into_iter().map(|a| (a.id, a)).collect();

    // BTreeMap iteration is by account id, so exact ties stay in a stable order
    let mut ranked: Vec<(ScoreAggregate, &Account)> = merged
        .into_values()
        .filter_map(|aggregate| {
            let account = accounts.get(&aggregate.account_id)?;
            Some((aggregate, account))
        })
        .filter(|(_, account)| {
            query
                .bracket_id
                .is_none_or(|bracket_id| account.bracket_id == Some(bracket_id))
        })
        .filter(|(_, account)| query.admin || !(account.hidden || account.banned))
        .collect();

    ranked.sort_by(|(a, _), (b, _)| {
        b.score
            .cmp(&a.score)
            .then(a.date.cmp(&b.date))
            .then(a.id.cmp(&b.id))
    });

    if let Some(count) = query.count {
        ranked.truncate(count);
    }

    ranked
        .into_iter()
        .map(|(aggregate, account)| StandingRow {
            account_id: account.id,
            external_id: account.external_id,
            name: account.name.clone(),
            bracket_id: account.bracket_id,
            bracket_name: account.bracket_name.clone(),
            hidden: query.admin.then_some(account.hidden),
            banned: query.admin.then_some(account.banned),
            score: aggregate.score,
            fields: query
                .fields
                .iter()
                .map(|field| (*field, field.project(account)))
                .collect(),
        })
        .collect()
}

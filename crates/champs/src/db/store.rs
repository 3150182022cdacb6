// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use diesel::{
    prelude::*,
    sql_types::{BigInt, Integer, Nullable, Text, Timestamptz},
};
use diesel_async::{AsyncPgConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};

use super::{
    DbPool,
    models::{Team, User},
    schema::{brackets, challenges, config, teams, users},
};
use crate::{
    error::StandingsError,
    standings::{
        Account, AccountMode, FREEZE_CONFIG_KEY, ScoreAggregate, ScoreStore, ScoringSnapshot,
        USER_MODE_CONFIG_KEY, parse_freeze,
    },
};

#[derive(QueryableByName, Debug)]
struct ScoreRow {
    #[diesel(sql_type = Integer)]
    account_id: i32,
    #[diesel(sql_type = BigInt)]
    score: i64,
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Timestamptz)]
    date: DateTime<Utc>,
}

impl From<ScoreRow> for ScoreAggregate {
    fn from(row: ScoreRow) -> Self {
        ScoreAggregate {
            account_id: row.account_id,
            score: row.score,
            id: row.id,
            date: row.date,
        }
    }
}

/// Postgres-backed [`ScoreStore`] reading the host platform's tables.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    mode: AccountMode,
}

impl PgStore {
    pub fn new(pool: DbPool, mode: AccountMode) -> Self {
        Self { pool, mode }
    }
}

async fn load_solve_scores(
    conn: &mut AsyncPgConnection,
    mode: AccountMode,
    category: &str,
    cutoff: Option<DateTime<Utc>>,
) -> QueryResult<Vec<ScoreAggregate>> {
    let account = mode.account_column();
    let rows = diesel::sql_query(format!(
        "SELECT s.{account} AS account_id, SUM(c.value)::BIGINT AS score, \
         MAX(s.id) AS id, MAX(s.date) AS date \
         FROM solves s JOIN challenges c ON c.id = s.challenge_id \
         WHERE c.value != 0 AND c.category = $1 AND s.{account} IS NOT NULL \
         AND ($2::timestamptz IS NULL OR s.date < $2) \
         GROUP BY s.{account}"
    ))
    .bind::<Text, _>(category)
    .bind::<Nullable<Timestamptz>, _>(cutoff)
    .load::<ScoreRow>(conn)
    .await?;
    Ok(rows.into_iter().map(ScoreAggregate::from).collect())
}

async fn load_award_scores(
    conn: &mut AsyncPgConnection,
    mode: AccountMode,
    cutoff: Option<DateTime<Utc>>,
) -> QueryResult<Vec<ScoreAggregate>> {
    let account = mode.account_column();
    let rows = diesel::sql_query(format!(
        "SELECT a.{account} AS account_id, SUM(a.value)::BIGINT AS score, \
         MAX(a.id) AS id, MAX(a.date) AS date \
         FROM awards a \
         WHERE a.value != 0 AND a.{account} IS NOT NULL \
         AND ($1::timestamptz IS NULL OR a.date < $1) \
         GROUP BY a.{account}"
    ))
    .bind::<Nullable<Timestamptz>, _>(cutoff)
    .load::<ScoreRow>(conn)
    .await?;
    Ok(rows.into_iter().map(ScoreAggregate::from).collect())
}

async fn load_accounts(
    conn: &mut AsyncPgConnection,
    mode: AccountMode,
    ids: Vec<i32>,
) -> QueryResult<Vec<Account>> {
    let accounts = match mode {
        AccountMode::Users => users::table
            .left_join(brackets::table)
            .filter(users::id.eq_any(ids))
            .select((User::as_select(), brackets::name.nullable()))
            .load::<(User, Option<String>)>(conn)
            .await?
            .into_iter()
            .map(Account::from)
            .collect(),
        AccountMode::Teams => teams::table
            .left_join(brackets::table)
            .filter(teams::id.eq_any(ids))
            .select((Team::as_select(), brackets::name.nullable()))
            .load::<(Team, Option<String>)>(conn)
            .await?
            .into_iter()
            .map(Account::from)
            .collect(),
    };
    Ok(accounts)
}

async fn load_config_value(conn: &mut AsyncPgConnection, key: &str) -> QueryResult<Option<String>> {
    let value = config::table
        .filter(config::key.eq(key))
        .select(config::value)
        .first::<Option<String>>(conn)
        .await
        .optional()?;
    Ok(value.flatten())
}

/// Reads the host's `user_mode` setting. Called once at startup.
pub async fn load_account_mode(pool: &DbPool) -> Result<AccountMode, StandingsError> {
    let mut conn = pool.get().await?;
    let raw = load_config_value(&mut conn, USER_MODE_CONFIG_KEY).await?;
    AccountMode::parse(raw.as_deref())
}

#[async_trait::async_trait]
impl ScoreStore for PgStore {
    async fn category_snapshot(
        &self,
        category: &str,
        apply_freeze: bool,
    ) -> Result<ScoringSnapshot, StandingsError> {
        let mode = self.mode;
        let mut conn = self.pool.get().await?;
        let snapshot = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    let cutoff = if apply_freeze {
                        let raw = load_config_value(conn, FREEZE_CONFIG_KEY).await?;
                        parse_freeze(raw.as_deref())?
                    } else {
                        None
                    };
                    let solves = load_solve_scores(conn, mode, category, cutoff).await?;
                    let awards = load_award_scores(conn, mode, cutoff).await?;
                    let ids: BTreeSet<i32> = solves
                        .iter()
                        .chain(awards.iter())
                        .map(|a| a.account_id)
                        .collect();
                    let accounts = if ids.is_empty() {
                        Vec::new()
                    } else {
                        load_accounts(conn, mode, ids.into_iter().collect()).await?
                    };
                    Ok::<_, StandingsError>(ScoringSnapshot {
                        cutoff,
                        solves,
                        awards,
                        accounts,
                    })
                }
                .scope_boxed()
            })
            .await?;
        Ok(snapshot)
    }

    async fn categories(&self) -> Result<Vec<String>, StandingsError> {
        let mut conn = self.pool.get().await?;
        let categories = challenges::table
            .select(challenges::category)
            .distinct()
            .order_by(challenges::category.asc())
            .load::<String>(&mut conn)
            .await?;
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use diesel_async::{SimpleAsyncConnection, pooled_connection::AsyncDieselConnectionManager};

    use super::*;

    // Session-local tables shadow the host's, so nothing outside the test connection changes.
    const FIXTURE: &str = "
        CREATE TEMP TABLE brackets (id INT4 PRIMARY KEY, name VARCHAR NOT NULL);
        CREATE TEMP TABLE users (
            id INT4 PRIMARY KEY, oauth_id INT4, name VARCHAR NOT NULL, email VARCHAR,
            website VARCHAR, affiliation VARCHAR, country VARCHAR, bracket_id INT4,
            hidden BOOL NOT NULL DEFAULT FALSE, banned BOOL NOT NULL DEFAULT FALSE,
            team_id INT4, created TIMESTAMPTZ NOT NULL DEFAULT to_timestamp(0)
        );
        CREATE TEMP TABLE teams (
            id INT4 PRIMARY KEY, oauth_id INT4, name VARCHAR NOT NULL, email VARCHAR,
            website VARCHAR, affiliation VARCHAR, country VARCHAR, bracket_id INT4,
            hidden BOOL NOT NULL DEFAULT FALSE, banned BOOL NOT NULL DEFAULT FALSE,
            created TIMESTAMPTZ NOT NULL DEFAULT to_timestamp(0)
        );
        CREATE TEMP TABLE challenges (
            id INT4 PRIMARY KEY, name VARCHAR NOT NULL, category VARCHAR NOT NULL,
            value INT4 NOT NULL
        );
        CREATE TEMP TABLE solves (
            id INT4 PRIMARY KEY, challenge_id INT4 NOT NULL, user_id INT4, team_id INT4,
            date TIMESTAMPTZ NOT NULL
        );
        CREATE TEMP TABLE awards (
            id INT4 PRIMARY KEY, user_id INT4, team_id INT4, name VARCHAR NOT NULL,
            category VARCHAR, value INT4 NOT NULL, date TIMESTAMPTZ NOT NULL
        );
        CREATE TEMP TABLE config (id INT4 PRIMARY KEY, key VARCHAR NOT NULL, value TEXT);

        INSERT INTO brackets VALUES (1, 'students');
        INSERT INTO users (id, name, bracket_id) VALUES (1, 'alice', 1), (2, 'bob', NULL);
        INSERT INTO challenges VALUES (1, 'web-1', 'web', 100), (2, 'web-2', 'web', 50),
            (3, 'pwn-1', 'pwn', 300), (4, 'web-free', 'web', 0);
        INSERT INTO solves VALUES
            (1, 1, 1, NULL, to_timestamp(100)),
            (2, 2, 1, NULL, to_timestamp(200)),
            (3, 1, 2, NULL, to_timestamp(120)),
            (4, 3, 2, NULL, to_timestamp(130)),
            (5, 4, 2, NULL, to_timestamp(140));
        INSERT INTO awards VALUES (1, 2, NULL, 'bonus', NULL, 25, to_timestamp(300));
        INSERT INTO config VALUES (1, 'freeze', '150');
    ";

    async fn fixture_store() -> PgStore {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        // One connection, so the temp tables stay visible to every query
        let pool = diesel_async::pooled_connection::bb8::Pool::builder()
            .max_size(1)
            .build(manager)
            .await
            .unwrap();
        {
            let mut conn = pool.get().await.unwrap();
            conn.batch_execute(FIXTURE).await.unwrap();
        }
        PgStore::new(pool, AccountMode::Users)
    }

    fn score_of(aggregates: &[ScoreAggregate], account_id: i32) -> Option<(i64, i32)> {
        aggregates
            .iter()
            .find(|a| a.account_id == account_id)
            .map(|a| (a.score, a.id))
    }

    #[tokio::test]
    #[ignore = "needs a Postgres database in DATABASE_URL"]
    async fn test_snapshot_queries_against_postgres() {
        let store = fixture_store().await;

        let full = store.category_snapshot("web", false).await.unwrap();
        assert_eq!(full.cutoff, None);
        assert_eq!(full.solves.len(), 2);
        assert_eq!(score_of(&full.solves, 1), Some((250, 2)));
        assert_eq!(score_of(&full.solves, 2), Some((50, 3)));
        assert_eq!(score_of(&full.awards, 2), Some((25, 1)));
        let mut accounts: Vec<(i32, Option<String>)> = full
            .accounts
            .iter()
            .map(|a| (a.id, a.bracket_name.clone()))
            .collect();
        accounts.sort();
        assert_eq!(
            accounts,
            vec![(1, Some("students".to_string())), (2, None)]
        );

        let frozen = store.category_snapshot("web", true).await.unwrap();
        assert_eq!(frozen.cutoff, DateTime::from_timestamp(150, 0));
        assert_eq!(score_of(&frozen.solves, 1), Some((100, 1)));
        assert_eq!(score_of(&frozen.solves, 2), Some((50, 3)));
        assert!(frozen.awards.is_empty());

        assert_eq!(store.categories().await.unwrap(), vec!["pwn", "web"]);
    }
}

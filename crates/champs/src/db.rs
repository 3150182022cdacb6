// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};

pub mod models;
pub mod schema;
pub mod store;

pub use store::PgStore;

pub type DbPool = diesel_async::pooled_connection::bb8::Pool<AsyncPgConnection>;

pub async fn create_pool(
    database_url: &str,
) -> Result<DbPool, diesel_async::pooled_connection::PoolError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    diesel_async::pooled_connection::bb8::Pool::builder()
        .build(manager)
        .await
}

// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::graphql_object;

use super::Context;
use crate::{
    graphql::handlers::standings::CategoryChampions,
    standings::{AccountField, StandingRow},
};

pub struct Query;

#[graphql_object]
#[graphql(context = Context)]
impl Query {
    fn is_authenticated(context: &Context) -> bool {
        context.is_authenticated()
    }

    async fn categories(context: &Context) -> juniper::FieldResult<Vec<String>> {
        crate::graphql::handlers::standings::get_categories(context).await
    }

    async fn category_standings(
        context: &Context,
        category: String,
        count: Option<i32>,
        bracket_id: Option<i32>,
        admin: Option<bool>,
        fields: Option<Vec<AccountField>>,
    ) -> juniper::FieldResult<Vec<StandingRow>> {
        crate::graphql::handlers::standings::get_category_standings(
            context,
            category,
            count,
            bracket_id,
            admin.unwrap_or(false),
            fields.unwrap_or_default(),
        )
        .await
    }

    async fn category_champs(context: &Context) -> juniper::FieldResult<Vec<CategoryChampions>> {
        crate::graphql::handlers::standings::get_category_champs(context).await
    }
}

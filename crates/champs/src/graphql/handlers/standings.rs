// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use juniper::{GraphQLObject, graphql_object};

use crate::{
    graphql::{AuthenticatedUser, Context, auth::UserRole, require_role_min},
    standings::{AccountField, ScoreStore, StandingRow, StandingsCalculator, StandingsQuery},
};

#[derive(GraphQLObject, Debug, Clone, PartialEq)]
pub struct ProjectedField {
    pub field: AccountField,
    pub value: Option<String>,
}

#[derive(GraphQLObject, Debug, Clone)]
pub struct CategoryChampions {
    pub category: String,
    pub standings: Vec<StandingRow>,
}

#[graphql_object]
impl StandingRow {
    fn account_id(&self) -> i32 {
        self.account_id
    }

    fn external_id(&self) -> Option<i32> {
        self.external_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bracket_id(&self) -> Option<i32> {
        self.bracket_id
    }

    fn bracket_name(&self) -> Option<&str> {
        self.bracket_name.as_deref()
    }

    /// Only set when standings were requested in admin mode.
    fn hidden(&self) -> Option<bool> {
        self.hidden
    }

    /// Only set when standings were requested in admin mode.
    fn banned(&self) -> Option<bool> {
        self.banned
    }

    fn score(&self) -> juniper::FieldResult<i32> {
        graphql_score(self.score)
    }

    fn fields(&self) -> Vec<ProjectedField> {
        self.fields
            .iter()
            .map(|(field, value)| ProjectedField {
                field: *field,
                value: value.clone(),
            })
            .collect()
    }
}

/// GraphQL `Int` is 32 bits wide.
fn graphql_score(score: i64) -> juniper::FieldResult<i32> {
    i32::try_from(score).map_err(|_| {
        juniper::FieldError::new(
            format!("Score {score} does not fit in a GraphQL Int"),
            juniper::Value::null(),
        )
    })
}

fn build_query(
    category: String,
    count: Option<i32>,
    bracket_id: Option<i32>,
    admin: bool,
    fields: Vec<AccountField>,
) -> juniper::FieldResult<StandingsQuery> {
    let count = count
        .map(usize::try_from)
        .transpose()
        .map_err(|_| juniper::FieldError::new("count must not be negative", juniper::Value::null()))?;
    Ok(StandingsQuery {
        category,
        count,
        bracket_id,
        admin,
        fields,
    })
}

pub async fn get_categories(context: &Context) -> juniper::FieldResult<Vec<String>> {
    Ok(context.calculator().get_all_categories().await?)
}

pub async fn get_category_standings(
    context: &Context,
    category: String,
    count: Option<i32>,
    bracket_id: Option<i32>,
    admin: bool,
    fields: Vec<AccountField>,
) -> juniper::FieldResult<Vec<StandingRow>> {
    let query = build_query(category, count, bracket_id, admin, fields)?;
    standings_for(context.calculator(), context.user(), &query).await
}

pub async fn get_category_champs(
    context: &Context,
) -> juniper::FieldResult<Vec<CategoryChampions>> {
    champs_for(context.calculator(), context.user()).await
}

async fn standings_for<S: ScoreStore>(
    calculator: &StandingsCalculator<S>,
    user: Option<&AuthenticatedUser>,
    query: &StandingsQuery,
) -> juniper::FieldResult<Vec<StandingRow>> {
    if query.admin {
        require_role_min(user, UserRole::Admin)?;
    }
    Ok(calculator.get_category_standings(query).await?)
}

async fn champs_for<S: ScoreStore>(
    calculator: &StandingsCalculator<S>,
    user: Option<&AuthenticatedUser>,
) -> juniper::FieldResult<Vec<CategoryChampions>> {
    require_role_min(user, UserRole::Admin)?;
    let champs = calculator.category_champs().await?;
    Ok(champs
        .into_iter()
        .map(|(category, standings)| CategoryChampions {
            category,
            standings,
        })
        .collect())
}

//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; repositories convert them to and
//! from domain types.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{News, ObjectId, ObjectIdError, User};

use super::schema::{news, users};

/// Row conversion failures.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RowConversionError {
    #[error("stored identifier `{id}` is invalid: {source}")]
    Identifier {
        id: String,
        #[source]
        source: ObjectIdError,
    },
    #[error("stored counter {value} is negative")]
    NegativeCounter { value: i32 },
}

fn parse_id(raw: String) -> Result<ObjectId, RowConversionError> {
    raw.parse()
        .map_err(|source| RowConversionError::Identifier { id: raw, source })
}

/// Row read from and written to the `news` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct NewsRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&News> for NewsRow {
    fn from(value: &News) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title.clone(),
            content: value.content.clone(),
            category: value.category.clone(),
            published_at: value.published_at,
        }
    }
}

impl TryFrom<NewsRow> for News {
    type Error = RowConversionError;

    fn try_from(row: NewsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_id(row.id)?,
            title: row.title,
            content: row.content,
            category: row.category,
            published_at: row.published_at,
        })
    }
}

/// Row read from and written to the `users` table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: String,
    pub name: String,
    pub registered_objects: i32,
}

impl From<&User> for UserRow {
    fn from(value: &User) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.clone(),
            // The column is INTEGER; counters past i32::MAX are clamped.
            registered_objects: i32::try_from(value.registered_objects).unwrap_or(i32::MAX),
        }
    }
}

impl TryFrom<UserRow> for User {
    type Error = RowConversionError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let registered_objects = u32::try_from(row.registered_objects).map_err(|_| {
            RowConversionError::NegativeCounter {
                value: row.registered_objects,
            }
        })?;
        Ok(Self {
            id: parse_id(row.id)?,
            name: row.name,
            registered_objects,
        })
    }
}

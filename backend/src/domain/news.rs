//! News item data model.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::ObjectId;

/// A stored news item.
///
/// `published_at` stays empty until the users service confirms the item.
/// The same JSON shape is used for HTTP responses and cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct News {
    /// Identifier assigned at creation.
    #[schema(value_type = String, example = "6737301a2b9c4e1f0a000001")]
    pub id: ObjectId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Free-form category label.
    pub category: String,
    /// Confirmation timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

impl News {
    /// Build a fresh item from `draft` with a newly generated identifier.
    #[must_use]
    pub fn from_draft(draft: NewsDraft) -> Self {
        Self::with_id(ObjectId::generate(), draft)
    }

    /// Build an item from `draft` under an existing identifier.
    #[must_use]
    pub fn with_id(id: ObjectId, draft: NewsDraft) -> Self {
        let NewsDraft {
            title,
            content,
            category,
            published_at,
        } = draft;
        Self {
            id,
            title,
            content,
            category,
            published_at,
        }
    }
}

/// Caller-supplied fields for creating or replacing a news item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsDraft {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Free-form category label.
    pub category: String,
    /// Optional publish timestamp supplied by the caller.
    pub published_at: Option<DateTime<Utc>>,
}

/// Raised when a confirmation timestamp cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised confirmation timestamp `{input}`")]
pub struct TimestampParseError {
    input: String,
}

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a confirmation timestamp.
///
/// RFC 3339 input keeps its offset and is normalised to UTC. Offset-less
/// input is read as UTC.
///
/// # Errors
/// Returns [`TimestampParseError`] when no supported format matches.
///
/// # Examples
/// ```
/// use sportnews::domain::parse_confirmation_timestamp;
///
/// let ts = parse_confirmation_timestamp("2024-11-15T14:17:05+03:00").expect("valid");
/// assert_eq!(ts.to_rfc3339(), "2024-11-15T11:17:05+00:00");
/// ```
pub fn parse_confirmation_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampParseError {
            input: input.to_owned(),
        })
}

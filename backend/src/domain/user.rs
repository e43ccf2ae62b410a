//! User data model.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ObjectId;

/// A registered user and the number of news items confirmed for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier assigned at creation.
    #[schema(value_type = String, example = "67372df1077cd2c1072a883b")]
    pub id: ObjectId,
    /// Display name.
    pub name: String,
    /// Count of creation events processed for this user.
    pub registered_objects: u32,
}

impl User {
    /// Build a new user from `draft` with a fresh identifier and a zero count.
    #[must_use]
    pub fn from_draft(draft: UserDraft) -> Self {
        Self {
            id: ObjectId::generate(),
            name: draft.name,
            registered_objects: 0,
        }
    }

    /// Record one more processed creation event.
    pub const fn register_object(&mut self) {
        self.registered_objects = self.registered_objects.saturating_add(1);
    }
}

/// Caller-supplied fields for creating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDraft {
    /// Display name.
    pub name: String,
}

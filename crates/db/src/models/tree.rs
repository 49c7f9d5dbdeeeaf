//! Family tree entity model and DTOs.

use kintree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `family_trees` table.
///
/// `updated_at` is bumped by every contained mutation (members,
/// relationships, attachments) so tree lists can order by recency.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FamilyTree {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A tree row together with its member count, for list views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreeSummary {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub member_count: i64,
}

/// A shared tree in a user's list: the summary plus the role their
/// membership grants.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SharedTreeSummary {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub member_count: i64,
    pub role: String,
}

/// DTO for creating a tree.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTree {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for partially updating a tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTree {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub description: Option<Option<String>>,
    pub is_public: Option<bool>,
}

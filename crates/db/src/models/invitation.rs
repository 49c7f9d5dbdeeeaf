//! Tree invitation entity model and DTOs.

use kintree_core::invitations::DEFAULT_EXPIRY_DAYS;
use kintree_core::permissions::Role;
use kintree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tree_invitations` table: a single-use token granting a
/// role on a tree to whoever redeems it first.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreeInvitation {
    pub id: DbId,
    pub tree_id: DbId,
    pub token: String,
    pub role: String,
    pub email: Option<String>,
    pub expires_at: Timestamp,
    pub consumed_at: Option<Timestamp>,
    pub consumed_by: Option<DbId>,
    pub created_at: Timestamp,
}

impl TreeInvitation {
    pub fn role_enum(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Viewer)
    }
}

/// DTO for issuing an invitation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitation {
    #[serde(default = "default_role")]
    pub role: Role,
    pub email: Option<String>,
    #[serde(default = "default_expiry_days")]
    pub expires_in_days: i64,
}

fn default_role() -> Role {
    Role::Viewer
}

fn default_expiry_days() -> i64 {
    DEFAULT_EXPIRY_DAYS
}

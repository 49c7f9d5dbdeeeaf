//! Tree membership entity model.

use kintree_core::permissions::Role;
use kintree_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tree_memberships` table: a non-owner user's role on a
/// tree. Unique per (tree, user); the owner never has a membership row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TreeMembership {
    pub id: DbId,
    pub tree_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

impl TreeMembership {
    /// The granted role; roles are only written through [`Role::as_str`],
    /// so unparseable values read as the least-privileged role.
    pub fn role_enum(&self) -> Role {
        Role::parse(&self.role).unwrap_or(Role::Viewer)
    }
}

use sqlx::PgPool;

use kintree_core::permissions::Role;
use kintree_core::types::DbId;

use crate::models::membership::TreeMembership;

const COLUMNS: &str = "id, tree_id, user_id, role, created_at";

/// Repository for tree membership rows. Owners never get a membership row;
/// ownership is recorded on the tree itself.
pub struct MembershipRepo;

impl MembershipRepo {
    pub async fn find_by_tree_and_user(
        pool: &PgPool,
        tree_id: DbId,
        user_id: DbId,
    ) -> Result<Option<TreeMembership>, sqlx::Error> {
        sqlx::query_as::<_, TreeMembership>(&format!(
            "SELECT {COLUMNS} FROM tree_memberships WHERE tree_id = $1 AND user_id = $2"
        ))
        .bind(tree_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &PgPool,
        tree_id: DbId,
        user_id: DbId,
        role: Role,
    ) -> Result<TreeMembership, sqlx::Error> {
        sqlx::query_as::<_, TreeMembership>(&format!(
            "INSERT INTO tree_memberships (tree_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(tree_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
    }

    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role: Role,
    ) -> Result<Option<TreeMembership>, sqlx::Error> {
        sqlx::query_as::<_, TreeMembership>(&format!(
            "UPDATE tree_memberships SET role = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(pool)
        .await
    }

}

use sqlx::PgPool;

use kintree_core::permissions::Role;
use kintree_core::types::{DbId, Timestamp};

use crate::models::invitation::TreeInvitation;

const COLUMNS: &str = "id, tree_id, token, role, email, expires_at, consumed_at, \
     consumed_by, created_at";

/// Repository for single-use invitation tokens.
pub struct InvitationRepo;

impl InvitationRepo {
    pub async fn create(
        pool: &PgPool,
        tree_id: DbId,
        token: &str,
        role: Role,
        email: Option<&str>,
        expires_at: Timestamp,
    ) -> Result<TreeInvitation, sqlx::Error> {
        sqlx::query_as::<_, TreeInvitation>(&format!(
            "INSERT INTO tree_invitations (tree_id, token, role, email, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(tree_id)
        .bind(token)
        .bind(role.as_str())
        .bind(email)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<TreeInvitation>, sqlx::Error> {
        sqlx::query_as::<_, TreeInvitation>(&format!(
            "SELECT {COLUMNS} FROM tree_invitations WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_in_tree(
        pool: &PgPool,
        tree_id: DbId,
        id: DbId,
    ) -> Result<Option<TreeInvitation>, sqlx::Error> {
        sqlx::query_as::<_, TreeInvitation>(&format!(
            "SELECT {COLUMNS} FROM tree_invitations WHERE id = $1 AND tree_id = $2"
        ))
        .bind(id)
        .bind(tree_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_tree(
        pool: &PgPool,
        tree_id: DbId,
    ) -> Result<Vec<TreeInvitation>, sqlx::Error> {
        sqlx::query_as::<_, TreeInvitation>(&format!(
            "SELECT {COLUMNS} FROM tree_invitations WHERE tree_id = $1 ORDER BY created_at DESC"
        ))
        .bind(tree_id)
        .fetch_all(pool)
        .await
    }

    /// Marks the token consumed, but only if it is still unconsumed.
    /// Returns the updated row, or `None` when another redemption won.
    pub async fn mark_consumed(
        pool: &PgPool,
        token: &str,
        user_id: DbId,
    ) -> Result<Option<TreeInvitation>, sqlx::Error> {
        sqlx::query_as::<_, TreeInvitation>(&format!(
            "UPDATE tree_invitations
             SET consumed_at = NOW(), consumed_by = $2
             WHERE token = $1 AND consumed_at IS NULL
             RETURNING {COLUMNS}"
        ))
        .bind(token)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_in_tree(
        pool: &PgPool,
        tree_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tree_invitations WHERE id = $1 AND tree_id = $2")
            .bind(id)
            .bind(tree_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

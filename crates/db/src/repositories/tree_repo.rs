use sqlx::PgPool;

use kintree_core::types::DbId;

use crate::models::tree::{CreateTree, FamilyTree, SharedTreeSummary, TreeSummary, UpdateTree};

const COLUMNS: &str = "id, owner_id, name, description, is_public, created_at, updated_at";

/// Repository for family tree CRUD operations.
pub struct TreeRepo;

impl TreeRepo {
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        data: &CreateTree,
    ) -> Result<FamilyTree, sqlx::Error> {
        sqlx::query_as::<_, FamilyTree>(&format!(
            "INSERT INTO family_trees (owner_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FamilyTree>, sqlx::Error> {
        sqlx::query_as::<_, FamilyTree>(&format!(
            "SELECT {COLUMNS} FROM family_trees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Trees owned by the user, newest activity first, with member counts.
    pub async fn list_owned(pool: &PgPool, owner_id: DbId) -> Result<Vec<TreeSummary>, sqlx::Error> {
        sqlx::query_as::<_, TreeSummary>(
            "SELECT t.id, t.owner_id, t.name, t.description, t.is_public,
                    t.created_at, t.updated_at,
                    (SELECT COUNT(*) FROM family_members m WHERE m.tree_id = t.id) AS member_count
             FROM family_trees t
             WHERE t.owner_id = $1
             ORDER BY t.updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// Trees shared with the user through a membership, with the granted role.
    pub async fn list_shared(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<SharedTreeSummary>, sqlx::Error> {
        sqlx::query_as::<_, SharedTreeSummary>(
            "SELECT t.id, t.owner_id, t.name, t.description, t.is_public,
                    t.created_at, t.updated_at, ms.role,
                    (SELECT COUNT(*) FROM family_members m WHERE m.tree_id = t.id) AS member_count
             FROM family_trees t
             JOIN tree_memberships ms ON ms.tree_id = t.id
             WHERE ms.user_id = $1 AND t.owner_id <> $1
             ORDER BY t.updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateTree,
    ) -> Result<Option<FamilyTree>, sqlx::Error> {
        let Some(current) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let name = data.name.as_deref().unwrap_or(&current.name);
        let description = match &data.description {
            Some(value) => value.as_deref(),
            None => current.description.as_deref(),
        };
        let is_public = data.is_public.unwrap_or(current.is_public);

        sqlx::query_as::<_, FamilyTree>(&format!(
            "UPDATE family_trees
             SET name = $2, description = $3, is_public = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_public)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM family_trees WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bumps `updated_at` so the tree surfaces first in activity-ordered lists.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE family_trees SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

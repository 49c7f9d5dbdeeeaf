use sqlx::PgPool;

use kintree_core::relationships::RelationshipType;
use kintree_core::types::DbId;

use crate::models::relationship::{CreateRelationship, Relationship};

const COLUMNS: &str = "id, tree_id, from_member_id, to_member_id, relationship_type, \
     marriage_date, divorce_date, custom_color, created_at";

/// Repository for relationship edges between family members.
pub struct RelationshipRepo;

impl RelationshipRepo {
    pub async fn create(
        pool: &PgPool,
        tree_id: DbId,
        data: &CreateRelationship,
    ) -> Result<Relationship, sqlx::Error> {
        sqlx::query_as::<_, Relationship>(&format!(
            "INSERT INTO relationships (tree_id, from_member_id, to_member_id,
                 relationship_type, marriage_date, divorce_date, custom_color)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(tree_id)
        .bind(data.from_member_id)
        .bind(data.to_member_id)
        .bind(data.relationship_type.as_str())
        .bind(data.marriage_date)
        .bind(data.divorce_date)
        .bind(&data.custom_color)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_triple(
        pool: &PgPool,
        tree_id: DbId,
        from_member_id: DbId,
        to_member_id: DbId,
        relationship_type: RelationshipType,
    ) -> Result<Option<Relationship>, sqlx::Error> {
        sqlx::query_as::<_, Relationship>(&format!(
            "SELECT {COLUMNS} FROM relationships
             WHERE tree_id = $1 AND from_member_id = $2 AND to_member_id = $3
               AND relationship_type = $4"
        ))
        .bind(tree_id)
        .bind(from_member_id)
        .bind(to_member_id)
        .bind(relationship_type.as_str())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_by_triple(
        pool: &PgPool,
        tree_id: DbId,
        from_member_id: DbId,
        to_member_id: DbId,
        relationship_type: RelationshipType,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM relationships
             WHERE tree_id = $1 AND from_member_id = $2 AND to_member_id = $3
               AND relationship_type = $4",
        )
        .bind(tree_id)
        .bind(from_member_id)
        .bind(to_member_id)
        .bind(relationship_type.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_tree(
        pool: &PgPool,
        tree_id: DbId,
    ) -> Result<Vec<Relationship>, sqlx::Error> {
        sqlx::query_as::<_, Relationship>(&format!(
            "SELECT {COLUMNS} FROM relationships WHERE tree_id = $1 ORDER BY id"
        ))
        .bind(tree_id)
        .fetch_all(pool)
        .await
    }

    /// Edges where the member is the origin (e.g. parent in PARENT_CHILD).
    pub async fn list_from_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<Relationship>, sqlx::Error> {
        sqlx::query_as::<_, Relationship>(&format!(
            "SELECT {COLUMNS} FROM relationships WHERE from_member_id = $1 ORDER BY id"
        ))
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    /// Edges where the member is the target.
    pub async fn list_to_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<Relationship>, sqlx::Error> {
        sqlx::query_as::<_, Relationship>(&format!(
            "SELECT {COLUMNS} FROM relationships WHERE to_member_id = $1 ORDER BY id"
        ))
        .bind(member_id)
        .fetch_all(pool)
        .await
    }
}

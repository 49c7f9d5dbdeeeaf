use sqlx::PgPool;

use kintree_core::types::DbId;

use crate::models::attachment::{CreateFact, Fact};

const COLUMNS: &str = "id, member_id, title, content, date, source, created_at";

/// Repository for inline member facts.
pub struct FactRepo;

impl FactRepo {
    pub async fn create(
        pool: &PgPool,
        member_id: DbId,
        data: &CreateFact,
    ) -> Result<Fact, sqlx::Error> {
        sqlx::query_as::<_, Fact>(&format!(
            "INSERT INTO facts (member_id, title, content, date, source)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(member_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.date)
        .bind(&data.source)
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_member(
        pool: &PgPool,
        member_id: DbId,
        id: DbId,
    ) -> Result<Option<Fact>, sqlx::Error> {
        sqlx::query_as::<_, Fact>(&format!(
            "SELECT {COLUMNS} FROM facts WHERE id = $1 AND member_id = $2"
        ))
        .bind(id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_member(pool: &PgPool, member_id: DbId) -> Result<Vec<Fact>, sqlx::Error> {
        sqlx::query_as::<_, Fact>(&format!(
            "SELECT {COLUMNS} FROM facts WHERE member_id = $1 ORDER BY created_at DESC"
        ))
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM facts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

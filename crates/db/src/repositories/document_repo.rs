use sqlx::PgPool;

use kintree_core::types::DbId;

use crate::models::attachment::{CreateBinaryAttachment, Document};

const COLUMNS: &str =
    "id, member_id, title, description, file_path, file_type, file_size, uploaded_at";

/// Repository for member document attachments.
pub struct DocumentRepo;

impl DocumentRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateBinaryAttachment,
    ) -> Result<Document, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents (member_id, title, description, file_path, file_type, file_size)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        ))
        .bind(data.member_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.file_path)
        .bind(&data.file_type)
        .bind(data.file_size)
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_member(
        pool: &PgPool,
        member_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE id = $1 AND member_id = $2"
        ))
        .bind(id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(&format!(
            "SELECT {COLUMNS} FROM documents WHERE member_id = $1 ORDER BY uploaded_at DESC"
        ))
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use sqlx::PgPool;

use kintree_core::types::DbId;

use crate::models::attachment::{AudioClip, CreateBinaryAttachment};

const COLUMNS: &str = "id, member_id, title, description, file_path, uploaded_at";

/// Repository for member audio clip attachments.
pub struct AudioClipRepo;

impl AudioClipRepo {
    pub async fn create(
        pool: &PgPool,
        data: &CreateBinaryAttachment,
    ) -> Result<AudioClip, sqlx::Error> {
        sqlx::query_as::<_, AudioClip>(&format!(
            "INSERT INTO audio_clips (member_id, title, description, file_path)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(data.member_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.file_path)
        .fetch_one(pool)
        .await
    }

    pub async fn find_for_member(
        pool: &PgPool,
        member_id: DbId,
        id: DbId,
    ) -> Result<Option<AudioClip>, sqlx::Error> {
        sqlx::query_as::<_, AudioClip>(&format!(
            "SELECT {COLUMNS} FROM audio_clips WHERE id = $1 AND member_id = $2"
        ))
        .bind(id)
        .bind(member_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Vec<AudioClip>, sqlx::Error> {
        sqlx::query_as::<_, AudioClip>(&format!(
            "SELECT {COLUMNS} FROM audio_clips WHERE member_id = $1 ORDER BY uploaded_at DESC"
        ))
        .bind(member_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audio_clips WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

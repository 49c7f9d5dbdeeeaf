//! Per-member attachment models: photos, documents, audio clips, and
//! inline facts.
//!
//! Binary attachments store a storage-path indirection, never raw bytes;
//! facts are inline text. All four cascade with their member.

use chrono::NaiveDate;
use kintree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `photos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Photo {
    pub id: DbId,
    pub member_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub uploaded_at: Timestamp,
}

/// A row from the `documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub member_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
    pub uploaded_at: Timestamp,
}

/// A row from the `audio_clips` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AudioClip {
    pub id: DbId,
    pub member_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub uploaded_at: Timestamp,
}

/// A row from the `facts` table: a free-text fact with optional date and
/// source attribution.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fact {
    pub id: DbId,
    pub member_id: DbId,
    pub title: String,
    pub content: String,
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a fact.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFact {
    pub title: String,
    pub content: String,
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
}

/// Metadata accompanying a stored binary, written after the storage
/// collaborator accepts the bytes.
#[derive(Debug, Clone)]
pub struct CreateBinaryAttachment {
    pub member_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
}

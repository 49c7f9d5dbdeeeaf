//! Relationship entity model and DTOs.

use chrono::NaiveDate;
use kintree_core::relationships::RelationshipType;
use kintree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `relationships` table: a directed, typed edge between
/// two members of the same tree. The triple (from, to, type) is unique.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Relationship {
    pub id: DbId,
    pub tree_id: DbId,
    pub from_member_id: DbId,
    pub to_member_id: DbId,
    pub relationship_type: String,
    pub marriage_date: Option<NaiveDate>,
    pub divorce_date: Option<NaiveDate>,
    pub custom_color: Option<String>,
    pub created_at: Timestamp,
}

impl Relationship {
    /// The edge type as the core enum; rows are only ever written through
    /// the typed DTO, so unparseable values cannot occur short of manual
    /// database edits.
    pub fn type_enum(&self) -> Option<RelationshipType> {
        RelationshipType::parse(&self.relationship_type)
    }
}

/// DTO for creating a relationship.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRelationship {
    pub from_member_id: DbId,
    pub to_member_id: DbId,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub marriage_date: Option<NaiveDate>,
    pub divorce_date: Option<NaiveDate>,
    pub custom_color: Option<String>,
}

/// DTO identifying a relationship by its unique triple, for deletion.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RelationshipKey {
    pub from_member_id: DbId,
    pub to_member_id: DbId,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
}

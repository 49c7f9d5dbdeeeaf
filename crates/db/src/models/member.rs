//! Family member entity model and DTOs.

use chrono::NaiveDate;
use kintree_core::relationships::Gender;
use kintree_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `family_members` table.
///
/// A `NULL` position means the member has not been laid out yet; the
/// canvas shows a placeholder until the user drags the node or triggers
/// auto-layout.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FamilyMember {
    pub id: DbId,
    pub tree_id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub death_place: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_path: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FamilyMember {
    /// The member's gender as the core enum; unparseable values read as
    /// `Unknown` rather than erroring (label derivation must not fail).
    pub fn gender_enum(&self) -> Gender {
        Gender::parse(&self.gender).unwrap_or(Gender::Unknown)
    }
}

/// Minimal member info embedded in relationship payloads.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberSummary {
    pub id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub gender: String,
}

/// DTO for creating a member.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub first_name: String,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub death_place: Option<String>,
    pub occupation: Option<String>,
    pub bio: Option<String>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

/// DTO for partially updating a member: omitted fields stay unchanged,
/// explicit nulls clear nullable columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMember {
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub nickname: Option<Option<String>>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub death_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub birth_place: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub death_place: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub occupation: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub profile_picture_path: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub position_x: Option<Option<f64>>,
    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub position_y: Option<Option<f64>>,
}

/// One element of a bulk position batch.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionUpdate {
    pub id: DbId,
    pub position_x: f64,
    pub position_y: f64,
}

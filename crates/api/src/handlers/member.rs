//! Handlers for members nested under `/trees/{tree_id}/members`.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kintree_core::error::CoreError;
use kintree_core::permissions::Capability;
use kintree_core::relationships::{self, Gender};
use kintree_core::types::DbId;
use kintree_db::models::attachment::{AudioClip, Document, Fact, Photo};
use kintree_db::models::member::{CreateMember, FamilyMember, MemberSummary, UpdateMember};
use kintree_db::models::relationship::Relationship;
use kintree_db::repositories::{
    AudioClipRepo, DocumentRepo, FactRepo, MemberRepo, PhotoRepo, RelationshipRepo, TreeRepo,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage;

/// Maximum length for name-like member fields, matching VARCHAR(100).
const MAX_FIELD_LENGTH: usize = 100;
/// Maximum length for places and occupation, matching VARCHAR(200).
const MAX_PLACE_LENGTH: usize = 200;
/// Maximum length for the free-text biography.
const MAX_BIO_LENGTH: usize = 5000;

/// One relationship edge as seen from a specific member, with the
/// counterpart's summary and the derived label.
#[derive(Serialize)]
pub struct RelatedEdge {
    #[serde(flatten)]
    pub relationship: Relationship,
    pub label: String,
    pub lateral: bool,
    pub counterpart: Option<MemberSummary>,
}

/// Full member payload with both relationship directions and all
/// attachment collections.
#[derive(Serialize)]
pub struct MemberDetail {
    #[serde(flatten)]
    pub member: FamilyMember,
    pub relationships_from: Vec<RelatedEdge>,
    pub relationships_to: Vec<RelatedEdge>,
    pub photos: Vec<Photo>,
    pub documents: Vec<Document>,
    pub audio_clips: Vec<AudioClip>,
    pub facts: Vec<Fact>,
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.len() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn validate_create(input: &CreateMember) -> Result<(), CoreError> {
    if input.first_name.trim().is_empty() {
        return Err(CoreError::Validation(
            "first_name must not be empty".into(),
        ));
    }
    check_length("first_name", &input.first_name, MAX_FIELD_LENGTH)?;
    if let Some(last_name) = &input.last_name {
        check_length("last_name", last_name, MAX_FIELD_LENGTH)?;
    }
    if let Some(nickname) = &input.nickname {
        check_length("nickname", nickname, MAX_FIELD_LENGTH)?;
    }
    if let Some(birth_place) = &input.birth_place {
        check_length("birth_place", birth_place, MAX_PLACE_LENGTH)?;
    }
    if let Some(death_place) = &input.death_place {
        check_length("death_place", death_place, MAX_PLACE_LENGTH)?;
    }
    if let Some(occupation) = &input.occupation {
        check_length("occupation", occupation, MAX_PLACE_LENGTH)?;
    }
    if let Some(bio) = &input.bio {
        check_length("bio", bio, MAX_BIO_LENGTH)?;
    }
    Ok(())
}

fn validate_update(input: &UpdateMember) -> Result<(), CoreError> {
    if let Some(first_name) = &input.first_name {
        if first_name.trim().is_empty() {
            return Err(CoreError::Validation(
                "first_name must not be empty".into(),
            ));
        }
        check_length("first_name", first_name, MAX_FIELD_LENGTH)?;
    }
    if let Some(Some(last_name)) = &input.last_name {
        check_length("last_name", last_name, MAX_FIELD_LENGTH)?;
    }
    if let Some(Some(nickname)) = &input.nickname {
        check_length("nickname", nickname, MAX_FIELD_LENGTH)?;
    }
    if let Some(Some(birth_place)) = &input.birth_place {
        check_length("birth_place", birth_place, MAX_PLACE_LENGTH)?;
    }
    if let Some(Some(death_place)) = &input.death_place {
        check_length("death_place", death_place, MAX_PLACE_LENGTH)?;
    }
    if let Some(Some(occupation)) = &input.occupation {
        check_length("occupation", occupation, MAX_PLACE_LENGTH)?;
    }
    if let Some(Some(bio)) = &input.bio {
        check_length("bio", bio, MAX_BIO_LENGTH)?;
    }
    Ok(())
}

/// Annotate one member's edges with labels and counterpart summaries.
fn annotate_edges(
    edges: Vec<Relationship>,
    subject: &FamilyMember,
    summaries: &HashMap<DbId, MemberSummary>,
    counterpart_is_to: bool,
) -> Vec<RelatedEdge> {
    edges
        .into_iter()
        .map(|rel| {
            let counterpart_id = if counterpart_is_to {
                rel.to_member_id
            } else {
                rel.from_member_id
            };
            let counterpart = summaries.get(&counterpart_id).cloned();
            let counterpart_gender = counterpart
                .as_ref()
                .and_then(|s| Gender::parse(&s.gender))
                .unwrap_or(Gender::Unknown);
            let (from_gender, to_gender) = if counterpart_is_to {
                (subject.gender_enum(), counterpart_gender)
            } else {
                (counterpart_gender, subject.gender_enum())
            };
            let (label, lateral) = match rel.type_enum() {
                Some(kind) => (
                    relationships::label(kind, from_gender, to_gender).to_string(),
                    kind.is_lateral(),
                ),
                None => (rel.relationship_type.clone(), false),
            };
            RelatedEdge {
                relationship: rel,
                label,
                lateral,
                counterpart,
            }
        })
        .collect()
}

async fn member_summaries(
    pool: &PgPool,
    tree_id: DbId,
) -> Result<HashMap<DbId, MemberSummary>, AppError> {
    let members = MemberRepo::list_by_tree(pool, tree_id).await?;
    Ok(members
        .into_iter()
        .map(|m| {
            (
                m.id,
                MemberSummary {
                    id: m.id,
                    first_name: m.first_name,
                    last_name: m.last_name,
                    gender: m.gender,
                },
            )
        })
        .collect())
}

/// GET /api/v1/trees/{tree_id}/members
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<Json<Vec<FamilyMember>>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::View).await?;
    let members = MemberRepo::list_by_tree(&state.pool, tree_id).await?;
    Ok(Json(members))
}

/// POST /api/v1/trees/{tree_id}/members
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<CreateMember>,
) -> AppResult<(StatusCode, Json<FamilyMember>)> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;
    validate_create(&input)?;

    let member = MemberRepo::create(&state.pool, tree_id, &input).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/trees/{tree_id}/members/{member_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<MemberDetail>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::View).await?;

    let member = MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let summaries = member_summaries(&state.pool, tree_id).await?;
    let from_edges = RelationshipRepo::list_from_member(&state.pool, member_id).await?;
    let to_edges = RelationshipRepo::list_to_member(&state.pool, member_id).await?;

    let relationships_from = annotate_edges(from_edges, &member, &summaries, true);
    let relationships_to = annotate_edges(to_edges, &member, &summaries, false);

    let photos = PhotoRepo::list_by_member(&state.pool, member_id).await?;
    let documents = DocumentRepo::list_by_member(&state.pool, member_id).await?;
    let audio_clips = AudioClipRepo::list_by_member(&state.pool, member_id).await?;
    let facts = FactRepo::list_by_member(&state.pool, member_id).await?;

    Ok(Json(MemberDetail {
        member,
        relationships_from,
        relationships_to,
        photos,
        documents,
        audio_clips,
        facts,
    }))
}

/// PATCH /api/v1/trees/{tree_id}/members/{member_id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMember>,
) -> AppResult<Json<FamilyMember>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;
    validate_update(&input)?;

    // When the profile picture path changes, the old binary is orphaned.
    let old_picture = match &input.profile_picture_path {
        Some(_) => MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
            .await?
            .and_then(|m| m.profile_picture_path),
        None => None,
    };

    let member = MemberRepo::update(&state.pool, tree_id, member_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    if let Some(old_path) = old_picture {
        if member.profile_picture_path.as_deref() != Some(old_path.as_str()) {
            storage::delete_all_quietly(state.store.as_ref(), &[old_path]).await;
        }
    }

    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok(Json(member))
}

/// DELETE /api/v1/trees/{tree_id}/members/{member_id}
///
/// Relationships (both directions) and attachments cascade via foreign
/// keys; stored binaries are deleted best-effort afterwards.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    let paths = MemberRepo::file_paths_for_member(&state.pool, member_id).await?;

    let deleted = MemberRepo::delete_in_tree(&state.pool, tree_id, member_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }));
    }

    storage::delete_all_quietly(state.store.as_ref(), &paths).await;
    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Handlers for the `/trees` resource.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kintree_core::error::CoreError;
use kintree_core::layout::placeholder_position;
use kintree_core::permissions::{Capability, TreeAccess};
use kintree_core::relationships::{self, Gender};
use kintree_core::types::DbId;
use kintree_db::models::member::FamilyMember;
use kintree_db::models::relationship::Relationship;
use kintree_db::models::tree::{CreateTree, FamilyTree, SharedTreeSummary, TreeSummary, UpdateTree};
use kintree_db::repositories::{MemberRepo, RelationshipRepo, TreeRepo};
use serde::Serialize;

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage;

/// Maximum length for tree names, matching the VARCHAR(100) column.
const MAX_NAME_LENGTH: usize = 100;
/// Maximum length for tree descriptions, matching the VARCHAR(500) column.
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// The caller's trees: owned outright plus shared via membership.
#[derive(Serialize)]
pub struct TreeListResponse {
    pub owned: Vec<TreeSummary>,
    pub shared: Vec<SharedTreeSummary>,
}

/// A member annotated with its effective canvas position. Members without
/// a stored position get a deterministic placeholder (never persisted).
#[derive(Serialize)]
pub struct MemberNode {
    #[serde(flatten)]
    pub member: FamilyMember,
    pub display_x: f64,
    pub display_y: f64,
}

/// A relationship annotated with its derived display label, edge kind,
/// and effective color.
#[derive(Serialize)]
pub struct RelationshipView {
    #[serde(flatten)]
    pub relationship: Relationship,
    pub label: String,
    pub lateral: bool,
    pub color: String,
}

/// Full tree payload: the tree row, the caller's resolved access, and the
/// whole graph with labels.
#[derive(Serialize)]
pub struct TreeDetail {
    #[serde(flatten)]
    pub tree: FamilyTree,
    pub access: TreeAccess,
    pub members: Vec<MemberNode>,
    pub relationships: Vec<RelationshipView>,
}

fn validate_tree_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Tree name must not be empty".into()));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Tree name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_tree_description(description: &str) -> Result<(), CoreError> {
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Tree description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Annotate relationships with labels derived from member genders, the
/// lateral flag, and the effective edge color.
pub(crate) fn annotate_relationships(
    relationships: Vec<Relationship>,
    genders: &HashMap<DbId, Gender>,
) -> Vec<RelationshipView> {
    relationships
        .into_iter()
        .map(|rel| {
            let from_gender = genders
                .get(&rel.from_member_id)
                .copied()
                .unwrap_or(Gender::Unknown);
            let to_gender = genders
                .get(&rel.to_member_id)
                .copied()
                .unwrap_or(Gender::Unknown);
            // Rows always hold a known type; tolerate drift with Unknown-ish defaults.
            let (label, lateral, color) = match rel.type_enum() {
                Some(kind) => (
                    relationships::label(kind, from_gender, to_gender).to_string(),
                    kind.is_lateral(),
                    rel.custom_color
                        .clone()
                        .unwrap_or_else(|| kind.default_color().to_string()),
                ),
                None => (rel.relationship_type.clone(), false, "#888888".to_string()),
            };
            RelationshipView {
                relationship: rel,
                label,
                lateral,
                color,
            }
        })
        .collect()
}

/// GET /api/v1/trees
pub async fn list(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<TreeListResponse>> {
    let owned = TreeRepo::list_owned(&state.pool, user.user_id).await?;
    let shared = TreeRepo::list_shared(&state.pool, user.user_id).await?;
    Ok(Json(TreeListResponse { owned, shared }))
}

/// POST /api/v1/trees
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTree>,
) -> AppResult<(StatusCode, Json<FamilyTree>)> {
    validate_tree_name(&input.name)?;
    if let Some(description) = &input.description {
        validate_tree_description(description)?;
    }
    let tree = TreeRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(tree)))
}

/// GET /api/v1/trees/{tree_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<Json<TreeDetail>> {
    let (tree, access) =
        require_capability(&state.pool, tree_id, user.user_id, Capability::View).await?;

    let members = MemberRepo::list_by_tree(&state.pool, tree_id).await?;
    let relationships = RelationshipRepo::list_by_tree(&state.pool, tree_id).await?;

    let genders: HashMap<DbId, Gender> =
        members.iter().map(|m| (m.id, m.gender_enum())).collect();

    let members = members
        .into_iter()
        .enumerate()
        .map(|(index, member)| {
            let (display_x, display_y) = match (member.position_x, member.position_y) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    let point = placeholder_position(index);
                    (point.x, point.y)
                }
            };
            MemberNode {
                member,
                display_x,
                display_y,
            }
        })
        .collect();

    Ok(Json(TreeDetail {
        tree,
        access,
        members,
        relationships: annotate_relationships(relationships, &genders),
    }))
}

/// PATCH /api/v1/trees/{tree_id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<UpdateTree>,
) -> AppResult<Json<FamilyTree>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Edit).await?;

    if let Some(name) = &input.name {
        validate_tree_name(name)?;
    }
    if let Some(Some(description)) = &input.description {
        validate_tree_description(description)?;
    }

    let tree = TreeRepo::update(&state.pool, tree_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        }))?;
    Ok(Json(tree))
}

/// DELETE /api/v1/trees/{tree_id}
///
/// Cascades through members, relationships, memberships, invitations, and
/// attachments via foreign keys; stored binaries are deleted best-effort
/// after the rows are gone.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Delete).await?;

    let paths = MemberRepo::file_paths_for_tree(&state.pool, tree_id).await?;

    let deleted = TreeRepo::delete(&state.pool, tree_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: tree_id,
        }));
    }

    storage::delete_all_quietly(state.store.as_ref(), &paths).await;
    Ok(StatusCode::NO_CONTENT)
}

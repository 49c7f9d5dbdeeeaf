//! Handlers for relationship edges under `/trees/{tree_id}/relationships`.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kintree_core::error::CoreError;
use kintree_core::permissions::Capability;
use kintree_core::relationships::Gender;
use kintree_core::types::DbId;
use kintree_db::models::relationship::{CreateRelationship, RelationshipKey};
use kintree_db::repositories::{MemberRepo, RelationshipRepo, TreeRepo};

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::handlers::tree::{annotate_relationships, RelationshipView};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/trees/{tree_id}/relationships
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<Json<Vec<RelationshipView>>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::View).await?;

    let members = MemberRepo::list_by_tree(&state.pool, tree_id).await?;
    let genders: HashMap<DbId, Gender> =
        members.iter().map(|m| (m.id, m.gender_enum())).collect();
    let relationships = RelationshipRepo::list_by_tree(&state.pool, tree_id).await?;
    Ok(Json(annotate_relationships(relationships, &genders)))
}

/// POST /api/v1/trees/{tree_id}/relationships
///
/// Both endpoints must be members of the tree; a duplicate
/// (from, to, type) triple is a conflict.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<CreateRelationship>,
) -> AppResult<(StatusCode, Json<RelationshipView>)> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    if input.from_member_id == input.to_member_id {
        return Err(AppError::Core(CoreError::Validation(
            "A relationship must connect two different members".into(),
        )));
    }

    let from = MemberRepo::find_in_tree(&state.pool, tree_id, input.from_member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: input.from_member_id,
        }))?;
    let to = MemberRepo::find_in_tree(&state.pool, tree_id, input.to_member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: input.to_member_id,
        }))?;

    let existing = RelationshipRepo::find_by_triple(
        &state.pool,
        tree_id,
        input.from_member_id,
        input.to_member_id,
        input.relationship_type,
    )
    .await?;
    if existing.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "This relationship already exists".into(),
        )));
    }

    // The uq_ constraint on the triple is the last-resort guard against a
    // concurrent duplicate insert; the classifier turns it into a 409.
    let relationship = RelationshipRepo::create(&state.pool, tree_id, &input).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;

    let genders: HashMap<DbId, Gender> = [
        (from.id, from.gender_enum()),
        (to.id, to.gender_enum()),
    ]
    .into_iter()
    .collect();
    let mut views = annotate_relationships(vec![relationship], &genders);
    // annotate_relationships maps one input row to one view.
    let view = views
        .pop()
        .ok_or_else(|| AppError::InternalError("Relationship annotation failed".into()))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/v1/trees/{tree_id}/relationships
///
/// The triple to remove travels in the request body.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<RelationshipKey>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    let deleted = RelationshipRepo::delete_by_triple(
        &state.pool,
        tree_id,
        input.from_member_id,
        input.to_member_id,
        input.relationship_type,
    )
    .await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Relationship",
            id: input.from_member_id,
        }));
    }

    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Inline fact handlers under `/trees/{tree_id}/members/{member_id}/facts`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kintree_core::error::CoreError;
use kintree_core::permissions::Capability;
use kintree_core::types::DbId;
use kintree_db::models::attachment::{CreateFact, Fact};
use kintree_db::repositories::{FactRepo, MemberRepo, TreeRepo};

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum length for fact titles and sources, matching VARCHAR(200).
const MAX_TITLE_LENGTH: usize = 200;
const MAX_SOURCE_LENGTH: usize = 200;

/// POST /api/v1/trees/{tree_id}/members/{member_id}/facts
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateFact>,
) -> AppResult<(StatusCode, Json<Fact>)> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    if input.title.trim().is_empty() || input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Fact title and content must not be empty".into(),
        )));
    }
    if input.title.len() > MAX_TITLE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Fact title must be at most {MAX_TITLE_LENGTH} characters"
        ))));
    }
    if let Some(source) = &input.source {
        if source.len() > MAX_SOURCE_LENGTH {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Fact source must be at most {MAX_SOURCE_LENGTH} characters"
            ))));
        }
    }

    MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let fact = FactRepo::create(&state.pool, member_id, &input).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok((StatusCode::CREATED, Json(fact)))
}

/// DELETE /api/v1/trees/{tree_id}/members/{member_id}/facts/{fact_id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, member_id, fact_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::ManageMembers).await?;

    MemberRepo::find_in_tree(&state.pool, tree_id, member_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: member_id,
        }))?;

    let fact = FactRepo::find_for_member(&state.pool, member_id, fact_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Fact",
            id: fact_id,
        }))?;

    FactRepo::delete(&state.pool, fact.id).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Canvas position persistence and auto-layout.

use std::collections::{HashMap, HashSet};

use axum::extract::{Path, State};
use axum::Json;
use kintree_core::layout::{self, LayoutEdge, LayoutNode, LayoutOptions, Point};
use kintree_core::permissions::Capability;
use kintree_core::types::DbId;
use kintree_db::models::member::PositionUpdate;
use kintree_db::repositories::{MemberRepo, RelationshipRepo, TreeRepo};
use serde::{Deserialize, Serialize};

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for the bulk position endpoint.
#[derive(Deserialize)]
pub struct PositionBatch {
    pub positions: Vec<PositionUpdate>,
}

/// Response for both position endpoints.
#[derive(Serialize)]
pub struct PositionResponse {
    /// Number of members whose position was written.
    pub applied: u64,
    /// The positions now stored, keyed by member id. Skipped entries
    /// (ids outside the tree) do not appear.
    pub positions: HashMap<DbId, Point>,
}

/// PATCH /api/v1/trees/{tree_id}/positions
///
/// Applies the batch in one transaction. Ids that do not belong to the
/// tree are skipped; the remaining entries still apply.
pub async fn set_positions(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<PositionBatch>,
) -> AppResult<Json<PositionResponse>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Edit).await?;

    let applied_ids = MemberRepo::bulk_set_positions(&state.pool, tree_id, &input.positions).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;

    let applied_ids: HashSet<DbId> = applied_ids.into_iter().collect();
    let positions = input
        .positions
        .iter()
        .filter(|p| applied_ids.contains(&p.id))
        .map(|p| {
            (
                p.id,
                Point {
                    x: p.position_x,
                    y: p.position_y,
                },
            )
        })
        .collect();
    Ok(Json(PositionResponse {
        applied: applied_ids.len() as u64,
        positions,
    }))
}

/// POST /api/v1/trees/{tree_id}/layout
///
/// Computes a fresh layered layout for the whole tree and persists it via
/// the same bulk batch the manual endpoint uses. Layout is CPU-bound, so
/// the computation runs on the blocking pool.
pub async fn auto_layout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<Json<PositionResponse>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Edit).await?;

    let members = MemberRepo::list_by_tree(&state.pool, tree_id).await?;
    let relationships = RelationshipRepo::list_by_tree(&state.pool, tree_id).await?;

    let nodes: Vec<LayoutNode> = members
        .iter()
        .map(|m| LayoutNode::sized_default(m.id))
        .collect();
    let edges: Vec<LayoutEdge> = relationships
        .iter()
        .filter_map(|rel| {
            rel.type_enum().map(|kind| LayoutEdge {
                from: rel.from_member_id,
                to: rel.to_member_id,
                lateral: kind.is_lateral(),
            })
        })
        .collect();

    let positions = tokio::task::spawn_blocking(move || {
        layout::compute_layout(&nodes, &edges, &LayoutOptions::default())
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Layout task failed: {e}")))?;

    // Deterministic write order keeps the transaction's row ordering stable.
    let mut batch: Vec<PositionUpdate> = positions
        .iter()
        .map(|(&id, point)| PositionUpdate {
            id,
            position_x: point.x,
            position_y: point.y,
        })
        .collect();
    batch.sort_by_key(|p| p.id);

    let applied_ids = MemberRepo::bulk_set_positions(&state.pool, tree_id, &batch).await?;
    TreeRepo::touch(&state.pool, tree_id).await?;

    Ok(Json(PositionResponse {
        applied: applied_ids.len() as u64,
        positions,
    }))
}

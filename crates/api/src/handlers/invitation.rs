//! Invitation issuing, validation, and redemption.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use kintree_core::error::CoreError;
use kintree_core::invitations::{
    self, InvitationStatus, ShareLinks,
};
use kintree_core::permissions::{Capability, Role};
use kintree_core::types::DbId;
use kintree_db::models::invitation::{CreateInvitation, TreeInvitation};
use kintree_db::repositories::{InvitationRepo, MembershipRepo, TreeRepo};
use serde::Serialize;
use uuid::Uuid;

use crate::access::require_capability;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Maximum length for invitation emails, matching VARCHAR(254).
const MAX_EMAIL_LENGTH: usize = 254;

/// A freshly issued invitation with its pre-formatted share material.
#[derive(Serialize)]
pub struct IssuedInvitation {
    #[serde(flatten)]
    pub invitation: TreeInvitation,
    pub share: ShareLinks,
}

/// Public validation payload for a token: its lifecycle status plus just
/// enough context to render the join page.
#[derive(Serialize)]
pub struct InvitationCheck {
    pub status: InvitationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    pub tree_name: String,
    pub role: Role,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Result of redeeming a token.
#[derive(Serialize)]
pub struct AcceptedInvitation {
    pub tree_id: DbId,
    /// The role the caller holds on the tree after acceptance.
    pub role: Role,
}

/// GET /api/v1/trees/{tree_id}/invitations
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
) -> AppResult<Json<Vec<TreeInvitation>>> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Invite).await?;
    let invitations = InvitationRepo::list_by_tree(&state.pool, tree_id).await?;
    Ok(Json(invitations))
}

/// POST /api/v1/trees/{tree_id}/invitations
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tree_id): Path<DbId>,
    Json(input): Json<CreateInvitation>,
) -> AppResult<(StatusCode, Json<IssuedInvitation>)> {
    let (tree, _) =
        require_capability(&state.pool, tree_id, user.user_id, Capability::Invite).await?;

    invitations::validate_expiry_days(input.expires_in_days)?;
    if let Some(email) = &input.email {
        if email.len() > MAX_EMAIL_LENGTH {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Email must be at most {MAX_EMAIL_LENGTH} characters"
            ))));
        }
    }

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(input.expires_in_days);

    let invitation = InvitationRepo::create(
        &state.pool,
        tree_id,
        &token,
        input.role,
        input.email.as_deref(),
        expires_at,
    )
    .await?;

    let share = invitations::share_links(
        &state.config.app_base_url,
        &invitation.token,
        &tree.name,
        invitation.expires_at,
    );

    Ok((
        StatusCode::CREATED,
        Json(IssuedInvitation { invitation, share }),
    ))
}

/// DELETE /api/v1/trees/{tree_id}/invitations/{invitation_id}
///
/// Revokes an issued invitation. A consumed invitation stays on record, so
/// revoking it is a conflict rather than a silent delete.
pub async fn revoke(
    State(state): State<AppState>,
    user: AuthUser,
    Path((tree_id, invitation_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    require_capability(&state.pool, tree_id, user.user_id, Capability::Invite).await?;

    let invitation = InvitationRepo::find_in_tree(&state.pool, tree_id, invitation_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id: invitation_id,
        }))?;

    if invitation.consumed_at.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Invitation has already been used and cannot be revoked".into(),
        )));
    }

    InvitationRepo::delete_in_tree(&state.pool, tree_id, invitation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/invitations/{token}
///
/// Public: anyone holding the link can see what it grants before signing in.
pub async fn validate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<InvitationCheck>> {
    let invitation = InvitationRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id: 0,
        }))?;

    let tree = TreeRepo::find_by_id(&state.pool, invitation.tree_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: invitation.tree_id,
        }))?;

    let status =
        InvitationStatus::derive(invitation.expires_at, invitation.consumed_at, Utc::now());

    Ok(Json(InvitationCheck {
        status,
        reason: status.rejection_reason(),
        tree_name: tree.name,
        role: invitation.role_enum(),
        expires_at: invitation.expires_at,
    }))
}

/// POST /api/v1/invitations/{token}/accept
///
/// Consumes the token and grants (or upgrades) the caller's membership.
/// The guarded consume-update runs first, so a token can only ever grant
/// one membership change even under concurrent redemption.
pub async fn accept(
    State(state): State<AppState>,
    user: AuthUser,
    Path(token): Path<String>,
) -> AppResult<Json<AcceptedInvitation>> {
    let invitation = InvitationRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id: 0,
        }))?;

    let tree = TreeRepo::find_by_id(&state.pool, invitation.tree_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tree",
            id: invitation.tree_id,
        }))?;

    invitations::reject_self_accept(tree.owner_id, user.user_id)?;

    let status =
        InvitationStatus::derive(invitation.expires_at, invitation.consumed_at, Utc::now());
    if let Some(reason) = status.rejection_reason() {
        return Err(AppError::Core(CoreError::Conflict(reason.into())));
    }

    let consumed = InvitationRepo::mark_consumed(&state.pool, &token, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Invitation has already been used".into(),
            ))
        })?;

    let invited_role = consumed.role_enum();
    let existing =
        MembershipRepo::find_by_tree_and_user(&state.pool, tree.id, user.user_id).await?;

    let final_role = match existing {
        Some(membership) => {
            let current = membership.role_enum();
            let upgraded = invitations::role_after_accept(current, invited_role);
            if upgraded != current {
                MembershipRepo::update_role(&state.pool, membership.id, upgraded).await?;
            }
            upgraded
        }
        None => {
            MembershipRepo::create(&state.pool, tree.id, user.user_id, invited_role).await?;
            invited_role
        }
    };

    tracing::info!(
        tree_id = tree.id,
        user_id = user.user_id,
        role = final_role.as_str(),
        "Invitation accepted"
    );

    Ok(Json(AcceptedInvitation {
        tree_id: tree.id,
        role: final_role,
    }))
}

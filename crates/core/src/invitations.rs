//! Invitation lifecycle rules and share-link formatting.
//!
//! An invitation is a single-use token: `issued`, then exactly one of
//! consumed / expired / revoked. Expiry is a derived read, not a stored
//! transition -- [`InvitationStatus::derive`] classifies a token from its
//! row fields and the current time. Accepting never downgrades an existing
//! membership role.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::permissions::Role;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Expiry bounds
// ---------------------------------------------------------------------------

/// Default invitation lifetime in days.
pub const DEFAULT_EXPIRY_DAYS: i64 = 7;

/// Minimum invitation lifetime in days.
pub const MIN_EXPIRY_DAYS: i64 = 1;

/// Maximum invitation lifetime in days.
pub const MAX_EXPIRY_DAYS: i64 = 30;

/// Validate a requested invitation lifetime.
pub fn validate_expiry_days(days: i64) -> Result<(), CoreError> {
    if !(MIN_EXPIRY_DAYS..=MAX_EXPIRY_DAYS).contains(&days) {
        return Err(CoreError::Validation(format!(
            "expires_in_days must be between {MIN_EXPIRY_DAYS} and {MAX_EXPIRY_DAYS}, got {days}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status derivation
// ---------------------------------------------------------------------------

/// The derived state of an invitation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    /// Issued, unexpired, unconsumed -- may be accepted.
    Valid,
    /// Past its expiry and never consumed.
    Expired,
    /// Already redeemed.
    Consumed,
}

impl InvitationStatus {
    /// Classify an invitation from its row fields.
    ///
    /// Consumption wins over expiry: a token redeemed before its deadline
    /// stays `Consumed` after the deadline passes.
    pub fn derive(
        expires_at: DateTime<Utc>,
        consumed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if consumed_at.is_some() {
            InvitationStatus::Consumed
        } else if expires_at < now {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Valid
        }
    }

    /// Human-readable reason for a non-valid status.
    pub fn rejection_reason(self) -> Option<&'static str> {
        match self {
            InvitationStatus::Valid => None,
            InvitationStatus::Expired => Some("Invitation has expired"),
            InvitationStatus::Consumed => Some("Invitation has already been used"),
        }
    }
}

// ---------------------------------------------------------------------------
// Role upgrade rule
// ---------------------------------------------------------------------------

/// The role a membership ends up with after accepting an invitation.
///
/// Monotonic: the invitation's role applies only when it outranks the
/// existing one (VIEWER < EDITOR < OWNER), never a downgrade.
pub fn role_after_accept(existing: Role, invited: Role) -> Role {
    existing.max(invited)
}

// ---------------------------------------------------------------------------
// Share-link formatting
// ---------------------------------------------------------------------------

/// Pre-formatted share material for one invitation. Pure string
/// formatting; delivery happens over external channels.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ShareLinks {
    pub invite_url: String,
    pub whatsapp_url: String,
    pub email_subject: String,
    pub email_body: String,
}

/// Build the invite URL and pre-filled message text for an invitation.
pub fn share_links(
    app_base_url: &str,
    token: &str,
    tree_name: &str,
    expires_at: DateTime<Utc>,
) -> ShareLinks {
    let invite_url = format!("{}/invite/{token}", app_base_url.trim_end_matches('/'));
    let message =
        format!("You've been invited to join the family tree \"{tree_name}\"! Click here to join: {invite_url}");

    ShareLinks {
        whatsapp_url: format!("https://wa.me/?text={}", urlencoding::encode(&message)),
        email_subject: format!("Invitation to join family tree: {tree_name}"),
        email_body: format!(
            "You've been invited to view and contribute to the family tree \"{tree_name}\".\n\n\
             Click here to join: {invite_url}\n\n\
             This invitation expires on {}.",
            expires_at.format("%Y-%m-%d")
        ),
        invite_url,
    }
}

/// Returns the Conflict error for a tree owner trying to accept an
/// invitation to their own tree.
pub fn reject_self_accept(owner_id: DbId, accepting_user: DbId) -> Result<(), CoreError> {
    if owner_id == accepting_user {
        return Err(CoreError::Conflict("You already own this tree".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

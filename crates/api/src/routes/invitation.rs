//! Token-addressed invitation routes mounted at `/invitations`.
//!
//! Validation is public by design: the link itself is the credential for
//! seeing what it grants. Acceptance requires authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::invitation;
use crate::state::AppState;

/// Routes mounted at `/invitations`.
///
/// ```text
/// GET  /{token}         -> validate (public)
/// POST /{token}/accept  -> accept (auth required)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(invitation::validate))
        .route("/{token}/accept", post(invitation::accept))
}

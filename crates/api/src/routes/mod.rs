pub mod health;
pub mod invitation;
pub mod tree;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /trees                                            list, create
/// /trees/{tree_id}                                  get (full graph), update, delete
/// /trees/{tree_id}/members                          list, create
/// /trees/{tree_id}/members/{id}                     get (detail), update, delete
/// /trees/{tree_id}/members/{id}/upload              multipart upload (POST)
/// /trees/{tree_id}/members/{id}/media               delete attachment (DELETE)
/// /trees/{tree_id}/members/{id}/facts               create fact (POST)
/// /trees/{tree_id}/members/{id}/facts/{fact_id}     delete fact (DELETE)
/// /trees/{tree_id}/relationships                    list, create, delete-by-triple
/// /trees/{tree_id}/positions                        bulk position batch (PATCH)
/// /trees/{tree_id}/layout                           auto-layout (POST)
/// /trees/{tree_id}/invitations                      list, issue
/// /trees/{tree_id}/invitations/{id}                 revoke (DELETE)
///
/// /invitations/{token}                              validate (public GET)
/// /invitations/{token}/accept                       consume (POST, auth)
///
/// /files/{*path}                                    gated binary serve (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Tree routes (also nest members, relationships, positions, media).
        .nest("/trees", tree::router())
        // Token-addressed invitation endpoints (validate is public).
        .nest("/invitations", invitation::router())
        // View-gated binary serving.
        .route("/files/{*path}", get(handlers::media::serve_file))
}

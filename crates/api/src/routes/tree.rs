//! Route definitions for the `/trees` resource.
//!
//! Nests member, relationship, position, layout, invitation, and media
//! routes under `/trees/{tree_id}/...`.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{fact, invitation, layout, media, member, relationship, tree};
use crate::state::AppState;

/// Routes mounted at `/trees`.
///
/// ```text
/// GET    /                                      -> list
/// POST   /                                      -> create
/// GET    /{tree_id}                             -> get_by_id
/// PATCH  /{tree_id}                             -> update
/// DELETE /{tree_id}                             -> delete
///
/// GET    /{tree_id}/members                     -> list
/// POST   /{tree_id}/members                     -> create
/// GET    /{tree_id}/members/{id}                -> get_by_id
/// PATCH  /{tree_id}/members/{id}                -> update
/// DELETE /{tree_id}/members/{id}                -> delete
/// POST   /{tree_id}/members/{id}/upload         -> upload
/// DELETE /{tree_id}/members/{id}/media          -> delete_media
/// POST   /{tree_id}/members/{id}/facts          -> create fact
/// DELETE /{tree_id}/members/{id}/facts/{fact_id} -> delete fact
///
/// GET    /{tree_id}/relationships               -> list
/// POST   /{tree_id}/relationships               -> create
/// DELETE /{tree_id}/relationships               -> delete (triple in body)
///
/// PATCH  /{tree_id}/positions                   -> bulk position batch
/// POST   /{tree_id}/layout                      -> auto-layout
///
/// GET    /{tree_id}/invitations                 -> list
/// POST   /{tree_id}/invitations                 -> issue
/// DELETE /{tree_id}/invitations/{id}            -> revoke
/// ```
pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(member::list).post(member::create))
        .route(
            "/{id}",
            get(member::get_by_id)
                .patch(member::update)
                .delete(member::delete),
        )
        .route("/{id}/upload", post(media::upload))
        .route("/{id}/media", delete(media::delete_media))
        .route("/{id}/facts", post(fact::create))
        .route("/{id}/facts/{fact_id}", delete(fact::delete));

    Router::new()
        .route("/", get(tree::list).post(tree::create))
        .route(
            "/{tree_id}",
            get(tree::get_by_id)
                .patch(tree::update)
                .delete(tree::delete),
        )
        .nest("/{tree_id}/members", member_routes)
        .route(
            "/{tree_id}/relationships",
            get(relationship::list)
                .post(relationship::create)
                .delete(relationship::delete),
        )
        .route("/{tree_id}/positions", patch(layout::set_positions))
        .route("/{tree_id}/layout", post(layout::auto_layout))
        .route(
            "/{tree_id}/invitations",
            get(invitation::list).post(invitation::create),
        )
        .route(
            "/{tree_id}/invitations/{id}",
            delete(invitation::revoke),
        )
}

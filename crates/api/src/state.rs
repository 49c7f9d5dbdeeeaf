use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::BlobStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kintree_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Binary storage backend for uploaded media.
    pub store: Arc<dyn BlobStore>,
}

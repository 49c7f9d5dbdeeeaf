use crate::types::DbId;

/// Domain error taxonomy shared by the repository and API layers.
///
/// Permission and validation failures are detected before any mutation
/// begins; `Storage` is advisory on delete paths (logged, never blocks the
/// metadata mutation) and blocking on upload paths.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

use thiserror::Error;

use crate::hasher::HashError;

/// Errors surfaced by the user and token repositories.
///
/// Everything propagates to the caller unchanged; this layer performs no
/// retries and no local recovery. Translating these into end-user responses
/// is the embedding application's job.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Create input or a lookup filter failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A lookup expected at most one row but matched several.
    #[error("query matched more than one user")]
    MultipleRecords,

    #[error("user not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("internal error: {0}")]
    Internal(String),
}

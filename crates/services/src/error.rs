//! Shared error types for the services crate.

use thiserror::Error;

use honyaku_core::model::SummaryError;
use storage::repository::StorageError;

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("a session is already active")]
    AlreadyActive,
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

//! Error types for the sync layer.

use crate::store::StoreError;
use libraryapp_remote::RemoteError;
use libraryapp_types::{PendingMutation, ScreenId};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors a sync operation can end with. Every error is terminal for the
/// operation that raised it; nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No usable response from the service.
    #[error("transport error: {0}")]
    Transport(String),

    /// Malformed or unexpected payload.
    #[error("decode error: {0}")]
    Decode(String),

    /// The server rejected the input.
    #[error("rejected by server: {0}")]
    Validation(String),

    /// The target does not exist, remotely or in the local store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Delete blocked by a dependency.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No copies left to check out.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A mutation on the same target is still in flight.
    #[error("already pending: {0}")]
    AlreadyPending(PendingMutation),

    /// Rejected by local pre-validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The owning screen was torn down while the call was in flight; the
    /// result was discarded.
    #[error("screen {0} closed before the operation completed")]
    ScopeClosed(ScreenId),
}

impl SyncError {
    /// Whether re-invoking the operation might succeed. Only transport
    /// failures qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Transport(msg) => SyncError::Transport(msg),
            RemoteError::Decode(msg) => SyncError::Decode(msg),
            RemoteError::Validation(msg) => SyncError::Validation(msg),
            RemoteError::NotFound(msg) => SyncError::NotFound(msg),
            RemoteError::Conflict(msg) => SyncError::Conflict(msg),
            RemoteError::Unavailable(msg) => SyncError::Unavailable(msg),
        }
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => SyncError::NotFound(err.to_string()),
        }
    }
}

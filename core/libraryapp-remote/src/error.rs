//! Error types for remote calls.

use thiserror::Error;

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors a remote call can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// No usable response: connection failure, timeout, unexpected status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The payload is not well-formed JSON or does not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The server rejected the input.
    #[error("rejected by server: {0}")]
    Validation(String),

    /// The target does not exist on the server.
    #[error("not found: {0}")]
    NotFound(String),

    /// A delete was blocked by a dependency (a library still holding books).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No copies left to check out.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Whether re-invoking the same operation might succeed. Only transport
    /// failures qualify; nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

//! Core type definitions for the LibraryApp client.
//!
//! This crate defines the remote-sourced entities the sync layer works with:
//! - Libraries, the books they hold, and loan records
//! - Identifiers (server-assigned library ids, ISBNs, per-screen UUID v7 ids)
//! - Entity and mutation kinds used to gate in-flight mutations
//!
//! Every entity implements [`Record`], which gives the in-memory store a key
//! to index by, a patch type, and a field-level validation hook that runs on
//! every decoded response.

mod book;
mod ids;
mod kind;
mod library;
mod loan;
mod record;

pub use book::{Author, Book, BookDetails, BookPatch, Cover, PLACEHOLDER_ISBN};
pub use ids::{Isbn, LibraryId, ScreenId};
pub use kind::{EntityKind, MutationKind, PendingMutation};
pub use library::{Library, LibraryDraft, LibraryPatch};
pub use loan::{BookRef, LoanRecord, UNKNOWN_AUTHOR};
pub use record::Record;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A decoded record carries a value the client refuses to accept.
    #[error("invalid {entity} field `{field}`: {reason}")]
    InvalidField {
        entity: EntityKind,
        field: &'static str,
        reason: String,
    },
}

impl Error {
    pub(crate) fn empty(entity: EntityKind, field: &'static str) -> Self {
        Error::InvalidField {
            entity,
            field,
            reason: "must not be empty".to_string(),
        }
    }
}

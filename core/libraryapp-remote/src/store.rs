//! Remote store abstraction trait.

use crate::error::RemoteResult;
use async_trait::async_trait;
use libraryapp_types::{Book, Isbn, Library, LibraryDraft, LibraryId, LoanRecord};

/// Typed access to the library-management service.
///
/// Implementations never swallow errors and never retry.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Lists every library.
    async fn list_libraries(&self) -> RemoteResult<Vec<Library>>;

    /// Creates a library and returns the server's canonical record.
    async fn create_library(&self, draft: &LibraryDraft) -> RemoteResult<Library>;

    /// Replaces a library's fields. The server does not echo the result.
    async fn update_library(&self, library: &Library) -> RemoteResult<()>;

    /// Deletes a library.
    async fn delete_library(&self, id: &LibraryId) -> RemoteResult<()>;

    /// Lists the books held by a library.
    async fn list_books(&self, library_id: &LibraryId) -> RemoteResult<Vec<Book>>;

    /// Checks one copy of a book out to a borrower.
    async fn checkout(&self, library_id: &LibraryId, isbn: &Isbn, borrower: &str)
    -> RemoteResult<()>;

    /// Lists the books on loan to a user.
    async fn loans_for_user(&self, username: &str) -> RemoteResult<Vec<LoanRecord>>;
}

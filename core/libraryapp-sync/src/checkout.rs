//! Book checkout: a local availability precondition in front of the
//! controller's mutation path.

use crate::controller::SyncController;
use crate::error::{SyncError, SyncResult};
use crate::store::{EntityStore, StoreError, StoreHandle};
use libraryapp_types::{Book, BookPatch, EntityKind, Isbn, LibraryId, MutationKind, PendingMutation};
use tracing::{info, warn};

/// Checks books out on behalf of a borrower.
pub struct CheckoutWorkflow<'a> {
    controller: &'a SyncController,
}

impl<'a> CheckoutWorkflow<'a> {
    pub fn new(controller: &'a SyncController) -> Self {
        Self { controller }
    }

    /// Checks out one copy of `isbn` from `library_id` for `borrower`.
    ///
    /// The cached copy count is checked first; a book with no copies left is
    /// refused without contacting the server. On success the cached count
    /// drops by one. Whether the call succeeds or the server reports no copies
    /// left, the library's books are then reloaded so the counts converge.
    pub async fn checkout(
        &self,
        library_id: &LibraryId,
        books: &StoreHandle<Book>,
        isbn: &Isbn,
        borrower: &str,
    ) -> SyncResult<()> {
        if books.is_closed().await {
            return Err(SyncError::ScopeClosed(books.screen()));
        }

        let cached = books.get(isbn.as_str()).await.ok_or_else(|| StoreError::NotFound {
            entity: EntityKind::Book,
            key: isbn.to_string(),
        })?;
        if !cached.is_available() {
            info!("Refusing checkout of {}: no copies left", isbn);
            return Err(SyncError::Unavailable(format!(
                "\"{}\" has no copies left",
                cached.title
            )));
        }

        let borrower = borrower.trim();
        if borrower.is_empty() {
            return Err(SyncError::InvalidInput("borrower name is required".to_string()));
        }

        let mutation = PendingMutation::new(
            EntityKind::Book,
            format!("{}/{}", library_id, isbn),
            MutationKind::Checkout,
        );
        let key = isbn.to_string();
        let result = self
            .controller
            .mutate(
                books,
                mutation,
                self.controller.remote().checkout(library_id, isbn, borrower),
                move |s, _: &()| take_copy(s, &key),
            )
            .await;

        if matches!(result, Ok(()) | Err(SyncError::Unavailable(_))) {
            if let Err(e) = self.controller.load_books(library_id, books).await {
                warn!("Reload of library {} books after checkout failed: {}", library_id, e);
            }
        }
        result
    }
}

/// Lowers the cached copy count by one, never below zero.
fn take_copy(store: &mut EntityStore<Book>, isbn: &str) -> Result<(), StoreError> {
    let available = store
        .get(isbn)
        .map(|book| book.available)
        .ok_or_else(|| StoreError::NotFound {
            entity: EntityKind::Book,
            key: isbn.to_string(),
        })?;
    if available == 0 {
        warn!("Cached count for {} already at zero after checkout", isbn);
    }
    store.patch(isbn, BookPatch::available(available.saturating_sub(1)))?;
    Ok(())
}

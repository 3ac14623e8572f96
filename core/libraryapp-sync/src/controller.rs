//! Sync controller: one logical operation at a time, reconciled into a
//! screen's store.
//!
//! Every operation follows the same sequence: scope check, pending signal,
//! remote call, store reconciliation, terminal signal. Failures leave the
//! store exactly as it was. A result that lands after its screen closed is
//! discarded and the operation collapses back to `Idle`. After any successful mutation the controller re-fetches the whole
//! collection so derived server state (ordering, counts) converges.

use crate::error::{SyncError, SyncResult};
use crate::gate::PendingGate;
use crate::status::{NullSink, Operation, OperationState, StatusSink, SyncEvent};
use crate::store::{EntityStore, StoreError, StoreHandle};
use libraryapp_remote::{RemoteResult, RemoteStore};
use libraryapp_types::{
    Book, EntityKind, Library, LibraryDraft, LibraryId, LibraryPatch, LoanRecord, MutationKind,
    PendingMutation, Record, ScreenId,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates loads and mutations against the remote store.
pub struct SyncController {
    remote: Arc<dyn RemoteStore>,
    gate: PendingGate,
    sink: Arc<dyn StatusSink>,
}

impl SyncController {
    /// Creates a controller that reports to no one.
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self::with_sink(remote, Arc::new(NullSink))
    }

    /// Creates a controller that publishes transitions to `sink`.
    pub fn with_sink(remote: Arc<dyn RemoteStore>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            remote,
            gate: PendingGate::new(),
            sink,
        }
    }

    /// The remote store calls go to.
    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// The in-flight mutation gate.
    pub fn gate(&self) -> &PendingGate {
        &self.gate
    }

    // ── Loads ────────────────────────────────────────────────────

    /// Fetches every library and replaces the store's contents.
    pub async fn load_libraries(&self, store: &StoreHandle<Library>) -> SyncResult<Vec<Library>> {
        self.load(store, self.remote.list_libraries()).await
    }

    /// Fetches the books of one library and replaces the store's contents.
    pub async fn load_books(
        &self,
        library_id: &LibraryId,
        store: &StoreHandle<Book>,
    ) -> SyncResult<Vec<Book>> {
        self.load(store, self.remote.list_books(library_id)).await
    }

    /// Fetches the loans of a user and replaces the store's contents.
    pub async fn load_loans(
        &self,
        username: &str,
        store: &StoreHandle<LoanRecord>,
    ) -> SyncResult<Vec<LoanRecord>> {
        let username = username.trim();
        if username.is_empty() {
            return Err(SyncError::InvalidInput("username is required".to_string()));
        }
        self.load(store, self.remote.loans_for_user(username)).await
    }

    async fn load<T, F>(&self, store: &StoreHandle<T>, fetch: F) -> SyncResult<Vec<T>>
    where
        T: Record,
        F: Future<Output = RemoteResult<Vec<T>>>,
    {
        let generation = self.open_generation(store).await?;
        let operation = Operation::Load(T::KIND);
        let screen = store.screen();
        self.publish(screen, operation.clone(), OperationState::Pending);

        let result = self.reconcile_load(store, generation, fetch).await;
        match &result {
            Ok(records) => info!("Loaded {} {} records for screen {}", records.len(), T::KIND, screen),
            Err(e) => warn!("Load of {} for screen {} failed: {}", T::KIND, screen, e),
        }

        self.settle(screen, operation, &result);
        result
    }

    async fn reconcile_load<T, F>(
        &self,
        store: &StoreHandle<T>,
        generation: u64,
        fetch: F,
    ) -> SyncResult<Vec<T>>
    where
        T: Record,
        F: Future<Output = RemoteResult<Vec<T>>>,
    {
        let records = fetch.await?;

        let mut guard = store.write().await;
        ensure_current(&*guard, generation)?;
        guard.replace_all(records);
        Ok(guard.list().to_vec())
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Creates a library. The server's canonical record goes to the front of
    /// the store, then the collection is reloaded.
    pub async fn create_library(
        &self,
        store: &StoreHandle<Library>,
        draft: LibraryDraft,
    ) -> SyncResult<Library> {
        let mutation =
            PendingMutation::new(EntityKind::Library, draft.name.clone(), MutationKind::Create);
        let created = self
            .mutate(
                store,
                mutation,
                self.remote.create_library(&draft),
                |s, library: &Library| {
                    s.insert_front(library.clone());
                    Ok(())
                },
            )
            .await?;

        self.reload_libraries(store).await;
        Ok(created)
    }

    /// Updates a library. The server does not echo the record, so the store
    /// is patched with the fields that were sent, then reloaded.
    pub async fn update_library(
        &self,
        store: &StoreHandle<Library>,
        id: &LibraryId,
        draft: LibraryDraft,
    ) -> SyncResult<()> {
        let mutation = PendingMutation::new(EntityKind::Library, id.as_str(), MutationKind::Update);
        let library = Library::from_draft(id.clone(), draft.clone());
        let key = id.to_string();

        self.mutate(
            store,
            mutation,
            self.remote.update_library(&library),
            move |s, _: &()| s.patch(&key, LibraryPatch::from(draft)).map(|_| ()),
        )
        .await?;

        self.reload_libraries(store).await;
        Ok(())
    }

    /// Deletes a library. It leaves the store only once the server confirms.
    pub async fn delete_library(
        &self,
        store: &StoreHandle<Library>,
        id: &LibraryId,
    ) -> SyncResult<()> {
        let mutation = PendingMutation::new(EntityKind::Library, id.as_str(), MutationKind::Delete);
        let key = id.to_string();

        self.mutate(
            store,
            mutation,
            self.remote.delete_library(id),
            move |s, _: &()| s.remove(&key).map(|_| ()),
        )
        .await?;

        self.reload_libraries(store).await;
        Ok(())
    }

    async fn reload_libraries(&self, store: &StoreHandle<Library>) {
        if let Err(e) = self.load_libraries(store).await {
            warn!("Reload after library mutation failed: {}", e);
        }
    }

    /// Gated mutation pipeline shared by every mutating operation: `call` is
    /// the remote request, `apply` reconciles its result into the store.
    /// Nothing is sent for a closed screen or a target already in flight.
    pub(crate) async fn mutate<T, R, F, A>(
        &self,
        store: &StoreHandle<T>,
        mutation: PendingMutation,
        call: F,
        apply: A,
    ) -> SyncResult<R>
    where
        T: Record,
        F: Future<Output = RemoteResult<R>>,
        A: FnOnce(&mut EntityStore<T>, &R) -> Result<(), StoreError>,
    {
        let generation = self.open_generation(store).await?;
        let guard = self.gate.try_acquire(mutation)?;
        let operation = Operation::Mutation(guard.mutation().clone());
        let screen = store.screen();
        self.publish(screen, operation.clone(), OperationState::Pending);

        let result = self.reconcile_mutation(store, generation, call, apply).await;
        match &result {
            Ok(_) => info!("Applied {}", guard.mutation()),
            Err(e) => warn!("{} failed: {}", guard.mutation(), e),
        }
        drop(guard);

        self.settle(screen, operation, &result);
        result
    }

    async fn reconcile_mutation<T, R, F, A>(
        &self,
        store: &StoreHandle<T>,
        generation: u64,
        call: F,
        apply: A,
    ) -> SyncResult<R>
    where
        T: Record,
        F: Future<Output = RemoteResult<R>>,
        A: FnOnce(&mut EntityStore<T>, &R) -> Result<(), StoreError>,
    {
        let value = call.await?;

        let mut guard = store.write().await;
        ensure_current(&*guard, generation)?;
        if let Err(e) = apply(&mut *guard, &value) {
            // The remote change went through; the reload that follows converges.
            warn!("Local reconciliation skipped: {}", e);
        }
        Ok(value)
    }

    // ── Shared plumbing ──────────────────────────────────────────

    /// Generation to check results against, or `ScopeClosed` if the screen
    /// is already gone.
    async fn open_generation<T: Record>(&self, store: &StoreHandle<T>) -> SyncResult<u64> {
        let guard = store.read().await;
        if guard.is_closed() {
            return Err(SyncError::ScopeClosed(guard.screen()));
        }
        Ok(guard.generation())
    }

    fn publish(&self, screen: ScreenId, operation: Operation, state: OperationState) {
        self.sink.publish(SyncEvent {
            screen,
            operation,
            state,
        });
    }

    /// Publishes the terminal state. A discarded result resets the operation
    /// to `Idle`; there is no screen left to show it to.
    fn settle<T>(&self, screen: ScreenId, operation: Operation, result: &SyncResult<T>) {
        let state = match result {
            Ok(_) => OperationState::Succeeded,
            Err(SyncError::ScopeClosed(_)) => OperationState::Idle,
            Err(e) => OperationState::Failed(e.clone()),
        };
        self.publish(screen, operation, state);
    }
}

/// Fails with `ScopeClosed` if the store was torn down since `generation`.
fn ensure_current<T: Record>(store: &EntityStore<T>, generation: u64) -> SyncResult<()> {
    if store.generation() != generation {
        debug!("Discarding {} result for closed screen {}", T::KIND, store.screen());
        return Err(SyncError::ScopeClosed(store.screen()));
    }
    Ok(())
}

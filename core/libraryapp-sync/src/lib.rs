//! Client-side sync layer for LibraryApp.
//!
//! Keeps per-screen in-memory copies of remote collections consistent with
//! the library-management service.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Store**: [`EntityStore`], one per (screen, entity type), owned by the
//!   screen through a [`StoreHandle`] and torn down with it
//! - **Gate**: [`PendingGate`], at most one in-flight mutation per target
//! - **Controller**: [`SyncController`], runs loads and mutations and
//!   reconciles their results into a store
//! - **Checkout**: [`CheckoutWorkflow`], the controller's mutation path behind
//!   a local availability check
//! - **Status**: [`StatusSink`], where `Pending`/`Succeeded`/`Failed`
//!   transitions are published
//!
//! ## Operation lifecycle
//!
//! 1. **Scope**: operations on a closed store fail with `ScopeClosed` at once
//! 2. **Gate**: mutations register their target or fail with `AlreadyPending`
//! 3. **Pending**: the transition is published
//! 4. **Remote call**: the only suspension point; no store lock is held
//! 5. **Reconcile**: the result is applied if the store's generation still
//!    matches, and discarded with `ScopeClosed` otherwise
//! 6. **Settle**: the terminal state is published (`Idle` for a discarded
//!    result)
//! 7. **Converge**: successful mutations reload the whole collection
//!
//! # Example
//!
//! ```no_run
//! use libraryapp_remote::{HttpRemote, RemoteConfig};
//! use libraryapp_sync::{StoreHandle, SyncController};
//! use libraryapp_types::{Library, ScreenId};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let remote = HttpRemote::new(RemoteConfig::default())?;
//! let controller = SyncController::new(Arc::new(remote));
//!
//! let libraries: StoreHandle<Library> = StoreHandle::new(ScreenId::new());
//! let loaded = controller.load_libraries(&libraries).await?;
//! println!("{} libraries", loaded.len());
//! # Ok(())
//! # }
//! ```

mod checkout;
mod controller;
mod error;
mod gate;
mod status;
mod store;

pub use checkout::CheckoutWorkflow;
pub use controller::SyncController;
pub use error::{SyncError, SyncResult};
pub use gate::{PendingGate, PendingGuard};
pub use status::{
    ChannelSink, NullSink, Operation, OperationState, StatusBoard, StatusSink, SyncEvent,
};
pub use store::{EntityStore, StoreError, StoreHandle};

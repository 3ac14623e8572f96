//! Operation status reporting.
//!
//! Each logical operation moves `Idle -> Pending -> {Succeeded, Failed}`.
//! The controller publishes the `Pending` and terminal transitions as
//! [`SyncEvent`]s to a [`StatusSink`] supplied by the screen layer. An
//! operation whose screen closed mid-flight is reset with an `Idle` event.

use crate::error::SyncError;
use libraryapp_types::{EntityKind, PendingMutation, ScreenId};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

/// A logical operation a screen can observe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Full fetch of one collection.
    Load(EntityKind),
    /// A remote mutation.
    Mutation(PendingMutation),
}

/// State of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(SyncError),
}

impl OperationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Succeeded | OperationState::Failed(_))
    }
}

/// A state transition reported to the screen layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEvent {
    pub screen: ScreenId,
    pub operation: Operation,
    pub state: OperationState,
}

/// Receives operation transitions. Called synchronously from the
/// controller; implementations must not block.
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: SyncEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn publish(&self, _event: SyncEvent) {}
}

/// Forwards events over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelSink {
    /// Creates a sink and the receiver the screen layer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StatusSink for ChannelSink {
    fn publish(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            debug!("Status receiver dropped, event discarded");
        }
    }
}

/// Keeps the latest state per (screen, operation). Terminal states are
/// single-shot: [`StatusBoard::take`] hands them out once and collapses the
/// entry back to `Idle`.
#[derive(Debug, Default)]
pub struct StatusBoard {
    states: Mutex<HashMap<(ScreenId, Operation), OperationState>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state without consuming it.
    pub fn state(&self, screen: ScreenId, operation: &Operation) -> OperationState {
        self.lock()
            .get(&(screen, operation.clone()))
            .cloned()
            .unwrap_or_default()
    }

    /// Consumes a terminal state, leaving the operation `Idle`. `Pending` and
    /// `Idle` are returned without being reset.
    pub fn take(&self, screen: ScreenId, operation: &Operation) -> OperationState {
        let mut states = self.lock();
        let key = (screen, operation.clone());
        match states.get(&key) {
            Some(state) if state.is_terminal() => states.remove(&key).unwrap_or_default(),
            Some(state) => state.clone(),
            None => OperationState::Idle,
        }
    }

    /// Drops every entry of a torn-down screen.
    pub fn forget_screen(&self, screen: ScreenId) {
        self.lock().retain(|(s, _), _| *s != screen);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(ScreenId, Operation), OperationState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StatusSink for StatusBoard {
    fn publish(&self, event: SyncEvent) {
        let key = (event.screen, event.operation);
        let mut states = self.lock();
        if event.state == OperationState::Idle {
            states.remove(&key);
        } else {
            states.insert(key, event.state);
        }
    }
}

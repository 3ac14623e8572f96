//! Single-in-flight gate for mutations.

use crate::error::{SyncError, SyncResult};
use libraryapp_types::{EntityKind, PendingMutation};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Tracks the mutations currently in flight and rejects a second one on the
/// same `(entity kind, target id)`. Rejected attempts are not queued.
#[derive(Debug, Clone, Default)]
pub struct PendingGate {
    in_flight: Arc<Mutex<HashSet<(EntityKind, String)>>>,
}

impl PendingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mutation, or fails with `AlreadyPending` if its target is
    /// taken. The slot is released when the returned guard is dropped.
    pub fn try_acquire(&self, mutation: PendingMutation) -> SyncResult<PendingGuard> {
        let key = (mutation.entity, mutation.target_id.clone());
        if !self.lock().insert(key) {
            warn!("Rejected {}: a mutation on the same target is in flight", mutation);
            return Err(SyncError::AlreadyPending(mutation));
        }
        debug!("Pending {}", mutation);
        Ok(PendingGuard {
            gate: self.clone(),
            mutation,
        })
    }

    /// Whether a mutation on this target is in flight.
    pub fn is_pending(&self, entity: EntityKind, target_id: &str) -> bool {
        self.lock().contains(&(entity, target_id.to_string()))
    }

    /// Number of mutations in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<(EntityKind, String)>> {
        // The set stays consistent even if a holder panicked.
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Holds a gate slot for one round trip.
#[derive(Debug)]
pub struct PendingGuard {
    gate: PendingGate,
    mutation: PendingMutation,
}

impl PendingGuard {
    pub fn mutation(&self) -> &PendingMutation {
        &self.mutation
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let (entity, target) = self.mutation.gate_key();
        self.gate.lock().remove(&(entity, target.to_string()));
        debug!("Released {}", self.mutation);
    }
}

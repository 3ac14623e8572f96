//! Per-screen entity stores.
//!
//! An [`EntityStore`] holds the authoritative in-memory copy of one
//! collection for the lifetime of the screen that created it. It keeps
//! records in display order and indexes them by [`Record::key`]. Identified
//! records never have two live entries with the same key; loan listings are
//! kept entry for entry.
//!
//! [`StoreHandle`] is the shared form handed to the controller. Screens read
//! through it; only the controller writes. Locks are taken only around
//! reconciliation, never across a remote call.

use libraryapp_types::{EntityKind, Record, ScreenId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Errors reported by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} {key} is not in the store")]
    NotFound { entity: EntityKind, key: String },
}

/// In-memory collection of one entity type, scoped to a screen.
#[derive(Debug, Clone)]
pub struct EntityStore<T: Record> {
    screen: ScreenId,
    /// Records in display order.
    records: Vec<T>,
    /// Key -> position in `records`.
    index: HashMap<String, usize>,
    /// Bumped on teardown; results started under an older generation are
    /// discarded.
    generation: u64,
    closed: bool,
}

impl<T: Record> EntityStore<T> {
    /// Creates an empty store for a screen.
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            records: Vec::new(),
            index: HashMap::new(),
            generation: 0,
            closed: false,
        }
    }

    /// The screen that owns this store.
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Replaces the whole collection with a fresh remote listing, in server
    /// order. For identified records a key repeated in `records` keeps its
    /// first position and its last value; other records are kept as listed.
    pub fn replace_all(&mut self, records: Vec<T>) {
        self.records.clear();
        self.index.clear();
        for record in records {
            let key = record.key();
            match self.index.get(&key) {
                Some(&pos) if T::IDENTIFIED => self.records[pos] = record,
                Some(_) => self.records.push(record),
                None => {
                    self.index.insert(key, self.records.len());
                    self.records.push(record);
                }
            }
        }
        debug!(
            "Replaced {} store for screen {} ({} records)",
            T::KIND,
            self.screen,
            self.records.len()
        );
    }

    /// Inserts a record at the front. An existing identified record with the
    /// same key is replaced and moved to the front.
    pub fn insert_front(&mut self, record: T) {
        if T::IDENTIFIED {
            if let Some(pos) = self.index.get(&record.key()).copied() {
                self.records.remove(pos);
            }
        }
        self.records.insert(0, record);
        self.reindex();
    }

    /// Applies a partial update. Never inserts.
    pub fn patch(&mut self, key: &str, patch: T::Patch) -> Result<&T, StoreError> {
        let pos = self.position(key)?;
        self.records[pos].apply(patch);
        Ok(&self.records[pos])
    }

    /// Removes a record and returns it.
    pub fn remove(&mut self, key: &str) -> Result<T, StoreError> {
        let pos = self.position(key)?;
        let record = self.records.remove(pos);
        self.reindex();
        Ok(record)
    }

    /// Looks a record up by key. With repeated keys, the first entry wins.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }

    /// Whether a record with this key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Records in display order.
    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the owning screen has been torn down.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Tears the store down with its screen: drops the records and bumps the
    /// generation so in-flight results are discarded.
    pub fn close(&mut self) {
        self.records.clear();
        self.index.clear();
        self.generation += 1;
        self.closed = true;
        debug!("Closed {} store for screen {}", T::KIND, self.screen);
    }

    fn position(&self, key: &str) -> Result<usize, StoreError> {
        self.index.get(key).copied().ok_or_else(|| StoreError::NotFound {
            entity: T::KIND,
            key: key.to_string(),
        })
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, record) in self.records.iter().enumerate() {
            self.index.entry(record.key()).or_insert(pos);
        }
    }
}

/// Shared handle to a screen's [`EntityStore`].
pub struct StoreHandle<T: Record> {
    screen: ScreenId,
    inner: Arc<RwLock<EntityStore<T>>>,
}

impl<T: Record> Clone for StoreHandle<T> {
    fn clone(&self) -> Self {
        Self {
            screen: self.screen,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> StoreHandle<T> {
    /// Creates the store for a newly mounted screen.
    pub fn new(screen: ScreenId) -> Self {
        Self {
            screen,
            inner: Arc::new(RwLock::new(EntityStore::new(screen))),
        }
    }

    /// The screen that owns the store.
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    /// Creates the store for a screen mounted with records already on hand.
    pub fn with_records(screen: ScreenId, records: Vec<T>) -> Self {
        let mut store = EntityStore::new(screen);
        store.replace_all(records);
        Self {
            screen,
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, EntityStore<T>> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, EntityStore<T>> {
        self.inner.write().await
    }

    /// Clones the records in display order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.list().to_vec()
    }

    /// Clones one record.
    pub async fn get(&self, key: &str) -> Option<T> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation()
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.read().await.is_closed()
    }

    /// Tears the store down with its screen.
    pub async fn close(&self) {
        self.inner.write().await.close();
    }
}

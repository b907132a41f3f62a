//! In-memory room metadata shared by several clients.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::host::{HostError, Metadata, MetadataStore, Result};

/// Shared metadata store. Clones see the same room.
///
/// Every successful `set` is echoed to all subscribers, the writer included,
/// as the full merged mapping.
#[derive(Clone)]
pub struct MemoryRoom {
    inner: Arc<RoomInner>,
}

struct RoomInner {
    metadata: RwLock<Metadata>,
    changes: broadcast::Sender<Metadata>,
    reject_writes: AtomicBool,
}

impl MemoryRoom {
    pub fn new() -> Self {
        Self::with_metadata(Metadata::new())
    }

    /// Room that already carries state, e.g. from an earlier session.
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self::with_capacity(metadata, 64)
    }

    pub fn with_capacity(metadata: Metadata, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(RoomInner {
                metadata: RwLock::new(metadata),
                changes,
                reject_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Makes every following `set` fail until switched back.
    pub fn reject_writes(&self, reject: bool) {
        self.inner.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Copy of the current mapping.
    pub fn metadata(&self) -> Result<Metadata> {
        self.inner
            .metadata
            .read()
            .map(|metadata| metadata.clone())
            .map_err(|_| HostError::LockPoisoned)
    }
}

impl Default for MemoryRoom {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataStore for MemoryRoom {
    async fn get(&self) -> Result<Metadata> {
        self.metadata()
    }

    async fn set(&self, patch: Metadata) -> Result<()> {
        if self.inner.reject_writes.load(Ordering::SeqCst) {
            return Err(HostError::rejected("set metadata", "room is read-only"));
        }

        let merged = {
            let mut metadata = self
                .inner
                .metadata
                .write()
                .map_err(|_| HostError::LockPoisoned)?;
            metadata.extend(patch);
            metadata.clone()
        };

        if self.inner.changes.send(merged).is_err() {
            tracing::trace!(target: "tracker::host", "metadata change with no subscribers");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Metadata> {
        self.inner.changes.subscribe()
    }
}

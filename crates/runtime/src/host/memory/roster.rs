//! In-memory scene roster.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracker_core::ItemId;

use crate::host::{HostError, ItemPatch, Result, Roster, RosterItem};

/// Scene items shared by every client in a room. Clones share the scene.
#[derive(Clone)]
pub struct MemoryRoster {
    inner: Arc<RosterInner>,
}

struct RosterInner {
    items: RwLock<Vec<RosterItem>>,
    changes: broadcast::Sender<Vec<RosterItem>>,
}

impl MemoryRoster {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(RosterInner {
                items: RwLock::new(Vec::new()),
                changes,
            }),
        }
    }

    /// Adds an item, replacing any item with the same id.
    pub fn spawn(&self, item: RosterItem) -> Result<()> {
        self.mutate(|items| {
            items.retain(|existing| existing.id != item.id);
            items.push(item);
            true
        })
    }

    /// Deletes an item. Returns whether it existed.
    pub fn delete(&self, id: &ItemId) -> Result<bool> {
        let mut existed = false;
        self.mutate(|items| {
            let before = items.len();
            items.retain(|item| &item.id != id);
            existed = items.len() != before;
            existed
        })?;
        Ok(existed)
    }

    pub fn item(&self, id: &ItemId) -> Result<Option<RosterItem>> {
        let items = self.inner.items.read().map_err(|_| HostError::LockPoisoned)?;
        Ok(items.iter().find(|item| &item.id == id).cloned())
    }

    pub fn snapshot(&self) -> Result<Vec<RosterItem>> {
        self.inner
            .items
            .read()
            .map(|items| items.clone())
            .map_err(|_| HostError::LockPoisoned)
    }

    /// Applies `change` and broadcasts the new list when it reports a change.
    fn mutate(&self, change: impl FnOnce(&mut Vec<RosterItem>) -> bool) -> Result<()> {
        let updated = {
            let mut items = self
                .inner
                .items
                .write()
                .map_err(|_| HostError::LockPoisoned)?;
            change(&mut items).then(|| items.clone())
        };

        if let Some(items) = updated
            && self.inner.changes.send(items).is_err()
        {
            tracing::trace!(target: "tracker::host", "roster change with no subscribers");
        }
        Ok(())
    }
}

impl Default for MemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Roster for MemoryRoster {
    async fn items(&self) -> Result<Vec<RosterItem>> {
        self.snapshot()
    }

    async fn update_items(&self, patches: Vec<ItemPatch>) -> Result<()> {
        self.mutate(|items| {
            let mut touched = false;
            for patch in patches {
                if let Some(item) = items.iter_mut().find(|item| item.id == patch.id) {
                    item.border = Some(patch.border);
                    touched = true;
                }
            }
            touched
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<RosterItem>> {
        self.inner.changes.subscribe()
    }
}

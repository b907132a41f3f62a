//! Seams to the host platform.
//!
//! The session worker only talks to the host through these traits. Every
//! subscription hands out a broadcast receiver; the worker forwards them into
//! its own queue.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::error::Result;
use super::types::{ContextMenu, ContextMenuClick, ItemPatch, Metadata, RosterItem, Severity};

/// Key-value store shared by every client in the room.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Full current mapping.
    async fn get(&self) -> Result<Metadata>;

    /// Merges `patch` into the mapping. Keys not in the patch are kept.
    async fn set(&self, patch: Metadata) -> Result<()>;

    /// Full mapping after every change, including changes made by this
    /// client.
    fn subscribe(&self) -> broadcast::Receiver<Metadata>;
}

/// Scene items visible to every client.
#[async_trait]
pub trait Roster: Send + Sync {
    async fn items(&self) -> Result<Vec<RosterItem>>;

    async fn update_items(&self, patches: Vec<ItemPatch>) -> Result<()>;

    /// Full item list after every change.
    fn subscribe(&self) -> broadcast::Receiver<Vec<RosterItem>>;
}

/// Per-player input: current selection and context-menu clicks.
#[async_trait]
pub trait SelectionSource: Send + Sync {
    async fn selection(&self) -> Result<Vec<RosterItem>>;

    async fn register_context_menu(&self, menu: ContextMenu) -> Result<()>;

    fn subscribe_clicks(&self) -> broadcast::Receiver<ContextMenuClick>;
}

/// Fire-and-forget user notifications.
pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, severity: Severity);
}

//! Host platform abstraction.
//!
//! [`traits`] defines what the tracker needs from a virtual tabletop and
//! [`memory`] provides in-process implementations used by tests and the demo
//! shell.

mod error;
pub mod memory;
mod traits;
mod types;

pub use error::{HostError, Result};
pub use memory::{MemoryRoom, MemoryRoster, MemorySelection, RecordingNotifier, TracingNotifier};
pub use traits::{MetadataStore, Notifier, Roster, SelectionSource};
pub use types::{
    Border, ContextMenu, ContextMenuClick, ItemFilter, ItemKind, ItemPatch, Layer, Metadata,
    RosterItem, Severity,
};

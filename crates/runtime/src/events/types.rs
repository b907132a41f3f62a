//! Event payloads published on the session bus.

use serde::{Deserialize, Serialize};
use tracker_core::{Stamp, TurnSnapshot};

/// Where a committed change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// A command issued through this session.
    Local,
    /// A newer snapshot written by another client.
    Remote,
    /// Entries dropped because their tokens left the scene.
    Pruned,
}

/// Turn order changes. Every subscriber redraws from the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    Changed { snapshot: TurnSnapshot, origin: Origin },

    /// A command was refused and changed nothing.
    Rejected { code: String, message: String },

    /// The roster or selection could not be read or written.
    HostFailed { operation: String, reason: String },
}

/// Traffic between this session and the room store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    Published { stamp: Stamp },
    Accepted { stamp: Stamp },
    Discarded { remote: Stamp, local: Stamp },
    Malformed { reason: String },
    PublishFailed { reason: String },
}

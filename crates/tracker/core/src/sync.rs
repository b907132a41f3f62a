//! Last-writer-wins reconciliation of remote snapshots.
//!
//! A remote snapshot replaces local state only when its stamp is strictly
//! newer than the last stamp this client accepted or published. Equal stamps
//! are the client's own echo and are dropped.

use crate::clock::Stamp;
use crate::entry::TurnEntry;
use crate::state::TurnState;

/// Turn state as read back from the shared metadata store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub order: Vec<TurnEntry>,
    /// Raw pointer as stored. Any negative value means no active turn.
    pub current: i64,
    pub stamp: Stamp,
}

impl RemoteSnapshot {
    pub fn new(order: Vec<TurnEntry>, current: i64, stamp: Stamp) -> Self {
        Self {
            order,
            current,
            stamp,
        }
    }

    /// The stored pointer as an index, before clamping.
    pub fn current_index(&self) -> Option<usize> {
        usize::try_from(self.current).ok()
    }
}

/// Result of [`reconcile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reconcile {
    /// Local state now mirrors the snapshot.
    Accepted,
    /// The snapshot was not newer than local state and was ignored.
    Stale { remote: Stamp, local: Stamp },
}

impl Reconcile {
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Applies `remote` to `state` if it is strictly newer.
pub fn reconcile(state: &mut TurnState, remote: RemoteSnapshot) -> Reconcile {
    let local = state.last_update();
    if remote.stamp <= local {
        return Reconcile::Stale {
            remote: remote.stamp,
            local,
        };
    }
    let current = remote.current_index();
    state.replace(remote.order, current, remote.stamp);
    Reconcile::Accepted
}

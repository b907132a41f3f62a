//! Deterministic turn-order rules shared by every tracker client.
//!
//! `tracker-core` defines the canonical data model (entries, stamps, the turn
//! state aggregate) and exposes pure APIs that the runtime drives. All
//! mutation of a session's order flows through [`state::TurnState`], which in
//! turn delegates to the side-effect-free functions in [`ordering`].
//! Reconciliation of remote snapshots lives in [`sync`] so that the
//! last-writer-wins policy can be tested without any host I/O.
pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod ordering;
pub mod roll;
pub mod state;
pub mod sync;

pub use clock::{ClientId, HybridClock, Stamp};
pub use config::TrackerConfig;
pub use entry::{Candidate, EntryLink, Initiative, ItemId, TurnEntry};
pub use error::TurnError;
pub use ordering::{Direction, InsertReport, PruneReport};
pub use roll::{InitiativeRoller, PcgRoller};
pub use state::{Outcome, Step, TurnSnapshot, TurnState};
pub use sync::{Reconcile, RemoteSnapshot, reconcile};

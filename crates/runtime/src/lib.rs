//! Session runtime for the shared turn-order tracker.
//!
//! This crate wires the pure rules of `tracker_core` to a host platform: a
//! room metadata store, a scene roster, a player's selection and a
//! notification sink. Consumers build a [`Session`] per connected client and
//! drive it through [`SessionHandle`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`host`] defines host seams and in-memory implementations
//! - [`sync`] and [`codec`] move turn state to and from the room store
//! - [`highlight`] projects the active turn onto the scene
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod codec;
pub mod config;
pub mod events;
pub mod highlight;
pub mod host;
pub mod roller;
pub mod session;
pub mod sync;

mod workers;

pub use api::{CommandReport, Request, Result, RuntimeError, SessionHandle};
pub use codec::{CodecError, MetadataCodec};
pub use config::SessionConfig;
pub use events::{Event, EventBus, Origin, SyncEvent, Topic, TurnEvent};
pub use highlight::HighlightStyle;
pub use host::{
    HostError, MemoryRoom, MemoryRoster, MemorySelection, RecordingNotifier, RosterItem,
    TracingNotifier,
};
pub use roller::EntropyRoller;
pub use session::{Session, SessionBuilder};
pub use sync::{ManualClock, SyncController, SyncError, SystemClock, WallClock};

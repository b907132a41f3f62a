//! Worker tasks that back a session.
//!
//! The session worker owns the turn state and applies everything in arrival
//! order; forwarders feed host subscriptions into its queue.

mod forward;
mod session;

pub use forward::spawn_forwarder;
pub use session::{Collaborators, Command, SessionEvent, SessionWorker};

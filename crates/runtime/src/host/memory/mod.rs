//! In-process host for tests and the demo shell.

mod notify;
mod room;
mod roster;
mod selection;

pub use notify::{RecordingNotifier, TracingNotifier};
pub use room::MemoryRoom;
pub use roster::MemoryRoster;
pub use selection::MemorySelection;

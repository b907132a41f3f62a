//! Public session API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on orchestration, workers, or host I/O.

pub mod errors;
pub mod handle;
pub mod request;

pub use errors::{Result, RuntimeError};
pub use handle::SessionHandle;
pub use request::{CommandReport, Request};

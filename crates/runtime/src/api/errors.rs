//! Unified error types surfaced by the session API.
//!
//! Wraps failures from worker coordination and host I/O. Refused turn
//! operations are not errors at this level; they come back inside
//! [`super::CommandReport`].
use thiserror::Error;
use tokio::sync::oneshot;
use tracker_core::Stamp;

use crate::codec::CodecError;
use crate::host::HostError;
use crate::sync::SyncError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("no stamp newer than {last} can be issued")]
    ClockExhausted { last: Stamp },

    #[error("session requires {0} before building")]
    MissingCollaborator(&'static str),
}

impl From<SyncError> for RuntimeError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Codec(err) => Self::Codec(err),
            SyncError::Host(err) => Self::Host(err),
            SyncError::ClockExhausted { last } => Self::ClockExhausted { last },
        }
    }
}

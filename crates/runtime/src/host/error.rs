use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

/// Failures reported by host collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("host rejected {operation}: {reason}")]
    Rejected {
        operation: &'static str,
        reason: String,
    },

    #[error("host is unavailable")]
    Unavailable,

    #[error("host state lock poisoned")]
    LockPoisoned,
}

impl HostError {
    pub fn rejected(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}

//! Domain errors for turn-order operations.
//!
//! None of these are fatal. Every variant describes a request that was turned
//! into a no-op; callers decide whether the user should hear about it.
//! Duplicate candidates and stale remote snapshots are not errors at all and
//! are reported through [`crate::InsertReport`] and [`crate::Reconcile`].

/// How a rejected operation should be surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// The user asked for something that needs different session state
    /// first. Worth a notification.
    Recoverable,

    /// Malformed input from the command surface (e.g. a stale row index).
    /// Logged only.
    Validation,
}

/// Errors returned by [`crate::TurnState`] and [`crate::ordering`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no active turn: start the round before adding invocations")]
    NoActiveTurn,

    #[error("row index {index} is out of range for {len} entries")]
    InvalidIndex { index: usize, len: usize },
}

impl TurnError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoActiveTurn => ErrorSeverity::Recoverable,
            Self::InvalidIndex { .. } => ErrorSeverity::Validation,
        }
    }

    /// Static identifier, useful for log fields and assertions.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveTurn => "no_active_turn",
            Self::InvalidIndex { .. } => "invalid_index",
        }
    }

    /// Whether the user should be told about this rejection.
    pub const fn is_user_facing(&self) -> bool {
        matches!(self.severity(), ErrorSeverity::Recoverable)
    }
}

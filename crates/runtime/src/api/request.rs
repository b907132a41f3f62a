//! Requests a session accepts and what it reports back.

use tracker_core::{Direction, Outcome, Stamp, Step, TurnError};

use crate::host::RosterItem;

/// One user action against the turn order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    /// Roll initiative for the player's selected characters.
    AddSelected,
    /// Roll initiative for explicitly supplied items (context menu).
    AddItems(Vec<RosterItem>),
    /// Insert the selected characters next to the active turn without a roll.
    InvokeSelected,
    Advance(Step),
    Reset,
    Nudge { index: usize, direction: Direction },
    Remove { index: usize },
}

impl Request {
    /// Short name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddSelected => "add_selected",
            Self::AddItems(_) => "add_items",
            Self::InvokeSelected => "invoke_selected",
            Self::Advance(Step::Next) => "next_turn",
            Self::Advance(Step::Previous) => "previous_turn",
            Self::Reset => "reset_turns",
            Self::Nudge { .. } => "nudge",
            Self::Remove { .. } => "remove",
        }
    }
}

/// Result of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandReport {
    pub outcome: Outcome,
    /// Entries added by insert requests.
    pub inserted: usize,
    /// Candidates skipped because they were already in the order.
    pub skipped: usize,
    /// Why the request changed nothing, if it was refused.
    pub rejection: Option<TurnError>,
    /// Stamp of the write that carried the change, if the write succeeded.
    pub published: Option<Stamp>,
}

impl CommandReport {
    pub fn unchanged() -> Self {
        Self {
            outcome: Outcome::Unchanged,
            inserted: 0,
            skipped: 0,
            rejection: None,
            published: None,
        }
    }

    pub fn changed() -> Self {
        Self {
            outcome: Outcome::Changed,
            ..Self::unchanged()
        }
    }

    pub fn rejected(error: TurnError) -> Self {
        Self {
            rejection: Some(error),
            ..Self::unchanged()
        }
    }

    pub fn is_changed(&self) -> bool {
        self.outcome.is_changed()
    }
}

//! The turn state aggregate.
//!
//! [`TurnState`] owns one session's order, current-turn pointer and the stamp
//! of the last accepted mutation. It is the only place where those three
//! values change, and every mutator leaves the invariants below intact:
//!
//! - the pointer is `None` or indexes into the order,
//! - no two entries share a roster id,
//! - the order is sorted ascending by initiative.

use std::collections::HashSet;

use crate::clock::Stamp;
use crate::config::TrackerConfig;
use crate::entry::{Candidate, ItemId, TurnEntry};
use crate::error::TurnError;
use crate::ordering::{self, Direction, InsertReport, PruneReport};
use crate::roll::InitiativeRoller;

/// Whether a call changed the state and therefore needs to be published.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Changed,
    Unchanged,
}

impl Outcome {
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

impl From<bool> for Outcome {
    fn from(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::Unchanged }
    }
}

/// Direction of a turn advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Step {
    Next,
    Previous,
}

impl Step {
    pub const fn delta(self) -> i64 {
        match self {
            Self::Next => 1,
            Self::Previous => -1,
        }
    }
}

/// Read-only copy of a turn state, handed to observers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnSnapshot {
    pub order: Vec<TurnEntry>,
    pub current: Option<usize>,
    pub stamp: Stamp,
}

impl TurnSnapshot {
    pub fn current_entry(&self) -> Option<&TurnEntry> {
        self.current.and_then(|index| self.order.get(index))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    config: TrackerConfig,
    order: Vec<TurnEntry>,
    current: Option<usize>,
    last_update: Stamp,
}

impl TurnState {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            order: Vec::new(),
            current: None,
            last_update: Stamp::ZERO,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn order(&self) -> &[TurnEntry] {
        &self.order
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&TurnEntry> {
        self.current.and_then(|index| self.order.get(index))
    }

    pub fn last_update(&self) -> Stamp {
        self.last_update
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            order: self.order.clone(),
            current: self.current,
            stamp: self.last_update,
        }
    }

    /// Records the stamp under which the current state was published.
    pub fn mark_published(&mut self, stamp: Stamp) {
        self.last_update = stamp;
    }

    /// Adds roster candidates with fresh initiative rolls.
    pub fn add_candidates<I, R>(&mut self, candidates: I, roller: &mut R) -> InsertReport
    where
        I: IntoIterator<Item = Candidate>,
        R: InitiativeRoller + ?Sized,
    {
        let sides = self.config.die_sides;
        let report = ordering::insert_new(&mut self.order, candidates, || roller.roll_die(sides));
        self.debug_check();
        report
    }

    /// Inserts candidates as invocations tied with the active entry.
    pub fn add_invocations<I>(&mut self, candidates: I) -> Result<usize, TurnError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let inserted = ordering::insert_invocation(&mut self.order, self.current, candidates)?;
        self.debug_check();
        Ok(inserted)
    }

    pub fn nudge(&mut self, index: usize, direction: Direction) -> Result<Outcome, TurnError> {
        let moved = ordering::nudge(&mut self.order, index, direction)?;
        self.debug_check();
        Ok(moved.into())
    }

    /// Removes one row. Returns the removed entry.
    pub fn remove(&mut self, index: usize) -> Result<TurnEntry, TurnError> {
        let removed = self
            .order
            .get(index)
            .cloned()
            .ok_or(TurnError::InvalidIndex {
                index,
                len: self.order.len(),
            })?;
        self.current = ordering::remove_at(&mut self.order, self.current, index)?;
        self.debug_check();
        Ok(removed)
    }

    /// Drops roster-linked entries whose item is no longer on the scene.
    pub fn prune(&mut self, live: &HashSet<ItemId>) -> PruneReport {
        let report = ordering::prune_missing(&mut self.order, self.current, live);
        self.current = report.current;
        self.debug_check();
        report
    }

    /// Moves the pointer one slot with wraparound. No-op on an empty order.
    pub fn advance(&mut self, step: Step) -> Outcome {
        let next = ordering::advance_index(self.current, self.order.len(), step.delta());
        let changed = next != self.current;
        self.current = next;
        self.debug_check();
        changed.into()
    }

    /// Ends the round without clearing the order.
    pub fn reset(&mut self) -> Outcome {
        let changed = self.current.take().is_some();
        changed.into()
    }

    /// Overwrites order and pointer with a snapshot from elsewhere (hydration
    /// or an accepted remote update).
    ///
    /// Input is normalised rather than trusted: an out-of-range pointer is
    /// clamped, repeated ids keep their first occurrence and the order is
    /// re-sorted with the pointer following its entry.
    pub fn replace(&mut self, order: Vec<TurnEntry>, current: Option<usize>, stamp: Stamp) {
        let mut order = order;
        let mut current = match current {
            _ if order.is_empty() => None,
            Some(index) => Some(index.min(order.len() - 1)),
            None => None,
        };
        ordering::dedupe_ids(&mut order, &mut current);
        let current = ordering::sort_tracking(&mut order, current);

        self.order = order;
        self.current = current;
        self.last_update = stamp;
        self.debug_check();
    }

    /// True when every documented invariant holds.
    pub fn invariants_hold(&self) -> bool {
        let pointer_valid = self.current.is_none_or(|index| index < self.order.len());
        let mut seen = HashSet::new();
        let ids_unique = self
            .order
            .iter()
            .filter_map(TurnEntry::id)
            .all(|id| seen.insert(id));
        pointer_valid && ids_unique && ordering::is_sorted(&self.order)
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.invariants_hold(), "turn state invariants violated");
    }
}

//! Ordering engine: pure functions over a turn order.
//!
//! Every function here leaves the order sorted ascending by initiative,
//! using a stable sort so that insertion order breaks ties. The current-turn
//! pointer is passed in and returned explicitly; nothing in this module owns
//! state.

use std::collections::HashSet;

use crate::entry::{Candidate, Initiative, ItemId, TurnEntry};
use crate::error::TurnError;

/// Direction of a single-row nudge.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Act one slot earlier.
    Up,
    /// Act one slot later.
    Down,
}

/// Result of [`insert_new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertReport {
    pub inserted: usize,
    /// Candidates already present by roster id.
    pub skipped: usize,
}

/// Result of [`prune_missing`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: usize,
    pub current: Option<usize>,
}

/// Stable sort ascending by initiative.
pub fn sort_by_initiative(order: &mut [TurnEntry]) {
    order.sort_by_key(|entry| entry.initiative);
}

pub fn is_sorted(order: &[TurnEntry]) -> bool {
    order
        .windows(2)
        .all(|pair| pair[0].initiative <= pair[1].initiative)
}

/// Appends every candidate whose roster id is not yet in `order`, each with a
/// fresh roll, then re-sorts.
///
/// Duplicates are matched against the existing order and against earlier
/// candidates of the same batch.
pub fn insert_new<I, F>(order: &mut Vec<TurnEntry>, candidates: I, mut roll: F) -> InsertReport
where
    I: IntoIterator<Item = Candidate>,
    F: FnMut() -> Initiative,
{
    let mut known: HashSet<ItemId> = order.iter().filter_map(|e| e.id().cloned()).collect();
    let mut report = InsertReport::default();

    for candidate in candidates {
        if !known.insert(candidate.id.clone()) {
            report.skipped += 1;
            continue;
        }
        order.push(candidate.into_linked(roll()));
        report.inserted += 1;
    }

    if report.inserted > 0 {
        sort_by_initiative(order);
    }
    report
}

/// Inserts `candidates` as invocations sharing the current entry's initiative,
/// right after the run of entries already tied with it.
///
/// Returns the number of entries inserted. The current pointer does not move
/// because every insertion lands after it.
pub fn insert_invocation<I>(
    order: &mut Vec<TurnEntry>,
    current: Option<usize>,
    candidates: I,
) -> Result<usize, TurnError>
where
    I: IntoIterator<Item = Candidate>,
{
    let current = current
        .filter(|&index| index < order.len())
        .ok_or(TurnError::NoActiveTurn)?;
    let initiative = order[current].initiative;

    let mut at = current + 1;
    while at < order.len() && order[at].initiative == initiative {
        at += 1;
    }

    let entries: Vec<TurnEntry> = candidates
        .into_iter()
        .map(|candidate| candidate.into_invocation(initiative))
        .collect();
    let count = entries.len();
    order.splice(at..at, entries);
    Ok(count)
}

/// Moves the entry at `index` one slot by re-ranking it just past its
/// neighbour. Returns `Ok(false)` at the boundary.
pub fn nudge(order: &mut [TurnEntry], index: usize, direction: Direction) -> Result<bool, TurnError> {
    let len = order.len();
    if index >= len {
        return Err(TurnError::InvalidIndex { index, len });
    }

    let initiative = match direction {
        Direction::Up if index > 0 => order[index - 1].initiative.before(),
        Direction::Down if index + 1 < len => order[index + 1].initiative.after(),
        _ => return Ok(false),
    };

    order[index].initiative = initiative;
    sort_by_initiative(order);
    Ok(true)
}

/// Removes the entry at `index` and returns the adjusted current pointer.
pub fn remove_at(
    order: &mut Vec<TurnEntry>,
    current: Option<usize>,
    index: usize,
) -> Result<Option<usize>, TurnError> {
    let len = order.len();
    if index >= len {
        return Err(TurnError::InvalidIndex { index, len });
    }
    order.remove(index);
    Ok(shift_after_removal(current, index, len, order.len()))
}

/// Pointer adjustment for a removal at `index` from an order of `old_len`.
fn shift_after_removal(
    current: Option<usize>,
    index: usize,
    old_len: usize,
    new_len: usize,
) -> Option<usize> {
    let shifted = match current {
        None => None,
        Some(c) if index < c => Some(c - 1),
        // Removing the active last slot hands the turn back to the new tail.
        Some(c) if index == c && index + 1 == old_len => c.checked_sub(1),
        Some(c) => Some(c),
    };

    if new_len == 0 {
        None
    } else {
        shifted.map(|c| c.min(new_len - 1))
    }
}

/// Drops roster-linked entries whose id is not in `live`. Invocations are
/// never pruned.
///
/// Removals are applied highest index first, each adjusting the pointer as
/// [`remove_at`] would, so the turn stays with the same surviving entry when
/// that entry survives.
pub fn prune_missing(
    order: &mut Vec<TurnEntry>,
    current: Option<usize>,
    live: &HashSet<ItemId>,
) -> PruneReport {
    let doomed: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.id().is_some_and(|id| !live.contains(id)))
        .map(|(index, _)| index)
        .collect();

    let mut current = current;
    for &index in doomed.iter().rev() {
        let old_len = order.len();
        order.remove(index);
        current = shift_after_removal(current, index, old_len, order.len());
    }

    PruneReport {
        removed: doomed.len(),
        current,
    }
}

/// Drops later entries that repeat an earlier roster id, adjusting the
/// pointer like [`remove_at`]. Returns the number of entries dropped.
pub fn dedupe_ids(order: &mut Vec<TurnEntry>, current: &mut Option<usize>) -> usize {
    let mut seen = HashSet::new();
    let repeats: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.id().is_some_and(|id| !seen.insert(id.clone())))
        .map(|(index, _)| index)
        .collect();

    for &index in repeats.iter().rev() {
        let old_len = order.len();
        order.remove(index);
        *current = shift_after_removal(*current, index, old_len, order.len());
    }
    repeats.len()
}

/// Stable-sorts `order` and returns where the entry at `current` ended up.
pub fn sort_tracking(order: &mut Vec<TurnEntry>, current: Option<usize>) -> Option<usize> {
    if is_sorted(order) {
        return current;
    }
    let mut tagged: Vec<(usize, TurnEntry)> = order.drain(..).enumerate().collect();
    tagged.sort_by_key(|(_, entry)| entry.initiative);

    let mut moved = None;
    for (position, (original, entry)) in tagged.into_iter().enumerate() {
        if Some(original) == current {
            moved = Some(position);
        }
        order.push(entry);
    }
    moved
}

/// Steps the pointer by `delta` with wraparound. `None` counts as `-1`, so a
/// fresh round starts at the first entry.
pub fn advance_index(current: Option<usize>, len: usize, delta: i64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as i64;
    let from = current.map_or(-1, |c| c as i64);
    Some((from + delta).rem_euclid(len) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryLink;

    fn linked(id: &str, initiative: i32) -> TurnEntry {
        TurnEntry::linked(ItemId::new(id), id.to_uppercase(), Initiative(initiative))
    }

    fn ids(order: &[TurnEntry]) -> Vec<Option<&str>> {
        order.iter().map(|e| e.id().map(ItemId::as_str)).collect()
    }

    fn rolls(values: &[i32]) -> impl FnMut() -> Initiative + '_ {
        let mut iter = values.iter();
        move || Initiative(*iter.next().expect("test supplied too few rolls"))
    }

    #[test]
    fn insert_new_sorts_and_skips_duplicates() {
        let mut order = vec![linked("a", 30)];
        let report = insert_new(
            &mut order,
            [
                Candidate::new("b", "B"),
                Candidate::new("a", "A again"),
                Candidate::new("c", "C"),
                Candidate::new("b", "B again"),
            ],
            rolls(&[50, 10]),
        );

        assert_eq!(report, InsertReport { inserted: 2, skipped: 2 });
        assert_eq!(ids(&order), vec![Some("c"), Some("a"), Some("b")]);
        assert!(is_sorted(&order));
    }

    #[test]
    fn insert_new_keeps_insertion_order_on_ties() {
        let mut order = vec![linked("a", 20)];
        insert_new(&mut order, [Candidate::new("b", "B")], rolls(&[20]));
        assert_eq!(ids(&order), vec![Some("a"), Some("b")]);
    }

    #[test]
    fn invocation_lands_after_tied_run() {
        let mut order = vec![linked("a", 50), linked("b", 60)];
        let count = insert_invocation(&mut order, Some(0), [Candidate::new("c", "C")]).unwrap();

        assert_eq!(count, 1);
        assert_eq!(ids(&order), vec![Some("a"), None, Some("b")]);
        assert_eq!(order[1].name, "C");
        assert_eq!(order[1].initiative, Initiative(50));
        assert!(order[1].is_invocation());
    }

    #[test]
    fn invocation_skips_every_tied_entry() {
        let mut order = vec![linked("a", 10), linked("b", 10), linked("c", 10), linked("d", 11)];
        insert_invocation(
            &mut order,
            Some(0),
            [Candidate::new("x", "X"), Candidate::new("y", "Y")],
        )
        .unwrap();

        let names: Vec<_> = order.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "X", "Y", "D"]);
    }

    #[test]
    fn invocation_requires_active_turn() {
        let mut order = vec![linked("a", 10)];
        let before = order.clone();

        assert_eq!(
            insert_invocation(&mut order, None, [Candidate::new("x", "X")]),
            Err(TurnError::NoActiveTurn)
        );
        assert_eq!(
            insert_invocation(&mut order, Some(3), [Candidate::new("x", "X")]),
            Err(TurnError::NoActiveTurn)
        );
        assert_eq!(order, before);
    }

    #[test]
    fn nudge_up_and_down() {
        let mut order = vec![linked("a", 10), linked("b", 20), linked("c", 30)];

        assert_eq!(nudge(&mut order, 2, Direction::Up), Ok(true));
        assert_eq!(ids(&order), vec![Some("a"), Some("c"), Some("b")]);
        assert_eq!(order[1].initiative, Initiative(19));

        assert_eq!(nudge(&mut order, 0, Direction::Down), Ok(true));
        assert_eq!(ids(&order), vec![Some("c"), Some("a"), Some("b")]);
        assert_eq!(order[1].initiative, Initiative(20));
    }

    #[test]
    fn nudge_is_noop_at_boundaries() {
        let mut order = vec![linked("a", 10), linked("b", 20)];
        let before = order.clone();

        assert_eq!(nudge(&mut order, 0, Direction::Up), Ok(false));
        assert_eq!(nudge(&mut order, 1, Direction::Down), Ok(false));
        assert_eq!(
            nudge(&mut order, 2, Direction::Up),
            Err(TurnError::InvalidIndex { index: 2, len: 2 })
        );
        assert_eq!(order, before);
    }

    #[test]
    fn remove_before_current_shifts_pointer() {
        let mut order = vec![linked("a", 10), linked("b", 20), linked("c", 30)];
        assert_eq!(remove_at(&mut order, Some(2), 0), Ok(Some(1)));
    }

    #[test]
    fn remove_current_last_slot_steps_back() {
        let mut order = vec![linked("a", 10), linked("b", 20), linked("c", 30)];
        assert_eq!(remove_at(&mut order, Some(2), 2), Ok(Some(1)));
        assert_eq!(ids(&order), vec![Some("a"), Some("b")]);
    }

    #[test]
    fn remove_current_middle_hands_turn_to_next() {
        let mut order = vec![linked("a", 10), linked("b", 20), linked("c", 30)];
        assert_eq!(remove_at(&mut order, Some(1), 1), Ok(Some(1)));
        assert_eq!(order[1].id(), Some(&ItemId::new("c")));
    }

    #[test]
    fn remove_after_current_keeps_pointer() {
        let mut order = vec![linked("a", 10), linked("b", 20)];
        assert_eq!(remove_at(&mut order, Some(0), 1), Ok(Some(0)));
        assert_eq!(remove_at(&mut order, None, 0), Ok(None));
        assert!(order.is_empty());
    }

    #[test]
    fn remove_only_entry_clears_pointer() {
        let mut order = vec![linked("a", 10)];
        assert_eq!(remove_at(&mut order, Some(0), 0), Ok(None));
        assert!(order.is_empty());
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut order = vec![linked("a", 10)];
        assert_eq!(
            remove_at(&mut order, Some(0), 1),
            Err(TurnError::InvalidIndex { index: 1, len: 1 })
        );
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn prune_keeps_invocations_and_follows_current() {
        let mut order = vec![
            linked("a", 10),
            TurnEntry::invocation("Spirit", Initiative(10)),
            linked("b", 20),
            linked("c", 30),
        ];
        let live: HashSet<ItemId> = [ItemId::new("c")].into_iter().collect();

        let report = prune_missing(&mut order, Some(3), &live);

        assert_eq!(report.removed, 2);
        assert_eq!(report.current, Some(1));
        assert_eq!(order.len(), 2);
        assert!(matches!(order[0].link, EntryLink::Invocation));
        assert_eq!(order[1].id(), Some(&ItemId::new("c")));
    }

    #[test]
    fn prune_everything_clears_pointer() {
        let mut order = vec![linked("a", 10), linked("b", 20)];
        let report = prune_missing(&mut order, Some(1), &HashSet::new());
        assert_eq!(report, PruneReport { removed: 2, current: None });
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut order = vec![linked("a", 10), linked("b", 20), linked("a", 30)];
        let mut current = Some(2);
        assert_eq!(dedupe_ids(&mut order, &mut current), 1);
        assert_eq!(ids(&order), vec![Some("a"), Some("b")]);
        assert_eq!(current, Some(1));
    }

    #[test]
    fn sort_tracking_follows_current_entry() {
        let mut order = vec![linked("a", 30), linked("b", 10), linked("c", 20)];
        assert_eq!(sort_tracking(&mut order, Some(0)), Some(2));
        assert_eq!(ids(&order), vec![Some("b"), Some("c"), Some("a")]);
        assert_eq!(sort_tracking(&mut order, Some(1)), Some(1));
    }

    #[test]
    fn advance_wraps_both_ways() {
        assert_eq!(advance_index(None, 3, 1), Some(0));
        assert_eq!(advance_index(Some(2), 3, 1), Some(0));
        assert_eq!(advance_index(Some(0), 3, -1), Some(2));
        assert_eq!(advance_index(None, 3, -1), Some(1));
        assert_eq!(advance_index(None, 1, -1), Some(0));
        assert_eq!(advance_index(Some(1), 0, 1), None);
    }

    #[test]
    fn direction_parses_from_shell_words() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(Direction::Down.to_string(), "down");
    }
}

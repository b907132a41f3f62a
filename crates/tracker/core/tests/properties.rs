//! Property tests for the ordering engine and turn state.
//!
//! Orders are generated with unique names so an entry can be followed across
//! a re-sort.

use std::collections::HashSet;

use proptest::prelude::*;
use tracker_core::ordering::{self, Direction};
use tracker_core::{
    Candidate, Initiative, ItemId, PcgRoller, Stamp, Step, TrackerConfig, TurnEntry, TurnState,
};

fn arb_order(max_len: usize) -> impl Strategy<Value = Vec<TurnEntry>> {
    prop::collection::vec((-50i32..150, any::<bool>()), 0..max_len).prop_map(|rows| {
        let mut order: Vec<TurnEntry> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (initiative, invocation))| {
                let name = format!("n{i}");
                if invocation {
                    TurnEntry::invocation(name, Initiative(initiative))
                } else {
                    TurnEntry::linked(ItemId::new(format!("t{i}")), name, Initiative(initiative))
                }
            })
            .collect();
        ordering::sort_by_initiative(&mut order);
        order
    })
}

fn arb_state(max_len: usize) -> impl Strategy<Value = TurnState> {
    (arb_order(max_len), any::<Option<prop::sample::Index>>()).prop_map(|(order, pick)| {
        let current = match pick {
            Some(index) if !order.is_empty() => Some(index.index(order.len())),
            _ => None,
        };
        let mut state = TurnState::default();
        state.replace(order, current, Stamp::ZERO);
        state
    })
}

fn position_of(order: &[TurnEntry], name: &str) -> Option<usize> {
    order.iter().position(|entry| entry.name == name)
}

proptest! {
    #[test]
    fn insert_new_keeps_order_sorted_and_ids_unique(
        mut state in arb_state(12),
        ids in prop::collection::vec(0u8..20, 0..16),
        seed in any::<u64>(),
    ) {
        let before = state.len();
        let candidates: Vec<Candidate> = ids
            .iter()
            .map(|id| Candidate::new(format!("t{id}"), format!("c{id}")))
            .collect();
        let offered = candidates.len();

        let mut roller = PcgRoller::new(seed);
        let report = state.add_candidates(candidates, &mut roller);

        prop_assert!(state.invariants_hold());
        prop_assert_eq!(report.inserted + report.skipped, offered);
        prop_assert_eq!(state.len(), before + report.inserted);
    }

    #[test]
    fn rolls_stay_within_configured_die(sides in 1u32..500, seed in any::<u64>()) {
        let mut state = TurnState::new(TrackerConfig::with_die_sides(sides));
        let mut roller = PcgRoller::new(seed);
        state.add_candidates((0..8).map(|i| Candidate::new(format!("t{i}"), "x")), &mut roller);

        let upper = i32::try_from(sides).unwrap();
        prop_assert!(state.order().iter().all(|e| (1..=upper).contains(&e.initiative.0)));
    }

    #[test]
    fn full_cycle_returns_to_start(mut state in arb_state(12)) {
        prop_assume!(state.current().is_some());
        let start = state.current();

        for _ in 0..state.len() {
            state.advance(Step::Next);
        }
        prop_assert_eq!(state.current(), start);

        state.advance(Step::Next);
        state.advance(Step::Previous);
        prop_assert_eq!(state.current(), start);
    }

    #[test]
    fn prune_removes_exactly_the_missing(
        mut state in arb_state(12),
        keep in prop::collection::hash_set(0usize..12, 0..8),
    ) {
        let live: HashSet<ItemId> = keep.iter().map(|i| ItemId::new(format!("t{i}"))).collect();
        let current_name = state.current_entry().map(|e| e.name.clone());
        let expected: Vec<String> = state
            .order()
            .iter()
            .filter(|e| e.id().is_none_or(|id| live.contains(id)))
            .map(|e| e.name.clone())
            .collect();

        let report = state.prune(&live);

        let names: Vec<String> = state.order().iter().map(|e| e.name.clone()).collect();
        prop_assert_eq!(&names, &expected);
        prop_assert!(state.invariants_hold());
        prop_assert_eq!(report.current, state.current());

        // A surviving active entry keeps the turn.
        if let Some(name) = current_name {
            if expected.contains(&name) {
                prop_assert_eq!(state.current_entry().map(|e| e.name.clone()), Some(name));
            }
        }
    }

    #[test]
    fn nudge_moves_one_way_or_not_at_all(
        mut state in arb_state(12),
        pick in any::<prop::sample::Index>(),
        up in any::<bool>(),
    ) {
        prop_assume!(!state.is_empty());
        let index = pick.index(state.len());
        let name = state.order()[index].name.clone();
        let before = state.order().to_vec();
        let direction = if up { Direction::Up } else { Direction::Down };

        let outcome = state.nudge(index, direction).unwrap();
        prop_assert!(state.invariants_hold());

        let at_boundary = match direction {
            Direction::Up => index == 0,
            Direction::Down => index + 1 == before.len(),
        };
        if at_boundary {
            prop_assert!(!outcome.is_changed());
            prop_assert_eq!(state.order(), before.as_slice());
        } else {
            prop_assert!(outcome.is_changed());
            let moved_to = position_of(state.order(), &name).unwrap();
            match direction {
                Direction::Up => prop_assert!(moved_to < index),
                Direction::Down => prop_assert!(moved_to > index),
            }
        }
    }

    #[test]
    fn remove_shrinks_by_one(mut state in arb_state(12), pick in any::<prop::sample::Index>()) {
        prop_assume!(!state.is_empty());
        let len = state.len();
        let index = pick.index(len);

        state.remove(index).unwrap();

        prop_assert_eq!(state.len(), len - 1);
        prop_assert!(state.invariants_hold());
        if state.is_empty() {
            prop_assert_eq!(state.current(), None);
        }
    }

    #[test]
    fn invocations_share_current_initiative(
        mut state in arb_state(12),
        count in 1usize..4,
    ) {
        prop_assume!(state.current().is_some());
        let initiative = state.current_entry().map(|e| e.initiative);
        let current = state.current();
        let before = state.len();

        let candidates = (0..count).map(|i| Candidate::new(format!("inv{i}"), format!("inv{i}")));
        let inserted = state.add_invocations(candidates).unwrap();

        prop_assert_eq!(inserted, count);
        prop_assert_eq!(state.len(), before + count);
        prop_assert_eq!(state.current(), current);
        prop_assert!(state.invariants_hold());
        for i in 0..count {
            let at = position_of(state.order(), &format!("inv{i}")).unwrap();
            prop_assert!(state.order()[at].is_invocation());
            prop_assert_eq!(Some(state.order()[at].initiative), initiative);
        }
    }
}

//! Initiative rolls.
//!
//! The ordering engine never draws randomness itself: callers hand it an
//! [`InitiativeRoller`]. The runtime plugs in an OS-backed roller, while
//! tests and replays use the seeded [`PcgRoller`] so a session can be
//! reproduced roll for roll.

use crate::entry::Initiative;

/// Source of initiative values.
pub trait InitiativeRoller {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Roll a die with `sides` faces (1..=sides). Zero sides behaves as one.
    fn roll_die(&mut self, sides: u32) -> Initiative {
        let sides = sides.max(1);
        let face = (self.next_u32() % sides) + 1;
        Initiative(i32::try_from(face).unwrap_or(i32::MAX))
    }

    /// Roll a d100 (1-100 inclusive), the table default.
    fn roll_d100(&mut self) -> Initiative {
        self.roll_die(100)
    }
}

impl<R: InitiativeRoller + ?Sized> InitiativeRoller for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
///
/// Deterministic: the same seed always yields the same roll sequence.
#[derive(Clone, Copy, Debug)]
pub struct PcgRoller {
    state: u64,
}

impl PcgRoller {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// `state' = state * multiplier + increment (mod 2^64)`
    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl InitiativeRoller for PcgRoller {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::step(self.state);
        Self::output(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_rolls() {
        let mut a = PcgRoller::new(42);
        let mut b = PcgRoller::new(42);
        let rolls_a: Vec<_> = (0..16).map(|_| a.roll_d100()).collect();
        let rolls_b: Vec<_> = (0..16).map(|_| b.roll_d100()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn rolls_stay_on_the_die() {
        let mut roller = PcgRoller::new(7);
        for _ in 0..1_000 {
            let Initiative(value) = roller.roll_d100();
            assert!((1..=100).contains(&value));
        }
        for _ in 0..100 {
            assert_eq!(roller.roll_die(0), Initiative(1));
        }
    }

    #[test]
    fn sequence_advances() {
        let mut roller = PcgRoller::new(1);
        let first = roller.next_u32();
        let second = roller.next_u32();
        assert_ne!(first, second);
    }
}

//! Initiative rollers for live sessions.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tracker_core::{Initiative, InitiativeRoller, PcgRoller};

/// Roller seeded from OS entropy.
#[derive(Debug)]
pub struct EntropyRoller {
    rng: StdRng,
}

impl EntropyRoller {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl InitiativeRoller for EntropyRoller {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn roll_die(&mut self, sides: u32) -> Initiative {
        let face = self.rng.gen_range(1..=sides.max(1));
        Initiative(i32::try_from(face).unwrap_or(i32::MAX))
    }
}

/// Seeded rolls replay exactly; without a seed rolls come from entropy.
pub fn roller_for(seed: Option<u64>) -> Box<dyn InitiativeRoller + Send + Sync> {
    match seed {
        Some(seed) => Box::new(PcgRoller::new(seed)),
        None => Box::new(EntropyRoller::new()),
    }
}

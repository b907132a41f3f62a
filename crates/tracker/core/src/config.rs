/// Turn-order rules that can be tuned per table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerConfig {
    /// Sides of the initiative die. Rolls are uniform in `[1, die_sides]`.
    pub die_sides: u32,
}

impl TrackerConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DIE_SIDES: u32 = 100;

    pub const fn new() -> Self {
        Self {
            die_sides: Self::DEFAULT_DIE_SIDES,
        }
    }

    /// A die needs at least one face; zero is promoted to one.
    pub fn with_die_sides(die_sides: u32) -> Self {
        Self {
            die_sides: die_sides.max(1),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

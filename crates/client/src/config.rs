use std::env;

use tracker_runtime::SessionConfig;

/// Settings for the console demo on top of each player's session config.
#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Players seated at the table, each with its own session.
    pub players: usize,
    pub session_id: Option<String>,
    /// Base session settings; every seat gets its own client id.
    pub session: SessionConfig,
}

impl DemoConfig {
    pub const DEFAULT_PLAYERS: usize = 2;

    /// Environment variables:
    /// - `TRACKER_DEMO_PLAYERS` - Number of seats (default: 2, at least 1)
    /// - `TRACKER_SESSION_ID` - Log directory name (default: timestamped)
    /// - every `TRACKER_*` variable read by [`SessionConfig::from_env`]
    pub fn from_env() -> Self {
        let players = env::var("TRACKER_DEMO_PLAYERS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|&players| players > 0)
            .unwrap_or(Self::DEFAULT_PLAYERS);

        Self {
            players,
            session_id: env::var("TRACKER_SESSION_ID").ok().filter(|id| !id.is_empty()),
            session: SessionConfig::from_env(),
        }
    }

    /// Session settings for seat `seat` (zero-based).
    pub fn seat(&self, seat: usize) -> SessionConfig {
        let offset = seat as u64;
        let mut config = self.session.clone();
        config.client_id.0 = self.session.client_id.0.wrapping_add(offset);
        config.roll_seed = self.session.roll_seed.map(|seed| seed.wrapping_add(offset));
        config
    }
}

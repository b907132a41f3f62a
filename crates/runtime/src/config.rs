//! Session configuration and its environment loader.
use std::env;

use tracker_core::{ClientId, TrackerConfig};

use crate::highlight::HighlightStyle;

/// Everything a session needs besides its host collaborators.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Prefix of every metadata key this tracker owns.
    pub namespace: String,
    pub client_id: ClientId,
    pub tracker: TrackerConfig,
    /// Deterministic rolls when set.
    pub roll_seed: Option<u64>,
    pub highlight: HighlightStyle,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl SessionConfig {
    pub const DEFAULT_NAMESPACE: &'static str = "com.heolia.turn-system";
    pub const DEFAULT_EVENT_BUFFER: usize = 100;
    pub const DEFAULT_COMMAND_BUFFER: usize = 32;

    /// Defaults with a fixed client id.
    pub fn for_client(client_id: ClientId) -> Self {
        Self {
            namespace: Self::DEFAULT_NAMESPACE.to_owned(),
            client_id,
            tracker: TrackerConfig::default(),
            roll_seed: None,
            highlight: HighlightStyle::default(),
            event_buffer_size: Self::DEFAULT_EVENT_BUFFER,
            command_buffer_size: Self::DEFAULT_COMMAND_BUFFER,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TRACKER_NAMESPACE` - Metadata key prefix (default: `com.heolia.turn-system`)
    /// - `TRACKER_CLIENT_ID` - Client id for stamps (default: random)
    /// - `TRACKER_DIE_SIDES` - Initiative die (default: 100)
    /// - `TRACKER_ROLL_SEED` - Seed for deterministic rolls (default: entropy)
    /// - `TRACKER_HIGHLIGHT_COLOR` - Marker border colour (default: `#FF9900`)
    /// - `TRACKER_HIGHLIGHT_WIDTH` - Marker border width (default: 5)
    /// - `TRACKER_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    /// - `TRACKER_COMMAND_BUFFER` - Session queue size (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(namespace) = env::var("TRACKER_NAMESPACE")
            && !namespace.is_empty()
        {
            config.namespace = namespace;
        }

        if let Some(id) = read_env::<u64>("TRACKER_CLIENT_ID") {
            config.client_id = ClientId(id);
        }

        if let Some(sides) = read_env::<u32>("TRACKER_DIE_SIDES") {
            config.tracker = TrackerConfig::with_die_sides(sides);
        }

        config.roll_seed = read_env::<u64>("TRACKER_ROLL_SEED");

        if let Ok(color) = env::var("TRACKER_HIGHLIGHT_COLOR")
            && !color.is_empty()
        {
            config.highlight.color = color;
        }

        if let Some(width) = read_env::<u32>("TRACKER_HIGHLIGHT_WIDTH") {
            config.highlight.width = width;
        }

        if let Some(capacity) = read_env::<usize>("TRACKER_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("TRACKER_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::for_client(ClientId(rand::random()))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

//! Update stamps and the hybrid logical clock that issues them.
//!
//! A stamp pairs wall-clock milliseconds with a logical counter and the
//! issuing client's id. Stamps are compared lexicographically in that order,
//! so two clients publishing within the same millisecond still produce
//! distinct, totally ordered stamps, and a client whose wall clock lags
//! behind a peer keeps issuing stamps newer than anything it has seen.

use core::fmt;

/// Identifies one connected client (one session).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Version of a published turn state.
///
/// Field order matters: the derived `Ord` compares `millis`, then `counter`,
/// then `client`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stamp {
    pub millis: u64,
    pub counter: u32,
    pub client: ClientId,
}

impl Stamp {
    /// Older than every stamp a clock can issue.
    pub const ZERO: Self = Self {
        millis: 0,
        counter: 0,
        client: ClientId(0),
    };

    pub const fn new(millis: u64, counter: u32, client: ClientId) -> Self {
        Self {
            millis,
            counter,
            client,
        }
    }

    /// Stamp for a bare wall-clock value, as written by older clients.
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(millis, 0, ClientId(0))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}@{}", self.millis, self.counter, self.client)
    }
}

/// Hybrid logical clock owned by one client.
#[derive(Clone, Debug)]
pub struct HybridClock {
    client: ClientId,
    last: Stamp,
}

impl HybridClock {
    pub const fn new(client: ClientId) -> Self {
        Self {
            client,
            last: Stamp::ZERO,
        }
    }

    pub const fn client(&self) -> ClientId {
        self.client
    }

    /// Latest stamp issued or observed.
    pub const fn last(&self) -> Stamp {
        self.last
    }

    /// Issues a stamp strictly newer than every stamp issued or observed so
    /// far, given the current wall-clock reading.
    ///
    /// Returns `None` once the clock has observed the largest representable
    /// stamp; no newer one exists.
    pub fn tick(&mut self, wall_millis: u64) -> Option<Stamp> {
        let next = if wall_millis > self.last.millis {
            Stamp::new(wall_millis, 0, self.client)
        } else if let Some(counter) = self.last.counter.checked_add(1) {
            Stamp::new(self.last.millis, counter, self.client)
        } else {
            Stamp::new(self.last.millis.checked_add(1)?, 0, self.client)
        };
        self.last = next;
        Some(next)
    }

    /// Folds a remote stamp in so later ticks are newer than it.
    pub fn observe(&mut self, remote: Stamp) {
        if remote > self.last {
            self.last = remote;
        }
    }
}

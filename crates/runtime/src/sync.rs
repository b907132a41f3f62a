//! Sync controller: moves turn state between a session and the room store.
//!
//! Publishing stamps the local state with the session's hybrid clock and
//! writes it under the namespaced keys. Incoming mappings are decoded and
//! handed to [`tracker_core::reconcile`]; only strictly newer stamps win.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracker_core::{ClientId, HybridClock, Reconcile, Stamp, TurnState};

use crate::codec::{CodecError, MetadataCodec};
use crate::host::{HostError, Metadata, MetadataStore};

/// Wall-clock source in Unix milliseconds.
pub trait WallClock: Send + Sync {
    fn now_millis(&self) -> u64;
}

impl<T: WallClock + ?Sized> WallClock for Arc<T> {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}

/// System time via `chrono`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl WallClock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("no stamp newer than {last} can be issued")]
    ClockExhausted { last: Stamp },
}

/// What happened to an incoming mapping.
#[derive(Debug)]
pub enum Received {
    /// The mapping carries no turn state.
    Ignored,
    /// The turn state could not be decoded; local state is untouched.
    Malformed(CodecError),
    Reconciled(Reconcile),
}

pub struct SyncController {
    store: Arc<dyn MetadataStore>,
    codec: MetadataCodec,
    clock: HybridClock,
    wall: Arc<dyn WallClock>,
}

impl SyncController {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        codec: MetadataCodec,
        client: ClientId,
        wall: Arc<dyn WallClock>,
    ) -> Self {
        Self {
            store,
            codec,
            clock: HybridClock::new(client),
            wall,
        }
    }

    pub fn client(&self) -> ClientId {
        self.clock.client()
    }

    /// Adopts whatever the room holds, regardless of stamps. Returns the
    /// adopted stamp, or `None` when the room has no turn state yet.
    pub async fn hydrate(&mut self, state: &mut TurnState) -> Result<Option<Stamp>, SyncError> {
        let metadata = self.store.get().await?;
        let Some(remote) = self.codec.decode(&metadata)? else {
            tracing::info!(target: "tracker::sync", "room has no turn state yet");
            return Ok(None);
        };

        self.clock.observe(remote.stamp);
        let stamp = remote.stamp;
        let current = remote.current_index();
        state.replace(remote.order, current, stamp);
        tracing::info!(
            target: "tracker::sync",
            %stamp,
            entries = state.len(),
            "hydrated turn state from room"
        );
        Ok(Some(stamp))
    }

    /// Stamps and writes the local state.
    ///
    /// The stamp is recorded locally before the write so the echo is
    /// recognised. A failed write is not retried and leaves local state as
    /// is.
    pub async fn publish(&mut self, state: &mut TurnState) -> Result<Stamp, SyncError> {
        let stamp = self
            .clock
            .tick(self.wall.now_millis())
            .ok_or(SyncError::ClockExhausted {
                last: self.clock.last(),
            })?;
        state.mark_published(stamp);

        let patch = self.codec.encode(&state.snapshot())?;
        self.store.set(patch).await?;
        tracing::debug!(target: "tracker::sync", %stamp, "published turn state");
        Ok(stamp)
    }

    /// Applies a full room mapping delivered by the store.
    pub fn receive(&mut self, state: &mut TurnState, metadata: &Metadata) -> Received {
        let remote = match self.codec.decode(metadata) {
            Ok(Some(remote)) => remote,
            Ok(None) => return Received::Ignored,
            Err(err) => {
                tracing::warn!(target: "tracker::sync", error = %err, "discarding malformed turn state");
                return Received::Malformed(err);
            }
        };

        self.clock.observe(remote.stamp);
        let outcome = tracker_core::reconcile(state, remote);
        match outcome {
            Reconcile::Accepted => {
                tracing::debug!(target: "tracker::sync", stamp = %state.last_update(), "accepted remote turn state");
            }
            Reconcile::Stale { remote, local } => {
                tracing::debug!(target: "tracker::sync", %remote, %local, "discarded stale turn state");
            }
        }
        Received::Reconciled(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryRoom;
    use tracker_core::{Candidate, PcgRoller, TrackerConfig};

    const NS: &str = "test.ns";

    fn controller(room: &MemoryRoom, client: u64, wall: Arc<ManualClock>) -> SyncController {
        SyncController::new(
            Arc::new(room.clone()),
            MetadataCodec::new(NS),
            ClientId(client),
            wall,
        )
    }

    fn populated() -> TurnState {
        let mut state = TurnState::new(TrackerConfig::default());
        state.add_candidates(
            [Candidate::new("a", "A"), Candidate::new("b", "B")],
            &mut PcgRoller::new(1),
        );
        state
    }

    #[tokio::test]
    async fn own_echo_is_discarded() {
        let room = MemoryRoom::new();
        let mut rx = room.subscribe();
        let mut sync = controller(&room, 1, Arc::new(ManualClock::new(1_000)));
        let mut state = populated();

        let stamp = sync.publish(&mut state).await.unwrap();
        assert_eq!(state.last_update(), stamp);

        let echo = rx.recv().await.unwrap();
        let received = sync.receive(&mut state, &echo);
        assert!(matches!(
            received,
            Received::Reconciled(Reconcile::Stale { .. })
        ));
    }

    #[tokio::test]
    async fn peer_with_lagging_clock_still_wins_after_observing() {
        let room = MemoryRoom::new();
        let mut rx = room.subscribe();
        let mut ahead = controller(&room, 1, Arc::new(ManualClock::new(5_000)));
        let mut behind = controller(&room, 2, Arc::new(ManualClock::new(1_000)));
        let mut a = populated();
        let mut b = TurnState::default();

        ahead.publish(&mut a).await.unwrap();
        let mapping = rx.recv().await.unwrap();
        assert!(matches!(
            behind.receive(&mut b, &mapping),
            Received::Reconciled(Reconcile::Accepted)
        ));
        assert_eq!(b.order(), a.order());

        b.advance(tracker_core::Step::Next);
        let stamp = behind.publish(&mut b).await.unwrap();
        assert!(stamp > a.last_update());

        let mapping = rx.recv().await.unwrap();
        assert!(matches!(
            ahead.receive(&mut a, &mapping),
            Received::Reconciled(Reconcile::Accepted)
        ));
        assert_eq!(a.current(), Some(0));
    }

    #[tokio::test]
    async fn hydrate_adopts_room_state() {
        let room = MemoryRoom::new();
        let wall = Arc::new(ManualClock::new(10));
        let mut writer = controller(&room, 1, wall.clone());
        let mut written = populated();
        written.advance(tracker_core::Step::Next);
        writer.publish(&mut written).await.unwrap();

        let mut reader = controller(&room, 2, wall);
        let mut state = TurnState::default();
        let stamp = reader.hydrate(&mut state).await.unwrap();

        assert_eq!(stamp, Some(written.last_update()));
        assert_eq!(state.snapshot(), written.snapshot());
    }

    #[tokio::test]
    async fn hydrate_on_empty_room_keeps_state() {
        let room = MemoryRoom::new();
        let mut sync = controller(&room, 1, Arc::new(ManualClock::new(0)));
        let mut state = TurnState::default();
        assert_eq!(sync.hydrate(&mut state).await.unwrap(), None);
        assert!(state.is_empty());
    }

    #[tokio::test]
    async fn failed_write_keeps_local_state() {
        let room = MemoryRoom::new();
        room.reject_writes(true);
        let mut sync = controller(&room, 1, Arc::new(ManualClock::new(0)));
        let mut state = populated();

        let err = sync.publish(&mut state).await.unwrap_err();
        assert!(matches!(err, SyncError::Host(HostError::Rejected { .. })));
        assert_eq!(state.len(), 2);
        assert!(room.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exhausted_clock_refuses_to_publish() {
        let room = MemoryRoom::new();
        let mut sync = controller(&room, 1, Arc::new(ManualClock::new(5)));
        let mut state = populated();

        let far = Stamp::new(u64::MAX, u32::MAX, ClientId(9));
        let mut snapshot = state.snapshot();
        snapshot.stamp = far;
        let mapping = MetadataCodec::new(NS).encode(&snapshot).unwrap();
        assert!(matches!(
            sync.receive(&mut state, &mapping),
            Received::Reconciled(Reconcile::Accepted)
        ));

        let err = sync.publish(&mut state).await.unwrap_err();
        assert!(matches!(err, SyncError::ClockExhausted { last } if last == far));
        assert_eq!(state.last_update(), far);
        assert!(room.get().await.unwrap().is_empty());
    }

    #[test]
    fn malformed_and_foreign_mappings() {
        let room = MemoryRoom::new();
        let mut sync = controller(&room, 1, Arc::new(ManualClock::new(0)));
        let mut state = populated();

        let mut foreign = Metadata::new();
        foreign.insert("other/key".into(), serde_json::json!(true));
        assert!(matches!(sync.receive(&mut state, &foreign), Received::Ignored));

        let mut broken = Metadata::new();
        broken.insert(format!("{NS}/currentTurnIndex"), serde_json::json!("first"));
        assert!(matches!(sync.receive(&mut state, &broken), Received::Malformed(_)));
        assert_eq!(state.len(), 2);
    }
}

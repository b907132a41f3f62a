//! Session orchestrator.
//!
//! A session owns the worker task and the forwarders feeding it, wires up
//! the queue and event bus, and exposes a builder-based API for clients.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use tracker_core::TurnState;

use crate::api::{Result, RuntimeError, SessionHandle};
use crate::codec::MetadataCodec;
use crate::config::SessionConfig;
use crate::events::EventBus;
use crate::host::{
    ContextMenu, ItemFilter, ItemKind, Layer, MetadataStore, Notifier, Roster, SelectionSource,
    TracingNotifier,
};
use crate::roller::roller_for;
use crate::sync::{SyncController, SyncError, SystemClock, WallClock};
use crate::workers::{Collaborators, SessionEvent, SessionWorker, spawn_forwarder};

/// One client's connection to a shared turn order.
///
/// Design: Session owns the worker and forwarders.
/// [`SessionHandle`] provides a cloneable façade for clients.
///
/// Dropping a session without [`Session::shutdown`] stops the forwarders
/// and asks the worker to stop once it reaches the end of its queue.
pub struct Session {
    handle: SessionHandle,
    queue: mpsc::Sender<SessionEvent>,
    worker: Option<JoinHandle<()>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Session {
    /// Create a new session builder
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Get a cloneable handle to this session
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stops the session after every event already queued is handled.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop_forwarders();

        if self.queue.send(SessionEvent::Shutdown).await.is_err() {
            tracing::debug!(target: "tracker::worker", "session worker already stopped");
        }

        match self.worker.take() {
            Some(worker) => worker.await.map_err(RuntimeError::WorkerJoin),
            None => Ok(()),
        }
    }

    fn stop_forwarders(&mut self) {
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_forwarders();
        if self.worker.is_some()
            && let Err(TrySendError::Full(_)) = self.queue.try_send(SessionEvent::Shutdown)
        {
            tracing::warn!(target: "tracker::worker", "session dropped with a full queue, worker keeps running until its handles are gone");
        }
    }
}

/// Builder for [`Session`] with flexible configuration.
pub struct SessionBuilder {
    config: SessionConfig,
    store: Option<Arc<dyn MetadataStore>>,
    roster: Option<Arc<dyn Roster>>,
    selection: Option<Arc<dyn SelectionSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    wall_clock: Option<Arc<dyn WallClock>>,
}

impl SessionBuilder {
    fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            store: None,
            roster: None,
            selection: None,
            notifier: None,
            wall_clock: None,
        }
    }

    /// Override session configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the room metadata store (required)
    pub fn store(mut self, store: impl MetadataStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Set the scene roster (required)
    pub fn roster(mut self, roster: impl Roster + 'static) -> Self {
        self.roster = Some(Arc::new(roster));
        self
    }

    /// Set the player's selection source (required)
    pub fn selection(mut self, selection: impl SelectionSource + 'static) -> Self {
        self.selection = Some(Arc::new(selection));
        self
    }

    /// Set the notification sink (default: log only)
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Set the wall clock used for stamps (default: system time)
    pub fn wall_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.wall_clock = Some(Arc::new(clock));
        self
    }

    /// Build the session
    ///
    /// Subscribes to the host, registers the context menu, hydrates from the
    /// room and starts the worker. Subscriptions are taken before hydration
    /// so nothing written in between is missed.
    pub async fn build(self) -> Result<Session> {
        let store = self
            .store
            .ok_or(RuntimeError::MissingCollaborator("a metadata store"))?;
        let roster = self
            .roster
            .ok_or(RuntimeError::MissingCollaborator("a roster"))?;
        let selection = self
            .selection
            .ok_or(RuntimeError::MissingCollaborator("a selection source"))?;
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let wall_clock = self
            .wall_clock
            .unwrap_or_else(|| Arc::new(SystemClock));
        let config = self.config;

        let (queue_tx, queue_rx) = mpsc::channel::<SessionEvent>(config.command_buffer_size);
        let metadata_rx = store.subscribe();
        let roster_rx = roster.subscribe();
        let clicks_rx = selection.subscribe_clicks();

        let menu_id = format!("{}/context-menu", config.namespace);
        selection
            .register_context_menu(ContextMenu {
                id: menu_id.clone(),
                label: "Add to Turn Order".to_owned(),
                filter: ItemFilter {
                    layer: Some(Layer::Character),
                    kind: Some(ItemKind::Image),
                },
            })
            .await?;

        let mut state = TurnState::new(config.tracker.clone());
        let mut sync = SyncController::new(
            store,
            MetadataCodec::new(&config.namespace),
            config.client_id,
            wall_clock,
        );
        let hydrated = match sync.hydrate(&mut state).await {
            Ok(stamp) => stamp,
            Err(SyncError::Codec(err)) => {
                tracing::warn!(target: "tracker::sync", error = %err, "room holds unreadable turn state, starting empty");
                None
            }
            Err(err) => return Err(err.into()),
        };

        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let worker = SessionWorker::new(
            state,
            sync,
            Collaborators {
                roster,
                selection,
                notifier,
            },
            roller_for(config.roll_seed),
            config.highlight.clone(),
            menu_id,
            queue_rx,
            event_bus.clone(),
        );

        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        let forwarders = vec![
            spawn_forwarder("metadata", metadata_rx, queue_tx.clone(), SessionEvent::Metadata),
            spawn_forwarder("roster", roster_rx, queue_tx.clone(), SessionEvent::Roster),
            spawn_forwarder("context_menu", clicks_rx, queue_tx.clone(), SessionEvent::MenuClick),
        ];

        tracing::info!(
            target: "tracker::worker",
            client = %config.client_id,
            namespace = %config.namespace,
            hydrated = ?hydrated,
            "session started"
        );

        Ok(Session {
            handle: SessionHandle::new(queue_tx.clone(), event_bus, config.client_id),
            queue: queue_tx,
            worker: Some(worker),
            forwarders,
        })
    }
}

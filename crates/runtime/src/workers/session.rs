//! Session worker that owns the authoritative [`TurnState`].
//!
//! Receives commands from [`SessionHandle`](crate::SessionHandle) and host
//! notifications through one queue, applies them one at a time, and fans the
//! results out: store write, event bus, highlight.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use tracker_core::{
    InitiativeRoller, ItemId, Outcome, Reconcile, Stamp, TurnError, TurnSnapshot, TurnState,
};

use crate::api::{CommandReport, Request, Result};
use crate::events::{Event, EventBus, Origin, SyncEvent, TurnEvent};
use crate::highlight::{self, HighlightStyle};
use crate::host::{
    ContextMenuClick, HostError, Metadata, Notifier, Roster, RosterItem, SelectionSource, Severity,
};
use crate::sync::{Received, SyncController};

/// Commands that can be sent to the session worker
pub enum Command {
    /// Apply one request and report what it did.
    Apply {
        request: Request,
        reply: oneshot::Sender<Result<CommandReport>>,
    },
    /// Query the current turn state (read-only).
    Snapshot { reply: oneshot::Sender<TurnSnapshot> },
}

/// Everything the worker reacts to, in arrival order.
pub enum SessionEvent {
    Command(Command),
    Metadata(Metadata),
    Roster(Vec<RosterItem>),
    MenuClick(ContextMenuClick),
    Shutdown,
}

/// Host collaborators a worker talks to.
pub struct Collaborators {
    pub roster: Arc<dyn Roster>,
    pub selection: Arc<dyn SelectionSource>,
    pub notifier: Arc<dyn Notifier>,
}

/// Background task that processes turn-order events.
///
/// The worker is the only owner of the session's turn state. Ordering rules
/// live in `tracker_core`; this type only sequences them with host I/O.
pub struct SessionWorker {
    state: TurnState,
    sync: SyncController,
    host: Collaborators,
    roller: Box<dyn InitiativeRoller + Send + Sync>,
    highlight: HighlightStyle,
    menu_id: String,
    queue: mpsc::Receiver<SessionEvent>,
    event_bus: EventBus,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: TurnState,
        sync: SyncController,
        host: Collaborators,
        roller: Box<dyn InitiativeRoller + Send + Sync>,
        highlight: HighlightStyle,
        menu_id: String,
        queue: mpsc::Receiver<SessionEvent>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            target: "tracker::worker",
            client = %sync.client(),
            entries = state.len(),
            "SessionWorker initialized"
        );

        Self {
            state,
            sync,
            host,
            roller,
            highlight,
            menu_id,
            queue,
            event_bus,
        }
    }

    /// Main worker loop.
    ///
    /// State adopted at start is not announced on the bus; nobody can hold a
    /// handle yet. Subscribers read it with a snapshot instead.
    pub async fn run(mut self) {
        self.refresh_highlight().await;

        while let Some(event) = self.queue.recv().await {
            match event {
                SessionEvent::Command(command) => self.handle_command(command).await,
                SessionEvent::Metadata(metadata) => self.handle_metadata(&metadata).await,
                SessionEvent::Roster(items) => self.handle_roster(&items).await,
                SessionEvent::MenuClick(click) => self.handle_menu_click(click).await,
                SessionEvent::Shutdown => break,
            }
        }

        info!(target: "tracker::worker", client = %self.sync.client(), "SessionWorker stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Apply { request, reply } => {
                let result = self.handle_request(request).await;
                if reply.send(result).is_err() {
                    debug!(target: "tracker::worker", "Apply reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.state.snapshot()).is_err() {
                    debug!(target: "tracker::worker", "Snapshot reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn handle_request(&mut self, request: Request) -> Result<CommandReport> {
        let label = request.label();
        let mut report = match request {
            Request::AddSelected => {
                let items = self.read_selection().await?;
                self.insert(&items)
            }
            Request::AddItems(items) => self.insert(&items),
            Request::InvokeSelected => {
                let items = self.read_selection().await?;
                self.invoke(&items)
            }
            Request::Advance(step) => outcome_report(self.state.advance(step)),
            Request::Reset => outcome_report(self.state.reset()),
            Request::Nudge { index, direction } => match self.state.nudge(index, direction) {
                Ok(outcome) => outcome_report(outcome),
                Err(err) => self.refuse(err),
            },
            Request::Remove { index } => match self.state.remove(index) {
                Ok(removed) => {
                    debug!(target: "tracker::worker", name = %removed.name, index, "removed entry");
                    CommandReport::changed()
                }
                Err(err) => self.refuse(err),
            },
        };

        debug!(
            target: "tracker::worker",
            request = label,
            changed = report.is_changed(),
            current = ?self.state.current(),
            "request applied"
        );

        if report.is_changed() {
            report.published = self.commit(Origin::Local).await;
        }
        Ok(report)
    }

    fn insert(&mut self, items: &[RosterItem]) -> CommandReport {
        let candidates: Vec<_> = items.iter().filter_map(RosterItem::to_candidate).collect();
        let inserted = self.state.add_candidates(candidates, self.roller.as_mut());
        CommandReport {
            outcome: Outcome::from(inserted.inserted > 0),
            inserted: inserted.inserted,
            skipped: inserted.skipped,
            ..CommandReport::unchanged()
        }
    }

    fn invoke(&mut self, items: &[RosterItem]) -> CommandReport {
        let candidates: Vec<_> = items.iter().filter_map(RosterItem::to_candidate).collect();
        match self.state.add_invocations(candidates) {
            Ok(inserted) => CommandReport {
                outcome: Outcome::from(inserted > 0),
                inserted,
                ..CommandReport::unchanged()
            },
            Err(err) => self.refuse(err),
        }
    }

    /// Turns a refused operation into a report. User-facing refusals are
    /// shown; the rest are only logged.
    fn refuse(&self, err: TurnError) -> CommandReport {
        if err.is_user_facing() {
            warn!(target: "tracker::worker", code = err.error_code(), "{err}");
            self.host.notifier.show(&err.to_string(), Severity::Warning);
        } else {
            debug!(target: "tracker::worker", code = err.error_code(), "{err}");
        }
        self.event_bus.publish(Event::Turn(TurnEvent::Rejected {
            code: err.error_code().to_owned(),
            message: err.to_string(),
        }));
        CommandReport::rejected(err)
    }

    /// Publishes a local change, then refreshes observers. A failed write is
    /// reported and not retried; the local change stands.
    async fn commit(&mut self, origin: Origin) -> Option<Stamp> {
        let published = match self.sync.publish(&mut self.state).await {
            Ok(stamp) => {
                self.event_bus
                    .publish(Event::Sync(SyncEvent::Published { stamp }));
                Some(stamp)
            }
            Err(err) => {
                error!(target: "tracker::worker", error = %err, "failed to save turn order");
                self.host
                    .notifier
                    .show(&format!("Failed to save turn order: {err}"), Severity::Error);
                self.event_bus
                    .publish(Event::Sync(SyncEvent::PublishFailed {
                        reason: err.to_string(),
                    }));
                None
            }
        };

        self.emit_changed(origin);
        self.refresh_highlight().await;
        published
    }

    async fn handle_metadata(&mut self, metadata: &Metadata) {
        match self.sync.receive(&mut self.state, metadata) {
            Received::Ignored => {}
            Received::Malformed(err) => {
                self.event_bus.publish(Event::Sync(SyncEvent::Malformed {
                    reason: err.to_string(),
                }));
            }
            Received::Reconciled(Reconcile::Stale { remote, local }) => {
                self.event_bus
                    .publish(Event::Sync(SyncEvent::Discarded { remote, local }));
            }
            Received::Reconciled(Reconcile::Accepted) => {
                let stamp = self.state.last_update();
                self.event_bus
                    .publish(Event::Sync(SyncEvent::Accepted { stamp }));
                self.emit_changed(Origin::Remote);
                self.refresh_highlight().await;
            }
        }
    }

    async fn handle_roster(&mut self, items: &[RosterItem]) {
        let live: HashSet<ItemId> = items.iter().map(|item| item.id.clone()).collect();
        let report = self.state.prune(&live);
        if report.removed == 0 {
            return;
        }

        info!(
            target: "tracker::worker",
            removed = report.removed,
            current = ?report.current,
            "pruned entries whose tokens left the scene"
        );
        self.commit(Origin::Pruned).await;
    }

    async fn handle_menu_click(&mut self, click: ContextMenuClick) {
        if click.menu_id != self.menu_id {
            return;
        }
        if let Err(err) = self.handle_request(Request::AddItems(click.items)).await {
            error!(target: "tracker::worker", error = %err, "context menu request failed");
        }
    }

    fn emit_changed(&self, origin: Origin) {
        self.event_bus.publish(Event::Turn(TurnEvent::Changed {
            snapshot: self.state.snapshot(),
            origin,
        }));
    }

    async fn refresh_highlight(&self) {
        let target = self.state.current_entry().and_then(|entry| entry.id());
        if let Err(err) = highlight::project(self.host.roster.as_ref(), target, &self.highlight).await {
            self.host_failed("update the turn highlight", &err);
        }
    }

    /// A failed selection read refuses the request; the caller gets the error.
    async fn read_selection(&self) -> Result<Vec<RosterItem>> {
        self.host.selection.selection().await.map_err(|err| {
            self.host_failed("read the selection", &err);
            err.into()
        })
    }

    /// Reports a host I/O failure to the user and the bus. Not retried.
    fn host_failed(&self, operation: &'static str, err: &HostError) {
        error!(target: "tracker::worker", operation, error = %err, "host operation failed");
        self.host
            .notifier
            .show(&format!("Failed to {operation}: {err}"), Severity::Error);
        self.event_bus.publish(Event::Turn(TurnEvent::HostFailed {
            operation: operation.to_owned(),
            reason: err.to_string(),
        }));
    }
}

fn outcome_report(outcome: Outcome) -> CommandReport {
    match outcome {
        Outcome::Changed => CommandReport::changed(),
        Outcome::Unchanged => CommandReport::unchanged(),
    }
}

//! Cloneable façade for issuing commands to a session.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! every turn-order action plus event streaming from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use tracker_core::{ClientId, Direction, Step, TurnSnapshot};

use super::errors::{Result, RuntimeError};
use super::request::{CommandReport, Request};
use crate::events::{Event, EventBus, Topic};
use crate::host::RosterItem;
use crate::workers::{Command, SessionEvent};

/// Client-facing handle to interact with a session
#[derive(Clone)]
pub struct SessionHandle {
    queue: mpsc::Sender<SessionEvent>,
    event_bus: EventBus,
    client: ClientId,
}

impl SessionHandle {
    pub(crate) fn new(queue: mpsc::Sender<SessionEvent>, event_bus: EventBus, client: ClientId) -> Self {
        Self {
            queue,
            event_bus,
            client,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client
    }

    /// Run one request to completion, including the store write.
    pub async fn request(&self, request: Request) -> Result<CommandReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.queue
            .send(SessionEvent::Command(Command::Apply {
                request,
                reply: reply_tx,
            }))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    pub async fn add_selected(&self) -> Result<CommandReport> {
        self.request(Request::AddSelected).await
    }

    pub async fn add_items(&self, items: Vec<RosterItem>) -> Result<CommandReport> {
        self.request(Request::AddItems(items)).await
    }

    pub async fn invoke_selected(&self) -> Result<CommandReport> {
        self.request(Request::InvokeSelected).await
    }

    pub async fn next_turn(&self) -> Result<CommandReport> {
        self.request(Request::Advance(Step::Next)).await
    }

    pub async fn previous_turn(&self) -> Result<CommandReport> {
        self.request(Request::Advance(Step::Previous)).await
    }

    pub async fn reset_turns(&self) -> Result<CommandReport> {
        self.request(Request::Reset).await
    }

    pub async fn move_up(&self, index: usize) -> Result<CommandReport> {
        self.request(Request::Nudge {
            index,
            direction: Direction::Up,
        })
        .await
    }

    pub async fn move_down(&self, index: usize) -> Result<CommandReport> {
        self.request(Request::Nudge {
            index,
            direction: Direction::Down,
        })
        .await
    }

    pub async fn remove(&self, index: usize) -> Result<CommandReport> {
        self.request(Request::Remove { index }).await
    }

    /// Query the current turn state (read-only snapshot)
    pub async fn snapshot(&self) -> Result<TurnSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.queue
            .send(SessionEvent::Command(Command::Snapshot { reply: reply_tx }))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Turn` - Committed turn-order changes and refused commands
    /// - `Topic::Sync` - Store writes, accepted and discarded remote state
    ///
    /// Only events published after this call are delivered. Subscribe first,
    /// then take a [`SessionHandle::snapshot`] for the starting view; the
    /// state a session adopts from the room at start is never published.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

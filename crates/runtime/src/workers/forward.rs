//! Forwarders from host subscriptions into the session queue.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::SessionEvent;

/// Drains `rx` into `queue`, wrapping each message with `wrap`.
///
/// Every host notification carries the full state, so a lagged receiver
/// only logs and keeps going. The task ends when either side closes.
pub fn spawn_forwarder<T, F>(
    source: &'static str,
    mut rx: broadcast::Receiver<T>,
    queue: mpsc::Sender<SessionEvent>,
    wrap: F,
) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
    F: Fn(T) -> SessionEvent + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    if queue.send(wrap(message)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "tracker::worker", source, skipped, "subscription lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!(target: "tracker::worker", source, "forwarder stopped");
    })
}

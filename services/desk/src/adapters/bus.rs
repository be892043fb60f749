//! services/desk/src/adapters/bus.rs
//!
//! In-process implementation of the `ChangeBus` port on top of a tokio
//! broadcast channel. The same contract holds whether the "other session"
//! is a second task in this process or a test harness firing synthetic
//! events.

use futures::stream;
use tokio::sync::broadcast;
use tracing::warn;

use coachdesk_core::ports::{ChangeBus, ChangeEvent, ChangeStream, StoreKey};

/// Fan-out change-notification channel shared by every session attached
/// to the same store.
pub struct BroadcastBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        // Delivery is best-effort: a subscriber that falls more than a
        // buffer's worth of events behind just loses the old ones and
        // recovers via a manual refresh.
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }
}

impl Default for BroadcastBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus for BroadcastBus {
    fn publish(&self, key: StoreKey) {
        // No live subscribers is not an error.
        let _ = self.tx.send(ChangeEvent { key });
    }

    fn subscribe(&self) -> ChangeStream {
        let rx = self.tx.subscribe();
        Box::pin(stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(event) => return Some((event, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "change bus subscriber lagged, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

//! services/desk/src/engine/sync.rs
//!
//! Cross-session synchronization: subscribes one desk session to the
//! change bus and invalidates its cached collections as other sessions
//! write the shared store. Reconciliation is whole-collection replace;
//! there is no per-entity merge.

use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use coachdesk_core::ports::{ChangeBus, ChangeStream};

use crate::engine::session::DeskSession;

/// The change listener for one session. Create it before other sessions
/// start writing, then either spawn [`run`](Self::run) for continuous
/// delivery or drive it one event at a time with [`pump`](Self::pump).
pub struct CrossSessionSync {
    session: Arc<DeskSession>,
    events: ChangeStream,
}

impl CrossSessionSync {
    pub fn new(session: Arc<DeskSession>, bus: &dyn ChangeBus) -> Self {
        Self {
            session,
            events: bus.subscribe(),
        }
    }

    /// Processes exactly one pending change event, waiting for it if
    /// necessary. Returns `false` once the bus has shut down.
    pub async fn pump(&mut self) -> bool {
        match self.events.next().await {
            Some(event) => {
                debug!(key = %event.key, "applying change event");
                self.session.invalidate(event.key).await;
                true
            }
            None => false,
        }
    }

    /// Runs the listener until the bus closes or `shutdown` fires.
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("change listener stopped");
                    return;
                }
                event = self.events.next() => match event {
                    Some(event) => {
                        debug!(key = %event.key, "applying change event");
                        self.session.invalidate(event.key).await;
                    }
                    None => {
                        info!("change bus closed, listener exiting");
                        return;
                    }
                },
            }
        }
    }
}

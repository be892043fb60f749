//! services/desk/src/engine/session.rs
//!
//! One desk session: the in-memory view of the shared persisted state
//! held by a single running client. Several sessions may point at the
//! same store; the change bus keeps their views eventually consistent.

use std::sync::Arc;

use coachdesk_core::ports::{StoreKey, StudentDirectory};
use coachdesk_core::store::PersistedStore;

use crate::engine::messages::MessageFeed;
use crate::engine::notifications::NotificationRegistry;
use crate::engine::tickets::TicketRepository;

/// Owns the three collection components of one client session. All
/// reads and writes go through the injected [`PersistedStore`]; this
/// struct never touches the durable medium directly.
pub struct DeskSession {
    tickets: TicketRepository,
    notifications: NotificationRegistry,
    messages: MessageFeed,
}

impl DeskSession {
    pub fn new(store: Arc<PersistedStore>, directory: Arc<dyn StudentDirectory>) -> Self {
        Self {
            tickets: TicketRepository::new(store.clone(), directory),
            notifications: NotificationRegistry::new(store.clone()),
            messages: MessageFeed::new(store),
        }
    }

    pub fn tickets(&self) -> &TicketRepository {
        &self.tickets
    }

    pub fn notifications(&self) -> &NotificationRegistry {
        &self.notifications
    }

    pub fn messages(&self) -> &MessageFeed {
        &self.messages
    }

    /// Reacts to a change event for one store key: the cached collection
    /// is discarded and re-read in full on the next access. Derived views
    /// (lists, stats, unread counts) are recomputed from that fresh
    /// snapshot since they are never cached.
    pub async fn invalidate(&self, key: StoreKey) {
        match key {
            StoreKey::SupportTickets => self.tickets.invalidate().await,
            StoreKey::ManagementNotifications => self.notifications.invalidate().await,
            StoreKey::StudentSupportMessages => self.messages.invalidate().await,
        }
    }

    /// Manual refresh: re-reads every collection without waiting for a
    /// change event. This is the recovery path for a missed or late
    /// event.
    pub async fn refresh(&self) {
        self.tickets.reload().await;
        self.notifications.reload().await;
        self.messages.reload().await;
    }
}

//! services/desk/src/engine/notifications.rs
//!
//! The notification registry: exclusive owner of the
//! `managementNotifications` collection. Notifications are never deleted,
//! only marked read; the unread count is recomputed on demand.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use coachdesk_core::domain::{Notification, NotificationKind};
use coachdesk_core::ports::StoreKey;
use coachdesk_core::store::PersistedStore;

/// Fields supplied when a ticket or message event raises a notification.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub student_id: String,
    pub message_id: Option<Uuid>,
    pub ticket_id: Option<Uuid>,
}

pub struct NotificationRegistry {
    store: Arc<PersistedStore>,
    cache: RwLock<Option<Vec<Notification>>>,
}

impl NotificationRegistry {
    pub fn new(store: Arc<PersistedStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(None),
        }
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    pub async fn reload(&self) {
        self.invalidate().await;
        self.load().await;
    }

    async fn load(&self) -> Vec<Notification> {
        {
            let cache = self.cache.read().await;
            if let Some(notifications) = cache.as_ref() {
                return notifications.clone();
            }
        }
        let notifications: Vec<Notification> =
            self.store.read(StoreKey::ManagementNotifications).await;
        *self.cache.write().await = Some(notifications.clone());
        notifications
    }

    /// The cache tracks what was actually persisted: a dropped write
    /// discards it so the next access re-reads the store.
    async fn commit(&self, notifications: Vec<Notification>) {
        if self
            .store
            .write(StoreKey::ManagementNotifications, &notifications)
            .await
        {
            *self.cache.write().await = Some(notifications);
        } else {
            *self.cache.write().await = None;
        }
    }

    /// Appends a new notification. New entries are always unread.
    pub async fn add(&self, draft: NotificationDraft) -> Notification {
        let mut notifications = self.load().await;
        let notification = Notification {
            id: Uuid::new_v4(),
            kind: draft.kind,
            title: draft.title,
            description: draft.description,
            timestamp: Utc::now(),
            is_read: false,
            student_id: draft.student_id,
            message_id: draft.message_id,
            ticket_id: draft.ticket_id,
        };
        notifications.push(notification.clone());
        self.commit(notifications).await;
        notification
    }

    /// Marks one notification read. Idempotent: an already-read or
    /// unknown id is a no-op and does not touch the store.
    pub async fn mark_read(&self, id: Uuid) {
        let mut notifications = self.load().await;
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                self.commit(notifications).await;
            }
            Some(_) => {}
            None => debug!(notification = %id, "mark-read for unknown notification ignored"),
        }
    }

    /// Marks every notification read in a single write.
    pub async fn mark_all_read(&self) {
        let mut notifications = self.load().await;
        let mut changed = false;
        for n in notifications.iter_mut() {
            if !n.is_read {
                n.is_read = true;
                changed = true;
            }
        }
        if changed {
            self.commit(notifications).await;
        }
    }

    /// Recomputed on demand; the collection is expected to stay small.
    pub async fn unread_count(&self) -> usize {
        self.load().await.iter().filter(|n| !n.is_read).count()
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.load().await
    }
}

//! services/desk/src/engine/messages.rs
//!
//! The student support-message feed: owner of the
//! `studentSupportMessages` collection. Same write/notify discipline as
//! tickets, but a plain append-only stream with read markers and no state
//! machine.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use coachdesk_core::domain::{AuthorRole, MessageKind, StudentMessage};
use coachdesk_core::ports::StoreKey;
use coachdesk_core::store::PersistedStore;

/// A message as submitted; the feed assigns the id and timestamp.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub sender: AuthorRole,
    pub sender_name: String,
    pub message: String,
    pub kind: MessageKind,
    pub student_id: String,
}

pub struct MessageFeed {
    store: Arc<PersistedStore>,
    cache: RwLock<Option<Vec<StudentMessage>>>,
}

impl MessageFeed {
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

    async fn load(&self) -> Vec<StudentMessage> {
        {
            let cache = self.cache.read().await;
            if let Some(messages) = cache.as_ref() {
                return messages.clone();
            }
        }
        let messages: Vec<StudentMessage> =
            self.store.read(StoreKey::StudentSupportMessages).await;
        *self.cache.write().await = Some(messages.clone());
        messages
    }

    /// The cache tracks what was actually persisted: a dropped write
    /// discards it so the next access re-reads the store.
    async fn commit(&self, messages: Vec<StudentMessage>) {
        if self
            .store
            .write(StoreKey::StudentSupportMessages, &messages)
            .await
        {
            *self.cache.write().await = Some(messages);
        } else {
            *self.cache.write().await = None;
        }
    }

    pub async fn append(&self, draft: MessageDraft) -> StudentMessage {
        let mut messages = self.load().await;
        let message = StudentMessage {
            id: Uuid::new_v4(),
            sender: draft.sender,
            sender_name: draft.sender_name,
            message: draft.message,
            timestamp: Utc::now(),
            is_read: false,
            kind: draft.kind,
            student_id: draft.student_id,
        };
        messages.push(message.clone());
        self.commit(messages).await;
        message
    }

    /// Idempotent; an already-read or unknown id is a no-op.
    pub async fn mark_read(&self, id: Uuid) {
        let mut messages = self.load().await;
        match messages.iter_mut().find(|m| m.id == id) {
            Some(m) if !m.is_read => {
                m.is_read = true;
                self.commit(messages).await;
            }
            Some(_) => {}
            None => debug!(message = %id, "mark-read for unknown message ignored"),
        }
    }

    pub async fn unread_count(&self) -> usize {
        self.load().await.iter().filter(|m| !m.is_read).count()
    }

    pub async fn list(&self) -> Vec<StudentMessage> {
        self.load().await
    }
}

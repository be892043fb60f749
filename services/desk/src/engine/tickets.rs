//! services/desk/src/engine/tickets.rs
//!
//! The ticket repository: exclusive owner of the `supportTickets`
//! collection. Only this component mutates ticket status, responses, and
//! `updated_at`. It keeps a per-session in-memory cache that is discarded
//! whenever another session writes the collection, and re-read lazily on
//! the next access.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use coachdesk_core::domain::{
    AuthorRole, StatusEvent, SupportTicket, TicketAttachment, TicketCategory, TicketPriority,
    TicketResponse, TicketStats, TicketStatus,
};
use coachdesk_core::ports::{StoreKey, StudentDirectory};
use coachdesk_core::query::{self, SortKey, StatusFilter};
use coachdesk_core::store::PersistedStore;

/// Fields supplied by the student-facing submission path when a ticket is
/// created. Everything else (id, number, status, timestamps) is assigned
/// by the repository.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub student_id: String,
    pub subject: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub attachments: Vec<TicketAttachment>,
}

/// A response as submitted; the repository assigns the id and timestamp.
#[derive(Debug, Clone)]
pub struct ResponseDraft {
    pub author_type: AuthorRole,
    pub author_name: String,
    pub message: String,
    pub is_internal: bool,
}

pub struct TicketRepository {
    store: Arc<PersistedStore>,
    directory: Arc<dyn StudentDirectory>,
    cache: RwLock<Option<Vec<SupportTicket>>>,
}

impl TicketRepository {
    pub fn new(store: Arc<PersistedStore>, directory: Arc<dyn StudentDirectory>) -> Self {
        Self {
            store,
            directory,
            cache: RwLock::new(None),
        }
    }

    /// Discards the in-memory snapshot; the next access re-reads the full
    /// collection from the store.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Invalidate and eagerly re-read.
    pub async fn reload(&self) {
        self.invalidate().await;
        self.load().await;
    }

    async fn load(&self) -> Vec<SupportTicket> {
        {
            let cache = self.cache.read().await;
            if let Some(tickets) = cache.as_ref() {
                return tickets.clone();
            }
        }
        let tickets: Vec<SupportTicket> = self.store.read(StoreKey::SupportTickets).await;
        *self.cache.write().await = Some(tickets.clone());
        tickets
    }

    /// Writes the full collection back (whole-collection replace is the
    /// conflict policy). The cache tracks what was actually persisted:
    /// on a dropped write it is discarded so the next access re-reads
    /// the store's real state instead of showing the lost mutation.
    async fn commit(&self, tickets: Vec<SupportTicket>) {
        if self.store.write(StoreKey::SupportTickets, &tickets).await {
            *self.cache.write().await = Some(tickets);
        } else {
            *self.cache.write().await = None;
        }
    }

    /// Creates a ticket on behalf of the student-facing submission path.
    /// New tickets always start `open`.
    pub async fn create(&self, new: NewTicket) -> SupportTicket {
        let mut tickets = self.load().await;
        let now = Utc::now();
        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            ticket_number: next_ticket_number(&tickets),
            student_id: new.student_id,
            subject: new.subject,
            description: new.description,
            category: new.category,
            priority: new.priority,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
            responses: Vec::new(),
            attachments: new.attachments,
        };
        tickets.push(ticket.clone());
        self.commit(tickets).await;
        ticket
    }

    /// Applies an explicit status change. An unknown id is a silent
    /// no-op; the transition itself is never validated.
    pub async fn update_status(&self, id: Uuid, status: TicketStatus) {
        let mut tickets = self.load().await;
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
            debug!(ticket = %id, "status update for unknown ticket ignored");
            return;
        };
        ticket.status = ticket.status.apply(StatusEvent::Set(status));
        ticket.updated_at = Utc::now();
        self.commit(tickets).await;
    }

    /// Appends a response. A trainer reply progresses an open ticket to
    /// `in_progress` through the same transition table as
    /// [`update_status`](Self::update_status); a resolved or closed
    /// ticket keeps its status. An unknown id is a silent no-op.
    pub async fn add_response(&self, id: Uuid, draft: ResponseDraft) {
        let mut tickets = self.load().await;
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
            debug!(ticket = %id, "response for unknown ticket ignored");
            return;
        };
        let now = Utc::now();
        let event = match draft.author_type {
            AuthorRole::Trainer => StatusEvent::TrainerResponse,
            AuthorRole::Student => StatusEvent::StudentResponse,
        };
        ticket.responses.push(TicketResponse {
            id: Uuid::new_v4(),
            ticket_id: ticket.id,
            author_type: draft.author_type,
            author_name: draft.author_name,
            message: draft.message,
            timestamp: now,
            is_internal: draft.is_internal,
        });
        ticket.status = ticket.status.apply(event);
        ticket.updated_at = now;
        self.commit(tickets).await;
    }

    /// Filters, searches, and sorts the collection for the presentation
    /// layer. Student display names are resolved through the directory.
    pub async fn list(
        &self,
        filter: StatusFilter,
        sort: SortKey,
        search: &str,
    ) -> Vec<SupportTicket> {
        let tickets = self.load().await;
        let mut names: HashMap<String, Option<String>> = HashMap::new();
        for ticket in &tickets {
            if names.contains_key(&ticket.student_id) {
                continue;
            }
            let name = match self.directory.student_info(&ticket.student_id).await {
                Ok(info) => info.map(|i| i.name),
                Err(e) => {
                    warn!(student = %ticket.student_id, error = %e, "student lookup failed");
                    None
                }
            };
            names.insert(ticket.student_id.clone(), name);
        }
        query::filter_and_sort(&tickets, filter, sort, search, |id| {
            names.get(id).cloned().flatten()
        })
    }

    /// Derived statistics over the current snapshot.
    pub async fn stats(&self) -> TicketStats {
        query::compute_stats(&self.load().await, Utc::now())
    }
}

/// Next human-readable ticket number: `TK-1001`, `TK-1002`, ...
fn next_ticket_number(tickets: &[SupportTicket]) -> String {
    let max = tickets
        .iter()
        .filter_map(|t| t.ticket_number.strip_prefix("TK-"))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(1000);
    format!("TK-{}", max + 1)
}

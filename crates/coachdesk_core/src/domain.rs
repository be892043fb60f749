//! crates/coachdesk_core/src/domain.rs
//!
//! Defines the core data structures of the support-desk engine, together
//! with the status transition table. The serde attributes pin the exact
//! wire shape of the persisted collections (camelCase fields, snake_case
//! enum values), independent of any particular store backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Support Tickets
//=========================================================================================

/// A trackable support request raised on behalf of a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: Uuid,
    /// Human-readable, unique, immutable after creation (e.g. `TK-1001`).
    pub ticket_number: String,
    /// Reference to an externally-owned student record; never mutated here.
    pub student_id: String,
    pub subject: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    /// Always >= `created_at`; stamped on every mutation.
    pub updated_at: DateTime<Utc>,
    /// Append-only; insertion order is chronological order.
    #[serde(default)]
    pub responses: Vec<TicketResponse>,
    #[serde(default)]
    pub attachments: Vec<TicketAttachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    Exercise,
    Diet,
    Supplement,
    Consultation,
    Technical,
    Payment,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    /// Sort rank: urgent sorts before low.
    pub fn rank(self) -> u8 {
        match self {
            TicketPriority::Urgent => 0,
            TicketPriority::High => 1,
            TicketPriority::Medium => 2,
            TicketPriority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Sort rank: open sorts before closed.
    pub fn rank(self) -> u8 {
        match self {
            TicketStatus::Open => 0,
            TicketStatus::InProgress => 1,
            TicketStatus::Resolved => 2,
            TicketStatus::Closed => 3,
        }
    }

    /// The status transition table, consulted by both the explicit
    /// status-update path and the response-append path so the two cannot
    /// drift apart.
    ///
    /// `Set` is applied unconditionally: the engine does not validate
    /// transitions, it simply never exposes a way out of `closed`. A
    /// trainer response progresses an open ticket but never reopens a
    /// resolved or closed one; a student response never changes status.
    pub fn apply(self, event: StatusEvent) -> TicketStatus {
        match event {
            StatusEvent::Set(next) => next,
            StatusEvent::TrainerResponse => match self {
                TicketStatus::Open | TicketStatus::InProgress => TicketStatus::InProgress,
                terminal => terminal,
            },
            StatusEvent::StudentResponse => self,
        }
    }
}

/// An event that may move a ticket through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// An explicit trainer action selecting a new status.
    Set(TicketStatus),
    TrainerResponse,
    StudentResponse,
}

/// A threaded message attached to a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: Uuid,
    /// Back-reference to the owning ticket; non-owning.
    pub ticket_id: Uuid,
    pub author_type: AuthorRole,
    pub author_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// Trainer-only note, hidden from the student-facing surface.
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    Trainer,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAttachment {
    pub id: Uuid,
    pub name: String,
    pub url: String,
}

//=========================================================================================
// Notifications
//=========================================================================================

/// A lightweight "unread" marker surfaced to the trainer for a ticket or
/// message event. Never deleted, only marked read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SupportMessage,
    SupportTicket,
}

//=========================================================================================
// Student Messages
//=========================================================================================

/// A message in the plain student support stream. Shares the same
/// write/notify discipline as tickets but carries no state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMessage {
    pub id: Uuid,
    pub sender: AuthorRole,
    pub sender_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub student_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    File,
}

//=========================================================================================
// External Records & Derived Views
//=========================================================================================

/// A record from the externally-owned student directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub image: String,
}

/// Derived ticket statistics. Computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub in_progress_tickets: usize,
    pub resolved_tickets: usize,
    pub closed_tickets: usize,
    /// Tickets created on the current calendar day, local time.
    pub today_tickets: usize,
    /// Mean time to the first trainer response, in whole hours. Zero when
    /// no ticket has a trainer response yet.
    pub average_response_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_set_is_applied_unconditionally() {
        // The table is permissive: it never rejects a transition, the
        // public API just never offers a way out of `closed`.
        assert_eq!(
            TicketStatus::Closed.apply(StatusEvent::Set(TicketStatus::Open)),
            TicketStatus::Open
        );
        assert_eq!(
            TicketStatus::Open.apply(StatusEvent::Set(TicketStatus::Resolved)),
            TicketStatus::Resolved
        );
    }

    #[test]
    fn trainer_response_progresses_open_tickets() {
        assert_eq!(
            TicketStatus::Open.apply(StatusEvent::TrainerResponse),
            TicketStatus::InProgress
        );
        assert_eq!(
            TicketStatus::InProgress.apply(StatusEvent::TrainerResponse),
            TicketStatus::InProgress
        );
    }

    #[test]
    fn trainer_response_never_reopens_terminal_tickets() {
        assert_eq!(
            TicketStatus::Resolved.apply(StatusEvent::TrainerResponse),
            TicketStatus::Resolved
        );
        assert_eq!(
            TicketStatus::Closed.apply(StatusEvent::TrainerResponse),
            TicketStatus::Closed
        );
    }

    #[test]
    fn student_response_never_changes_status() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(status.apply(StatusEvent::StudentResponse), status);
        }
    }

    #[test]
    fn wire_values_are_snake_case() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let json = serde_json::to_string(&NotificationKind::SupportMessage).unwrap();
        assert_eq!(json, "\"support_message\"");
    }
}

//! services/desk/src/web/routes.rs
//!
//! Axum handlers exposing the engine's contract to the presentation
//! layer: ticket listing and stats, lifecycle mutations, notifications,
//! the student message feed, and manual refresh.
//!
//! Mutations on an unknown id return 200: not-found resolves as a silent
//! no-op, and callers cannot distinguish "succeeded" from "target absent"
//! through the response alone.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use coachdesk_core::domain::{
    AuthorRole, MessageKind, Notification, NotificationKind, StudentMessage, SupportTicket,
    TicketAttachment, TicketCategory, TicketPriority, TicketStats, TicketStatus,
};
use coachdesk_core::query::{SortKey, StatusFilter};

use crate::engine::messages::MessageDraft;
use crate::engine::notifications::NotificationDraft;
use crate::engine::tickets::{NewTicket, ResponseDraft};
use crate::web::state::AppState;

//=========================================================================================
// Request Payloads
//=========================================================================================

#[derive(Deserialize)]
pub struct ListTicketsParams {
    /// `all` or one of the ticket statuses.
    pub status: Option<String>,
    pub sort: Option<SortKey>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUpload {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub student_id: String,
    pub subject: String,
    pub description: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    #[serde(default)]
    pub attachments: Vec<AttachmentUpload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: TicketStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponseRequest {
    pub author_type: AuthorRole,
    pub author_name: String,
    pub message: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub sender: AuthorRole,
    pub sender_name: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<MessageKind>,
    pub student_id: String,
}

//=========================================================================================
// Ticket Handlers
//=========================================================================================

/// `GET /tickets`: the filtered, searched, sorted ticket list.
pub async fn list_tickets_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Json<Vec<SupportTicket>> {
    let filter = params
        .status
        .as_deref()
        .and_then(|s| s.parse::<StatusFilter>().ok())
        .unwrap_or_default();
    let sort = params.sort.unwrap_or_default();
    let query = params.q.unwrap_or_default();
    Json(state.session.tickets().list(filter, sort, &query).await)
}

/// `GET /tickets/stats`: derived statistics over the current snapshot.
pub async fn ticket_stats_handler(State(state): State<Arc<AppState>>) -> Json<TicketStats> {
    Json(state.session.tickets().stats().await)
}

/// `POST /tickets`: the student-facing submission path. Creates the
/// ticket and raises a notification for the trainer.
pub async fn create_ticket_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketRequest>,
) -> Json<SupportTicket> {
    let ticket = state
        .session
        .tickets()
        .create(NewTicket {
            student_id: body.student_id.clone(),
            subject: body.subject.clone(),
            description: body.description,
            category: body.category,
            priority: body.priority,
            attachments: body
                .attachments
                .into_iter()
                .map(|a| TicketAttachment {
                    id: Uuid::new_v4(),
                    name: a.name,
                    url: a.url,
                })
                .collect(),
        })
        .await;

    state
        .session
        .notifications()
        .add(NotificationDraft {
            kind: NotificationKind::SupportTicket,
            title: format!("New support ticket {}", ticket.ticket_number),
            description: body.subject,
            student_id: body.student_id,
            message_id: None,
            ticket_id: Some(ticket.id),
        })
        .await;

    Json(ticket)
}

/// `POST /tickets/{id}/status`
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> StatusCode {
    state.session.tickets().update_status(id, body.status).await;
    StatusCode::OK
}

/// `POST /tickets/{id}/responses`
pub async fn add_response_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddResponseRequest>,
) -> StatusCode {
    state
        .session
        .tickets()
        .add_response(
            id,
            ResponseDraft {
                author_type: body.author_type,
                author_name: body.author_name,
                message: body.message,
                is_internal: body.is_internal,
            },
        )
        .await;
    StatusCode::OK
}

//=========================================================================================
// Notification Handlers
//=========================================================================================

/// `GET /notifications`
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<Notification>> {
    Json(state.session.notifications().list().await)
}

/// `GET /notifications/unread-count`
pub async fn unread_count_handler(State(state): State<Arc<AppState>>) -> Json<usize> {
    Json(state.session.notifications().unread_count().await)
}

/// `POST /notifications/{id}/read`
pub async fn mark_read_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.session.notifications().mark_read(id).await;
    StatusCode::OK
}

/// `POST /notifications/read-all`
pub async fn mark_all_read_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.notifications().mark_all_read().await;
    StatusCode::OK
}

//=========================================================================================
// Message Feed Handlers
//=========================================================================================

/// `GET /messages`
pub async fn list_messages_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<StudentMessage>> {
    Json(state.session.messages().list().await)
}

/// `POST /messages`: appends to the student message feed and raises a
/// notification for the trainer.
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageRequest>,
) -> Json<StudentMessage> {
    let message = state
        .session
        .messages()
        .append(MessageDraft {
            sender: body.sender,
            sender_name: body.sender_name.clone(),
            message: body.message.clone(),
            kind: body.kind.unwrap_or(MessageKind::Text),
            student_id: body.student_id.clone(),
        })
        .await;

    state
        .session
        .notifications()
        .add(NotificationDraft {
            kind: NotificationKind::SupportMessage,
            title: format!("New message from {}", body.sender_name),
            description: body.message,
            student_id: body.student_id,
            message_id: Some(message.id),
            ticket_id: None,
        })
        .await;

    Json(message)
}

/// `POST /messages/{id}/read`
pub async fn mark_message_read_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.session.messages().mark_read(id).await;
    StatusCode::OK
}

//=========================================================================================
// Session Handlers
//=========================================================================================

/// `POST /refresh`: re-reads every collection without waiting for a
/// change event; recovers from a missed or late event.
pub async fn refresh_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.refresh().await;
    StatusCode::OK
}

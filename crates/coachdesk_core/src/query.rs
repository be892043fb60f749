//! crates/coachdesk_core/src/query.rs
//!
//! Pure query functions over the in-memory ticket collection: filtering,
//! free-text search, sorting, and derived statistics. Consumed by the
//! ticket repository on behalf of the presentation layer; nothing here
//! touches the store.

use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use std::str::FromStr;

use crate::domain::{AuthorRole, SupportTicket, TicketStats, TicketStatus};

/// Status filter applied before searching and sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TicketStatus),
}

impl FromStr for StatusFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "open" => Ok(StatusFilter::Only(TicketStatus::Open)),
            "in_progress" => Ok(StatusFilter::Only(TicketStatus::InProgress)),
            "resolved" => Ok(StatusFilter::Only(TicketStatus::Resolved)),
            "closed" => Ok(StatusFilter::Only(TicketStatus::Closed)),
            _ => Err(()),
        }
    }
}

/// Sort order for the ticket list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Priority,
    Status,
}

/// Filters, searches, and sorts a snapshot of the ticket collection.
///
/// The search is a case-insensitive substring match over the student's
/// display name (resolved through `student_name_of`), subject,
/// description, and ticket number. Sorting is stable, so ties keep their
/// stored order.
pub fn filter_and_sort(
    tickets: &[SupportTicket],
    filter: StatusFilter,
    sort: SortKey,
    search: &str,
    student_name_of: impl Fn(&str) -> Option<String>,
) -> Vec<SupportTicket> {
    let needle = search.trim().to_lowercase();
    let mut out: Vec<SupportTicket> = tickets
        .iter()
        .filter(|t| match filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => t.status == status,
        })
        .filter(|t| {
            if needle.is_empty() {
                return true;
            }
            let name = student_name_of(&t.student_id).unwrap_or_default();
            name.to_lowercase().contains(&needle)
                || t.subject.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.ticket_number.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    match sort {
        SortKey::Newest => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Priority => out.sort_by_key(|t| t.priority.rank()),
        SortKey::Status => out.sort_by_key(|t| t.status.rank()),
    }
    out
}

/// Computes the derived statistics in a single pass.
///
/// `average_response_time` is the mean, over tickets with at least one
/// trainer response, of the gap between creation and the *first* trainer
/// response, in whole hours rounded to nearest. Tickets without a trainer
/// response count toward neither numerator nor denominator; with no
/// qualifying ticket at all the average is zero.
pub fn compute_stats(tickets: &[SupportTicket], now: DateTime<Utc>) -> TicketStats {
    let today = now.with_timezone(&Local).date_naive();
    let mut stats = TicketStats {
        total_tickets: tickets.len(),
        open_tickets: 0,
        in_progress_tickets: 0,
        resolved_tickets: 0,
        closed_tickets: 0,
        today_tickets: 0,
        average_response_time: 0,
    };

    let mut response_hours = 0.0f64;
    let mut responded = 0u32;
    for ticket in tickets {
        match ticket.status {
            TicketStatus::Open => stats.open_tickets += 1,
            TicketStatus::InProgress => stats.in_progress_tickets += 1,
            TicketStatus::Resolved => stats.resolved_tickets += 1,
            TicketStatus::Closed => stats.closed_tickets += 1,
        }
        if ticket.created_at.with_timezone(&Local).date_naive() == today {
            stats.today_tickets += 1;
        }
        if let Some(first) = ticket
            .responses
            .iter()
            .find(|r| r.author_type == AuthorRole::Trainer)
        {
            let millis = (first.timestamp - ticket.created_at).num_milliseconds();
            response_hours += millis as f64 / 3_600_000.0;
            responded += 1;
        }
    }
    if responded > 0 {
        stats.average_response_time = (response_hours / responded as f64).round() as i64;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TicketCategory, TicketPriority, TicketResponse};
    use chrono::Duration;
    use uuid::Uuid;

    fn ticket(number: &str, student_id: &str, subject: &str) -> SupportTicket {
        let now = Utc::now();
        SupportTicket {
            id: Uuid::new_v4(),
            ticket_number: number.to_string(),
            student_id: student_id.to_string(),
            subject: subject.to_string(),
            description: String::new(),
            category: TicketCategory::Exercise,
            priority: TicketPriority::Medium,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
            responses: Vec::new(),
            attachments: Vec::new(),
        }
    }

    fn trainer_response(ticket: &SupportTicket, offset: Duration) -> TicketResponse {
        TicketResponse {
            id: Uuid::new_v4(),
            ticket_id: ticket.id,
            author_type: AuthorRole::Trainer,
            author_name: "Coach".to_string(),
            message: "On it".to_string(),
            timestamp: ticket.created_at + offset,
            is_internal: false,
        }
    }

    #[test]
    fn empty_query_and_all_filter_return_everything_newest_first() {
        let mut older = ticket("TK-1001", "stu-1", "first");
        older.created_at = Utc::now() - Duration::hours(2);
        let newer = ticket("TK-1002", "stu-2", "second");

        let out = filter_and_sort(
            &[older.clone(), newer.clone()],
            StatusFilter::All,
            SortKey::Newest,
            "",
            |_| None,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].ticket_number, "TK-1002");
        assert_eq!(out[1].ticket_number, "TK-1001");
    }

    #[test]
    fn status_filter_keeps_only_matching_tickets() {
        let mut resolved = ticket("TK-1001", "stu-1", "a");
        resolved.status = TicketStatus::Resolved;
        let open = ticket("TK-1002", "stu-1", "b");

        let out = filter_and_sort(
            &[resolved, open],
            StatusFilter::Only(TicketStatus::Resolved),
            SortKey::Newest,
            "",
            |_| None,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticket_number, "TK-1001");
    }

    #[test]
    fn search_matches_name_subject_description_and_number() {
        let mut a = ticket("TK-1001", "stu-1", "Protein plan question");
        a.description = "about creatine dosing".to_string();
        let b = ticket("TK-2002", "stu-2", "Payment issue");

        let tickets = [a, b];
        let lookup = |id: &str| match id {
            "stu-1" => Some("Sara Ahmadi".to_string()),
            "stu-2" => Some("Reza Karimi".to_string()),
            _ => None,
        };

        let by_name = filter_and_sort(&tickets, StatusFilter::All, SortKey::Newest, "sara", lookup);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].ticket_number, "TK-1001");

        let by_subject =
            filter_and_sort(&tickets, StatusFilter::All, SortKey::Newest, "PAYMENT", lookup);
        assert_eq!(by_subject.len(), 1);
        assert_eq!(by_subject[0].ticket_number, "TK-2002");

        let by_description =
            filter_and_sort(&tickets, StatusFilter::All, SortKey::Newest, "creatine", lookup);
        assert_eq!(by_description.len(), 1);

        let by_number =
            filter_and_sort(&tickets, StatusFilter::All, SortKey::Newest, "tk-2002", lookup);
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].ticket_number, "TK-2002");
    }

    #[test]
    fn priority_sort_puts_urgent_first() {
        let mut low = ticket("TK-1", "s", "a");
        low.priority = TicketPriority::Low;
        let mut urgent = ticket("TK-2", "s", "b");
        urgent.priority = TicketPriority::Urgent;
        let mut high = ticket("TK-3", "s", "c");
        high.priority = TicketPriority::High;

        let out = filter_and_sort(
            &[low, urgent, high],
            StatusFilter::All,
            SortKey::Priority,
            "",
            |_| None,
        );
        assert_eq!(out[0].ticket_number, "TK-2");
        assert_eq!(out[1].ticket_number, "TK-3");
        assert_eq!(out[2].ticket_number, "TK-1");
    }

    #[test]
    fn status_sort_puts_open_first_and_closed_last() {
        let mut closed = ticket("TK-1", "s", "a");
        closed.status = TicketStatus::Closed;
        let open = ticket("TK-2", "s", "b");
        let mut in_progress = ticket("TK-3", "s", "c");
        in_progress.status = TicketStatus::InProgress;

        let out = filter_and_sort(
            &[closed, open, in_progress],
            StatusFilter::All,
            SortKey::Status,
            "",
            |_| None,
        );
        assert_eq!(out[0].ticket_number, "TK-2");
        assert_eq!(out[1].ticket_number, "TK-3");
        assert_eq!(out[2].ticket_number, "TK-1");
    }

    #[test]
    fn average_response_time_uses_first_trainer_response_only() {
        let now = Utc::now();
        let without_response = ticket("TK-1", "s", "a");
        let mut with_response = ticket("TK-2", "s", "b");
        with_response.responses = vec![
            trainer_response(&with_response, Duration::milliseconds(3_600_000)),
            trainer_response(&with_response, Duration::hours(10)),
        ];

        let stats = compute_stats(&[without_response, with_response], now);
        assert_eq!(stats.total_tickets, 2);
        assert_eq!(stats.average_response_time, 1);
    }

    #[test]
    fn average_response_time_is_zero_when_no_ticket_qualifies() {
        let mut t = ticket("TK-1", "s", "a");
        t.responses = vec![TicketResponse {
            author_type: AuthorRole::Student,
            ..trainer_response(&t, Duration::hours(1))
        }];
        let stats = compute_stats(&[t], Utc::now());
        assert_eq!(stats.average_response_time, 0);
    }

    #[test]
    fn today_bucket_counts_only_the_current_calendar_day() {
        let now = Utc::now();
        let today = ticket("TK-1", "s", "a");
        let mut last_week = ticket("TK-2", "s", "b");
        last_week.created_at = now - Duration::days(7);

        let stats = compute_stats(&[today, last_week], now);
        assert_eq!(stats.today_tickets, 1);
    }

    #[test]
    fn status_counts_cover_every_state() {
        let open = ticket("TK-1", "s", "a");
        let mut in_progress = ticket("TK-2", "s", "b");
        in_progress.status = TicketStatus::InProgress;
        let mut resolved = ticket("TK-3", "s", "c");
        resolved.status = TicketStatus::Resolved;
        let mut closed = ticket("TK-4", "s", "d");
        closed.status = TicketStatus::Closed;

        let stats = compute_stats(&[open, in_progress, resolved, closed], Utc::now());
        assert_eq!(stats.open_tickets, 1);
        assert_eq!(stats.in_progress_tickets, 1);
        assert_eq!(stats.resolved_tickets, 1);
        assert_eq!(stats.closed_tickets, 1);
    }
}

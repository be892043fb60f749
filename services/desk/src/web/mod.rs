pub mod routes;
pub mod state;

// Re-export the handlers so the binary that builds the web server router
// can reach them easily.
pub use routes::{
    add_response_handler, create_ticket_handler, list_messages_handler,
    list_notifications_handler, list_tickets_handler, mark_all_read_handler,
    mark_message_read_handler, mark_read_handler, refresh_handler, send_message_handler,
    ticket_stats_handler, unread_count_handler, update_status_handler,
};
pub use state::AppState;

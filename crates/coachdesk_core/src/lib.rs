pub mod domain;
pub mod ports;
pub mod query;
pub mod store;

pub use domain::{
    AuthorRole, MessageKind, Notification, NotificationKind, StatusEvent, StudentInfo,
    StudentMessage, SupportTicket, TicketAttachment, TicketCategory, TicketPriority,
    TicketResponse, TicketStats, TicketStatus,
};
pub use ports::{
    ChangeBus, ChangeEvent, ChangeStream, KeyValueStore, PortError, PortResult, StoreKey,
    StudentDirectory,
};
pub use query::{SortKey, StatusFilter};
pub use store::PersistedStore;

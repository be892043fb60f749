pub mod messages;
pub mod notifications;
pub mod session;
pub mod sync;
pub mod tickets;

pub use messages::{MessageDraft, MessageFeed};
pub use notifications::{NotificationDraft, NotificationRegistry};
pub use session::DeskSession;
pub use sync::CrossSessionSync;
pub use tickets::{NewTicket, ResponseDraft, TicketRepository};

//! crates/coachdesk_core/src/ports.rs
//!
//! Defines the service contracts (traits) at the boundary of the engine.
//! These traits keep the core independent of the concrete store backend,
//! change-notification transport, and student-directory source.

use async_trait::async_trait;
use futures::Stream;
use std::fmt;
use std::pin::Pin;

use crate::domain::StudentInfo;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external backends.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Keys
//=========================================================================================

/// The keys of the shared persisted key-value space. Each key holds one
/// independent JSON collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    SupportTickets,
    ManagementNotifications,
    StudentSupportMessages,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::SupportTickets => "supportTickets",
            StoreKey::ManagementNotifications => "managementNotifications",
            StoreKey::StudentSupportMessages => "studentSupportMessages",
        }
    }

    pub fn all() -> [StoreKey; 3] {
        [
            StoreKey::SupportTickets,
            StoreKey::ManagementNotifications,
            StoreKey::StudentSupportMessages,
        ]
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Raw access to the durable key-value space shared by all sessions.
///
/// Implementations must make `write_raw` atomic with respect to a single
/// key: a concurrent reader sees either the old or the new collection,
/// never a partial write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value under `key`; `None` when the key is absent.
    async fn read_raw(&self, key: StoreKey) -> PortResult<Option<serde_json::Value>>;

    /// Replaces the whole value under `key`.
    async fn write_raw(&self, key: StoreKey, value: serde_json::Value) -> PortResult<()>;
}

/// A change event raised whenever any session writes one of the shared
/// store keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: StoreKey,
}

/// A stream of change events observed by one subscriber.
pub type ChangeStream = Pin<Box<dyn Stream<Item = ChangeEvent> + Send>>;

/// The change-notification channel connecting live sessions.
///
/// Delivery is best-effort and asynchronous: an event may arrive late or,
/// in degraded conditions, not at all. Subscribers recover from a missed
/// event via a manual refresh.
pub trait ChangeBus: Send + Sync {
    /// Announces that `key` was written. Never blocks; publishing with no
    /// live subscribers is not an error.
    fn publish(&self, key: StoreKey);

    /// Opens a fresh event stream. Events published before the call are
    /// not replayed.
    fn subscribe(&self) -> ChangeStream;
}

/// Read-only lookup into the externally-owned student directory. The
/// engine never mutates student records.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn student_info(&self, student_id: &str) -> PortResult<Option<StudentInfo>>;
}

//! services/desk/src/error.rs
//!
//! Defines the primary error type for the entire desk service.

use crate::config::ConfigError;
use coachdesk_core::ports::PortError;

/// The primary error type for the `desk` service.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a
    /// network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

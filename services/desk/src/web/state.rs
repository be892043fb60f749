//! services/desk/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::engine::session::DeskSession;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to
/// all handlers. The web layer is one desk session; other sessions may
/// be attached to the same store file from other processes or from the
/// test harness.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<DeskSession>,
    pub config: Arc<Config>,
}

use std::sync::Arc;

use crate::config::Config;
use crate::generation::cover::CoverRenderer;
use crate::jobs::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Per-session form buffers and uploads. In memory only.
    pub sessions: SessionStore,
    /// Compiled cover template, loaded once at startup.
    pub renderer: Arc<CoverRenderer>,
}

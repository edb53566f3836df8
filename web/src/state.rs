//! Shared application state for handlers.

use std::sync::Arc;
use summit_core::ConferenceService;

/// State shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The conference service, wired over the configured ports
    pub service: Arc<ConferenceService>,
}

impl AppState {
    /// Wraps a service into shareable state.
    #[must_use]
    pub fn new(service: Arc<ConferenceService>) -> Self {
        Self { service }
    }
}

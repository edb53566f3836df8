//! Derived view read endpoints.
//!
//! Both endpoints read only the cache and always succeed; an empty message
//! means nothing to report.

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Body carrying a derived announcement message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// The cached message, empty when none is set
    pub message: String,
}

/// `GET /announcement`
pub async fn announcement(State(state): State<AppState>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: state.service.announcement().await,
    })
}

/// `GET /featured-speaker`
pub async fn featured_speaker(State(state): State<AppState>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: state.service.featured_speaker().await,
    })
}

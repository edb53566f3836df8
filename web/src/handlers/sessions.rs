//! Session creation, lookup, and speaker assignment handlers.

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use summit_core::service::NewSession;
use summit_core::{ConferenceId, Session, SessionId};
use uuid::Uuid;

/// Body for `PUT /sessions/:id/speaker`.
#[derive(Debug, Deserialize)]
pub struct SpeakerAssignment {
    /// Speaker to assign
    pub speaker: String,
}

/// `POST /conferences/:id/sessions`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(conference): Path<Uuid>,
    Json(form): Json<NewSession>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .service
        .create_session(&user.user_id, ConferenceId::from_uuid(conference), form)
        .await?;
    Ok(Json(session))
}

/// `GET /conferences/:id/sessions`
pub async fn for_conference(
    State(state): State<AppState>,
    Path(conference): Path<Uuid>,
) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state
        .service
        .sessions_for_conference(ConferenceId::from_uuid(conference))
        .await?;
    Ok(Json(sessions))
}

/// `GET /conferences/:id/sessions/type/:session_type`
pub async fn by_type(
    State(state): State<AppState>,
    Path((conference, session_type)): Path<(Uuid, String)>,
) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state
        .service
        .sessions_by_type(ConferenceId::from_uuid(conference), &session_type)
        .await?;
    Ok(Json(sessions))
}

/// `GET /sessions`
pub async fn all(State(state): State<AppState>) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state.service.all_sessions().await?;
    Ok(Json(sessions))
}

/// `GET /sessions/speaker/:speaker`
pub async fn by_speaker(
    State(state): State<AppState>,
    Path(speaker): Path<String>,
) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state.service.sessions_by_speaker(&speaker).await?;
    Ok(Json(sessions))
}

/// `GET /sessions/max-size/:limit`
pub async fn by_max_size(
    State(state): State<AppState>,
    Path(limit): Path<u32>,
) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state.service.sessions_by_max_size(limit).await?;
    Ok(Json(sessions))
}

/// `PUT /sessions/:id/speaker`
pub async fn assign_speaker(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SpeakerAssignment>,
) -> Result<Json<Session>, AppError> {
    let session = state
        .service
        .set_session_speaker(SessionId::from_uuid(id), &body.speaker)
        .await?;
    Ok(Json(session))
}

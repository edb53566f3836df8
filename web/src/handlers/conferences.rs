//! Conference CRUD, queries, and registration handlers.

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::handlers::Outcome;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use summit_core::query::FilterCriterion;
use summit_core::service::{ConferencePatch, ConferenceView, NewConference};
use summit_core::{Conference, ConferenceId};
use uuid::Uuid;

/// Body for `POST /conferences/query`.
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    /// Filter criteria; empty or absent means "all conferences"
    #[serde(default)]
    pub filters: Vec<FilterCriterion>,
}

/// `POST /conferences`
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<NewConference>,
) -> Result<Json<Conference>, AppError> {
    let conference = state
        .service
        .create_conference(&user.user_id, &user.email, form)
        .await?;
    Ok(Json(conference))
}

/// `GET /conferences/:id`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConferenceView>, AppError> {
    let view = state
        .service
        .get_conference(ConferenceId::from_uuid(id))
        .await?;
    Ok(Json(view))
}

/// `PUT /conferences/:id`
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ConferencePatch>,
) -> Result<Json<Conference>, AppError> {
    let conference = state
        .service
        .update_conference(&user.user_id, ConferenceId::from_uuid(id), patch)
        .await?;
    Ok(Json(conference))
}

/// `GET /conferences/created`
pub async fn created(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Conference>>, AppError> {
    let conferences = state.service.conferences_created(&user.user_id).await?;
    Ok(Json(conferences))
}

/// `GET /conferences/attending`
pub async fn attending(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ConferenceView>>, AppError> {
    let views = state.service.conferences_to_attend(&user.user_id).await?;
    Ok(Json(views))
}

/// `POST /conferences/query`
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<Vec<ConferenceView>>, AppError> {
    let views = state.service.query_conferences(&request.filters).await?;
    Ok(Json(views))
}

/// `POST /conferences/:id/registration`
pub async fn register(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let updated = state
        .service
        .register(&user.user_id, ConferenceId::from_uuid(id))
        .await?;
    Ok(Json(Outcome { updated }))
}

/// `DELETE /conferences/:id/registration`
pub async fn unregister(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let updated = state
        .service
        .unregister(&user.user_id, ConferenceId::from_uuid(id))
        .await?;
    Ok(Json(Outcome { updated }))
}

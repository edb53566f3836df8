//! Session wish-list handlers.

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::handlers::Outcome;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use summit_core::{Session, SessionId};
use uuid::Uuid;

/// `GET /wishlist`
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Session>>, AppError> {
    let sessions = state.service.wishlist_sessions(&user.user_id).await?;
    Ok(Json(sessions))
}

/// `POST /sessions/:id/wishlist`
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let updated = state
        .service
        .add_to_wishlist(&user.user_id, SessionId::from_uuid(id))
        .await?;
    Ok(Json(Outcome { updated }))
}

/// `DELETE /sessions/:id/wishlist`
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Outcome>, AppError> {
    let updated = state
        .service
        .remove_from_wishlist(&user.user_id, SessionId::from_uuid(id))
        .await?;
    Ok(Json(Outcome { updated }))
}

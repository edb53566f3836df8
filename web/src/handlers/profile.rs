//! Attendee profile handlers.

use crate::error::AppError;
use crate::extract::CurrentUser;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use summit_core::service::ProfileUpdate;
use summit_core::Profile;

/// `GET /profile`
pub async fn get(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Profile>, AppError> {
    let profile = state
        .service
        .get_profile(&user.user_id, &user.email)
        .await?;
    Ok(Json(profile))
}

/// `PUT /profile`
pub async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let profile = state.service.save_profile(&user.user_id, update).await?;
    Ok(Json(profile))
}

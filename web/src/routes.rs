//! Route table for the Summit HTTP surface.

use crate::handlers::{conferences, derived, health, profile, sessions, wishlist};
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Builds the application router over the given state.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        // Conferences
        .route("/conferences", post(conferences::create))
        .route("/conferences/created", get(conferences::created))
        .route("/conferences/attending", get(conferences::attending))
        .route("/conferences/query", post(conferences::query))
        .route(
            "/conferences/:id",
            get(conferences::get).put(conferences::update),
        )
        .route(
            "/conferences/:id/registration",
            post(conferences::register).delete(conferences::unregister),
        )
        // Sessions
        .route(
            "/conferences/:id/sessions",
            post(sessions::create).get(sessions::for_conference),
        )
        .route(
            "/conferences/:id/sessions/type/:session_type",
            get(sessions::by_type),
        )
        .route("/sessions", get(sessions::all))
        .route("/sessions/speaker/:speaker", get(sessions::by_speaker))
        .route("/sessions/max-size/:limit", get(sessions::by_max_size))
        .route("/sessions/:id/speaker", put(sessions::assign_speaker))
        .route(
            "/sessions/:id/wishlist",
            post(wishlist::add).delete(wishlist::remove),
        )
        .route("/wishlist", get(wishlist::list))
        // Profile
        .route("/profile", get(profile::get).put(profile::save))
        // Derived views
        .route("/announcement", get(derived::announcement))
        .route("/featured-speaker", get(derived::featured_speaker))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Custom Axum extractors.
//!
//! Identity resolution is external: a gateway authenticates the caller and
//! forwards the identity in headers. [`CurrentUser`] rejects requests that
//! arrive without one.

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use summit_core::UserId;

/// Authenticated caller identity, taken from the `x-user-id` header, with
/// the contact email from `x-user-email` when present.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Caller identity
    pub user_id: UserId,
    /// Caller contact email, empty when the gateway sent none
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::unauthorized("authorization required"))?;

        let email = parts
            .headers
            .get("x-user-email")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();

        Ok(Self {
            user_id: UserId::new(user_id),
            email,
        })
    }
}

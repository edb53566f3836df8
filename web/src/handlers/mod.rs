//! HTTP request handlers, grouped by resource.

pub mod conferences;
pub mod derived;
pub mod health;
pub mod profile;
pub mod sessions;
pub mod wishlist;

use serde::Serialize;

/// Body for endpoints that report whether a state transition happened.
#[derive(Debug, Serialize)]
pub struct Outcome {
    /// `true` when the transition was applied, `false` when it was a no-op
    pub updated: bool,
}

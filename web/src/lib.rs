//! # Summit Web
//!
//! Axum HTTP surface for the Summit conference service.
//!
//! This crate provides:
//! - App state wiring the conference service over the in-memory ports
//! - A router exposing conference, session, profile, and wish-list routes
//! - Error mapping from domain errors to HTTP responses
//! - Identity extraction from request headers (authentication is external)
//! - Background jobs: the task worker and the periodic announcement refresh

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod jobs;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;

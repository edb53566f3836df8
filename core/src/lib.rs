//! Summit core: conference registration domain.
//!
//! The crate is organized around three capability ports — an entity store
//! with versioned reads and multi-key conditional commits, an advisory
//! cache, and a fire-and-forget task dispatcher — and the components that
//! consume them:
//!
//! - [`reservation::SeatReservationManager`] moves seats and membership
//!   lists together under optimistic concurrency with bounded retry.
//! - [`query::compile`] turns user filter criteria into a store-executable
//!   [`query::QueryPlan`], enforcing the single-inequality-field rule.
//! - [`projections`] maintain the cached featured-speaker and
//!   near-sold-out announcement views.
//! - [`service::ConferenceService`] composes the above with conference,
//!   session, and profile CRUD.
//!
//! [`memory`] provides in-process implementations of all three ports for
//! tests and the single-process server.

pub mod cache;
pub mod error;
pub mod memory;
pub mod projections;
pub mod query;
pub mod reservation;
pub mod service;
pub mod store;
pub mod tasks;
pub mod types;

pub use error::Error;
pub use service::ConferenceService;
pub use types::{Conference, ConferenceId, Profile, Session, SessionId, UserId};

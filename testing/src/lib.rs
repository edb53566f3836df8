//! # Summit Testing
//!
//! Test fixtures and port mocks for the Summit conference service.
//!
//! This crate provides:
//! - Builders for conferences, sessions, and profiles
//! - A recording task dispatcher that captures submissions
//! - A contention-injecting entity store wrapper for exercising the
//!   bounded-retry reservation path
//!
//! ## Example
//!
//! ```
//! use summit_testing::fixtures::ConferenceBuilder;
//!
//! let conference = ConferenceBuilder::new("RustConf")
//!     .city("Berlin")
//!     .seats(25)
//!     .build();
//! assert_eq!(conference.seats_available, 25);
//! ```

pub mod fixtures;
pub mod mocks;

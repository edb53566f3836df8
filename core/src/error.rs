//! Error taxonomy for conference operations.
//!
//! Every fallible operation in this crate surfaces one of these variants
//! directly; none are masked or downgraded locally. Background derivations
//! log and drop their errors at the call site instead.

use crate::cache::CacheError;
use crate::store::StoreError;
use crate::tasks::DispatchError;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the conference service and its core components.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced key does not resolve in the entity store
    #[error("{entity} with key {key} not found")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
        /// The key that failed to resolve
        key: String,
    },

    /// Business-rule violation under concurrent use (double registration,
    /// no seats left)
    #[error("{0}")]
    Conflict(String),

    /// The acting user is not the owning organizer of the target entity
    #[error("{0}")]
    Forbidden(String),

    /// Malformed or rule-violating input
    #[error("{0}")]
    BadRequest(String),

    /// The transaction retry budget was exhausted; the caller may retry
    /// the whole operation
    #[error("operation contended too many times; please retry")]
    Transient,

    /// The entity store failed outside the contention path
    #[error("entity store error: {0}")]
    Store(#[from] StoreError),

    /// The cache store failed during a derivation write
    #[error("cache store error: {0}")]
    Cache(#[from] CacheError),

    /// A background task could not be submitted
    #[error("task dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl Error {
    /// Create a `NotFound` error for the given entity kind and key
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Create a `Conflict` error
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a `Forbidden` error
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Create a `BadRequest` error
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

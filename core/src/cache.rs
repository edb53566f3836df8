//! Cache store port: advisory key/value storage for derived views.
//!
//! No ordering or transactional guarantees; entries may be evicted at any
//! time. Absence of a well-known key is a valid state meaning "nothing to
//! report", never an error.

use async_trait::async_trait;
use thiserror::Error;

/// Cache key holding the near-sold-out announcement string.
pub const ANNOUNCEMENTS_CACHE_KEY: &str = "announcements:recent";

/// Cache key holding the featured-speaker summary string.
pub const FEATURED_SPEAKER_CACHE_KEY: &str = "featured_speaker";

/// Errors surfaced by cache store implementations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache backend failed
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Capability contract for the external cache store.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a cached value, `None` on miss or eviction.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove a key; removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend fails.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

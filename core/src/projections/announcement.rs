//! Near-sold-out announcement view: a sweep over all conferences that
//! publishes a "last chance" message naming every conference with only a
//! handful of seats left.

use crate::cache::{CacheStore, ANNOUNCEMENTS_CACHE_KEY};
use crate::error::Error;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::warn;

/// A conference with this many seats or fewer (but more than zero) counts
/// as nearly sold out.
pub const NEARLY_SOLD_OUT_SEATS: u32 = 5;

/// Maintains the near-sold-out announcement cache entry.
pub struct AnnouncementProjection {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn CacheStore>,
}

impl AnnouncementProjection {
    /// Creates the projection over the given store and cache.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    /// Recomputes the announcement from current seat counts.
    ///
    /// When at least one conference is nearly sold out the cache entry is
    /// set to a message naming them all; otherwise the entry is deleted.
    /// Returns the message that was published (empty when the entry was
    /// cleared).
    ///
    /// # Errors
    ///
    /// A store or cache failure.
    pub async fn derive(&self) -> Result<String, Error> {
        let names: Vec<String> = self
            .store
            .all_conferences()
            .await?
            .into_iter()
            .filter(|c| c.seats_available > 0 && c.seats_available <= NEARLY_SOLD_OUT_SEATS)
            .map(|c| c.name)
            .collect();

        if names.is_empty() {
            self.cache.delete(ANNOUNCEMENTS_CACHE_KEY).await?;
            return Ok(String::new());
        }

        let message = format!(
            "Last chance to attend! The following conferences are nearly sold out: {}",
            names.join(", ")
        );
        self.cache.set(ANNOUNCEMENTS_CACHE_KEY, &message).await?;
        Ok(message)
    }

    /// Returns the current announcement, or the empty string when none is
    /// set or the cache is unreachable.
    pub async fn current(&self) -> String {
        match self.cache.get(ANNOUNCEMENTS_CACHE_KEY).await {
            Ok(Some(message)) => message,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "announcement cache read failed");
                String::new()
            }
        }
    }
}

//! Featured speaker view: when a speaker reaches the session threshold
//! within a single conference, an announcement naming all their sessions
//! there is published to the cache.

use crate::cache::{CacheStore, FEATURED_SPEAKER_CACHE_KEY};
use crate::error::Error;
use crate::store::EntityStore;
use crate::types::ConferenceId;
use std::sync::Arc;
use tracing::warn;

/// Number of sessions by one speaker at one conference that makes them
/// featured.
pub const FEATURED_SPEAKER_MIN_SESSIONS: usize = 2;

/// Maintains the featured speaker cache entry.
pub struct FeaturedSpeakerProjection {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn CacheStore>,
}

impl FeaturedSpeakerProjection {
    /// Creates the projection over the given store and cache.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    /// Recomputes the featured speaker entry for one speaker at one
    /// conference.
    ///
    /// Counts the speaker's sessions at the conference; at or above the
    /// threshold the cache entry is overwritten with a message listing the
    /// session names. Below the threshold the entry is left untouched, so
    /// the most recent featured speaker stays visible.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the conference does not exist, or a store
    /// or cache failure.
    pub async fn derive(&self, speaker: &str, conference: ConferenceId) -> Result<(), Error> {
        if self.store.get_conference(&conference).await?.is_none() {
            return Err(Error::not_found("Conference", conference));
        }

        let sessions = self.store.sessions_for_conference(&conference).await?;
        let names: Vec<String> = sessions
            .into_iter()
            .filter(|s| s.speaker.as_deref() == Some(speaker))
            .map(|s| s.name)
            .collect();

        if names.len() >= FEATURED_SPEAKER_MIN_SESSIONS {
            let message = format!(
                "Come see featured speaker {speaker} in: {}",
                names.join(", ")
            );
            self.cache
                .set(FEATURED_SPEAKER_CACHE_KEY, &message)
                .await?;
        }
        Ok(())
    }

    /// Returns the current featured speaker announcement, or the empty
    /// string when none is set or the cache is unreachable.
    pub async fn current(&self) -> String {
        match self.cache.get(FEATURED_SPEAKER_CACHE_KEY).await {
            Ok(Some(message)) => message,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "featured speaker cache read failed");
                String::new()
            }
        }
    }
}

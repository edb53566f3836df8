//! Derived views recomputed from entity state and published to the cache.
//!
//! Each projection has a derive side, triggered by writes or a periodic
//! sweep, and a read side that only ever consults the cache. Read sides
//! never fail: a cache miss or backend error reads as the empty string.

mod announcement;
mod featured_speaker;

pub use announcement::{AnnouncementProjection, NEARLY_SOLD_OUT_SEATS};
pub use featured_speaker::{FeaturedSpeakerProjection, FEATURED_SPEAKER_MIN_SESSIONS};

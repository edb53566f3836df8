//! Seat reservation manager: register/unregister transitions for
//! conference attendance and session wish-listing.
//!
//! The seat counter and the profile's membership list are the only shared
//! mutable state requiring coordinated writes, and they must move together.
//! Each transition re-reads both records, applies the business checks, and
//! commits both in one version-checked group write; a lost race re-runs the
//! whole read-check-write cycle up to a fixed bound before surfacing
//! [`Error::Transient`]. Two concurrent grabs of the last seat therefore
//! resolve to exactly one winner.

use crate::error::Error;
use crate::store::{ConditionalWrite, Entity, EntityStore, StoreError, Versioned};
use crate::types::{ConferenceId, Profile, SessionId, UserId};
use std::sync::Arc;
use tracing::debug;

/// Retry bound for contended reservation commits.
pub const MAX_TRANSACTION_ATTEMPTS: u32 = 3;

/// Performs seat reservation transitions against the entity store.
pub struct SeatReservationManager {
    store: Arc<dyn EntityStore>,
    max_attempts: u32,
}

impl SeatReservationManager {
    /// Creates a manager with the default retry bound
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self::with_attempts(store, MAX_TRANSACTION_ATTEMPTS)
    }

    /// Creates a manager with an explicit retry bound
    #[must_use]
    pub fn with_attempts(store: Arc<dyn EntityStore>, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Registers the user for a conference, taking one seat.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the conference key does not resolve,
    /// [`Error::Conflict`] on double registration or when no seats remain,
    /// [`Error::Transient`] when the retry budget is exhausted.
    pub async fn register(
        &self,
        user: &UserId,
        conference: ConferenceId,
    ) -> Result<bool, Error> {
        for attempt in 1..=self.max_attempts {
            let (profile, profile_version) = self.load_profile(user).await?;
            let Some(conf) = self.store.get_conference(&conference).await? else {
                return Err(Error::not_found("Conference", conference));
            };

            if profile.attends(&conference) {
                return Err(Error::conflict(
                    "you have already registered for this conference",
                ));
            }
            if conf.value.seats_available == 0 {
                return Err(Error::conflict("there are no seats available"));
            }

            let mut profile = profile;
            profile.conferences_to_attend.push(conference);
            let mut updated = conf.value;
            updated.seats_available -= 1;

            let writes = vec![
                profile_write(profile, profile_version),
                ConditionalWrite::update(Entity::Conference(updated), conf.version),
            ];
            match self.store.commit(writes).await {
                Ok(()) => return Ok(true),
                Err(StoreError::Contention) => {
                    debug!(attempt, %conference, "registration commit contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Unregisters the user from a conference, returning one seat.
    ///
    /// Returns `Ok(false)` without touching anything when the user was
    /// never registered: unregistering nothing is idempotent, not a fault.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the conference key does not resolve,
    /// [`Error::Transient`] when the retry budget is exhausted.
    pub async fn unregister(
        &self,
        user: &UserId,
        conference: ConferenceId,
    ) -> Result<bool, Error> {
        for attempt in 1..=self.max_attempts {
            let (profile, profile_version) = self.load_profile(user).await?;
            let Some(conf) = self.store.get_conference(&conference).await? else {
                return Err(Error::not_found("Conference", conference));
            };

            if !profile.attends(&conference) {
                return Ok(false);
            }

            let mut profile = profile;
            profile.conferences_to_attend.retain(|c| *c != conference);
            let mut updated = conf.value;
            // Capacity may have shrunk since the seat was taken.
            updated.seats_available = (updated.seats_available + 1).min(updated.max_attendees);

            let writes = vec![
                profile_write(profile, profile_version),
                ConditionalWrite::update(Entity::Conference(updated), conf.version),
            ];
            match self.store.commit(writes).await {
                Ok(()) => return Ok(true),
                Err(StoreError::Contention) => {
                    debug!(attempt, %conference, "unregistration commit contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Adds a session to the user's wish list, taking one session seat.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the session key does not resolve,
    /// [`Error::Conflict`] when already wish-listed or no seats remain,
    /// [`Error::Transient`] when the retry budget is exhausted.
    pub async fn add_to_wishlist(
        &self,
        user: &UserId,
        session: SessionId,
    ) -> Result<bool, Error> {
        for attempt in 1..=self.max_attempts {
            let (profile, profile_version) = self.load_profile(user).await?;
            let Some(sess) = self.store.get_session(&session).await? else {
                return Err(Error::not_found("Session", session));
            };

            if profile.wishes(&session) {
                return Err(Error::conflict(
                    "you have already added this session to your list",
                ));
            }
            if sess.value.seats_available == 0 {
                return Err(Error::conflict("there are no seats available"));
            }

            let mut profile = profile;
            profile.wish_list.push(session);
            let mut updated = sess.value;
            updated.seats_available -= 1;

            let writes = vec![
                profile_write(profile, profile_version),
                ConditionalWrite::update(Entity::Session(updated), sess.version),
            ];
            match self.store.commit(writes).await {
                Ok(()) => return Ok(true),
                Err(StoreError::Contention) => {
                    debug!(attempt, %session, "wish-list commit contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Removes a session from the user's wish list, returning one seat.
    ///
    /// Returns `Ok(false)` when the session was never wish-listed.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the session key does not resolve,
    /// [`Error::Transient`] when the retry budget is exhausted.
    pub async fn remove_from_wishlist(
        &self,
        user: &UserId,
        session: SessionId,
    ) -> Result<bool, Error> {
        for attempt in 1..=self.max_attempts {
            let (profile, profile_version) = self.load_profile(user).await?;
            let Some(sess) = self.store.get_session(&session).await? else {
                return Err(Error::not_found("Session", session));
            };

            if !profile.wishes(&session) {
                return Ok(false);
            }

            let mut profile = profile;
            profile.wish_list.retain(|s| *s != session);
            let mut updated = sess.value;
            // Capacity may have shrunk since the seat was taken.
            updated.seats_available = (updated.seats_available + 1).min(updated.max_attendees);

            let writes = vec![
                profile_write(profile, profile_version),
                ConditionalWrite::update(Entity::Session(updated), sess.version),
            ];
            match self.store.commit(writes).await {
                Ok(()) => return Ok(true),
                Err(StoreError::Contention) => {
                    debug!(attempt, %session, "wish-list removal commit contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Loads the user's profile, falling back to a fresh lazy profile that
    /// the commit will create (version `None`) when none exists yet.
    async fn load_profile(&self, user: &UserId) -> Result<(Profile, Option<u64>), Error> {
        Ok(match self.store.get_profile(user).await? {
            Some(Versioned { value, version }) => (value, Some(version)),
            None => (Profile::lazy(user), None),
        })
    }
}

fn profile_write(profile: Profile, version: Option<u64>) -> ConditionalWrite {
    match version {
        Some(v) => ConditionalWrite::update(Entity::Profile(profile), v),
        None => ConditionalWrite::create(Entity::Profile(profile)),
    }
}

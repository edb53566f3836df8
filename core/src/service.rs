//! Conference service: CRUD, queries, profiles, and sessions, composed over
//! the capability ports.
//!
//! Seat-affecting transitions delegate to the reservation manager; derived
//! views delegate to the projections. Every mutation of an existing entity
//! commits against the version it read, retrying on contention, so edits
//! and reservations touching the same record never overwrite each other.

use crate::cache::CacheStore;
use crate::error::Error;
use crate::projections::{AnnouncementProjection, FeaturedSpeakerProjection};
use crate::query::{compile, FilterCriterion};
use crate::reservation::{SeatReservationManager, MAX_TRANSACTION_ATTEMPTS};
use crate::store::{ConditionalWrite, Entity, EntityKey, EntityStore, StoreError, Versioned};
use crate::tasks::{
    TaskDispatcher, TaskRequest, SEND_CONFIRMATION_EMAIL_TASK, SET_FEATURED_SPEAKER_TASK,
};
use crate::types::{
    month_of, Conference, ConferenceId, Profile, Session, SessionId, TeeShirtSize, UserId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Creation defaults carried over from the original service.
const DEFAULT_CITY: &str = "Default City";
const DEFAULT_TOPICS: [&str; 2] = ["Default", "Topic"];

// ============================================================================
// Forms and views
// ============================================================================

/// Form for creating a conference.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewConference {
    /// Conference name, required
    pub name: Option<String>,
    /// Host city, defaults to `"Default City"`
    pub city: Option<String>,
    /// Topics, default to `["Default", "Topic"]`
    pub topics: Option<Vec<String>>,
    /// Seating capacity, defaults to 0 (unlimited bookkeeping disabled)
    pub max_attendees: Option<u32>,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
}

/// Partial update for a conference; absent fields are left unchanged.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ConferencePatch {
    /// New name
    pub name: Option<String>,
    /// New host city
    pub city: Option<String>,
    /// New topic list
    pub topics: Option<Vec<String>>,
    /// New seating capacity
    pub max_attendees: Option<u32>,
    /// New first day
    pub start_date: Option<NaiveDate>,
    /// New last day
    pub end_date: Option<NaiveDate>,
}

/// Form for creating a session under a conference.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct NewSession {
    /// Session name, required
    pub name: Option<String>,
    /// Speaker name
    pub speaker: Option<String>,
    /// Kind of session (lecture, workshop, ...)
    pub session_type: Option<String>,
    /// Free-form highlights
    pub highlights: Option<String>,
    /// Planned length in minutes
    pub duration_minutes: Option<u32>,
    /// Seating capacity
    pub max_attendees: Option<u32>,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
}

/// Partial profile update; only the mutable fields are accepted.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
    /// New display name
    pub display_name: Option<String>,
    /// New tee-shirt size
    pub tee_shirt_size: Option<TeeShirtSize>,
}

/// A conference together with its organizer's display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceView {
    /// The conference record
    #[serde(flatten)]
    pub conference: Conference,
    /// Display name resolved from the organizer's profile, falling back to
    /// the raw user id
    pub organizer_display_name: String,
}

// ============================================================================
// Service
// ============================================================================

/// Application service over the entity store, cache, and dispatcher ports.
pub struct ConferenceService {
    store: Arc<dyn EntityStore>,
    dispatcher: Arc<dyn TaskDispatcher>,
    reservations: SeatReservationManager,
    featured: FeaturedSpeakerProjection,
    announcements: AnnouncementProjection,
}

impl ConferenceService {
    /// Wires the service over the three ports.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn CacheStore>,
        dispatcher: Arc<dyn TaskDispatcher>,
    ) -> Self {
        Self {
            reservations: SeatReservationManager::new(store.clone()),
            featured: FeaturedSpeakerProjection::new(store.clone(), cache.clone()),
            announcements: AnnouncementProjection::new(store.clone(), cache),
            store,
            dispatcher,
        }
    }

    // ------------------------------------------------------------------
    // Conferences
    // ------------------------------------------------------------------

    /// Creates a conference owned by `user` and queues the confirmation
    /// email.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] when the name is missing or the dates are out
    /// of order, or a store failure.
    pub async fn create_conference(
        &self,
        user: &UserId,
        email: &str,
        form: NewConference,
    ) -> Result<Conference, Error> {
        let name = required_name(form.name.as_deref(), "conference")?;
        validate_dates(form.start_date, form.end_date)?;

        let max_attendees = form.max_attendees.unwrap_or(0);
        let conference = Conference {
            id: self.store.allocate_conference_id().await?,
            organizer_user_id: user.clone(),
            name,
            city: form.city.unwrap_or_else(|| DEFAULT_CITY.to_owned()),
            topics: form
                .topics
                .unwrap_or_else(|| DEFAULT_TOPICS.map(str::to_owned).to_vec()),
            month: month_of(form.start_date),
            max_attendees,
            seats_available: max_attendees,
            start_date: form.start_date,
            end_date: form.end_date,
        };
        self.store.put(Entity::Conference(conference.clone())).await?;
        info!(conference_id = %conference.id, name = %conference.name, "conference created");

        let task = TaskRequest::new(SEND_CONFIRMATION_EMAIL_TASK)
            .with_param("email", email)
            .with_param("conference_name", conference.name.clone());
        if let Err(e) = self.dispatcher.submit(task).await {
            warn!(error = %e, "confirmation email dispatch failed");
        }
        Ok(conference)
    }

    /// Applies a partial update to a conference the user organizes.
    ///
    /// The write asserts the version read at the start of the attempt, so a
    /// registration landing in between is never overwritten; the patch is
    /// re-applied to the fresh record and retried instead.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`], [`Error::Forbidden`] for non-owners,
    /// [`Error::BadRequest`] for out-of-order dates, [`Error::Transient`]
    /// when contention persists, or a store failure.
    pub async fn update_conference(
        &self,
        user: &UserId,
        id: ConferenceId,
        patch: ConferencePatch,
    ) -> Result<Conference, Error> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let Some(current) = self.store.get_conference(&id).await? else {
                return Err(Error::not_found("Conference", id));
            };
            let mut conference = current.value;
            if conference.organizer_user_id != *user {
                return Err(Error::forbidden("only the organizer can update the conference"));
            }
            apply_conference_patch(&mut conference, patch.clone());
            validate_dates(conference.start_date, conference.end_date)?;

            let write =
                ConditionalWrite::update(Entity::Conference(conference.clone()), current.version);
            match self.store.commit(vec![write]).await {
                Ok(()) => return Ok(conference),
                Err(StoreError::Contention) => {
                    debug!(attempt, conference_id = %id, "conference update contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Fetches one conference with its organizer's display name.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] or a store failure.
    pub async fn get_conference(&self, id: ConferenceId) -> Result<ConferenceView, Error> {
        let Some(conference) = self.store.get_conference(&id).await? else {
            return Err(Error::not_found("Conference", id));
        };
        let mut views = self.with_organizer_names(vec![conference.value]).await?;
        views
            .pop()
            .ok_or_else(|| Error::not_found("Conference", id))
    }

    /// Conferences the user has created, by name.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn conferences_created(&self, user: &UserId) -> Result<Vec<Conference>, Error> {
        Ok(self.store.conferences_by_organizer(user).await?)
    }

    /// Conferences the user is registered to attend, in membership order.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn conferences_to_attend(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConferenceView>, Error> {
        let profile = self.profile_of(user, "").await?;
        let keys: Vec<EntityKey> = profile
            .conferences_to_attend
            .iter()
            .map(|id| EntityKey::Conference(*id))
            .collect();
        let conferences = self
            .store
            .get_many(&keys)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                Some(v) => match v.value {
                    Entity::Conference(c) => Some(c),
                    _ => None,
                },
                None => None,
            })
            .collect();
        self.with_organizer_names(conferences).await
    }

    /// Compiles the criteria and runs the resulting plan.
    ///
    /// # Errors
    ///
    /// [`Error::BadRequest`] from the compiler, or a store failure.
    pub async fn query_conferences(
        &self,
        criteria: &[FilterCriterion],
    ) -> Result<Vec<ConferenceView>, Error> {
        let plan = compile(criteria)?;
        let conferences = self.store.query_conferences(&plan).await?;
        self.with_organizer_names(conferences).await
    }

    /// Registers the user for a conference.
    ///
    /// # Errors
    ///
    /// See [`SeatReservationManager::register`].
    pub async fn register(&self, user: &UserId, id: ConferenceId) -> Result<bool, Error> {
        self.reservations.register(user, id).await
    }

    /// Unregisters the user from a conference.
    ///
    /// # Errors
    ///
    /// See [`SeatReservationManager::unregister`].
    pub async fn unregister(&self, user: &UserId, id: ConferenceId) -> Result<bool, Error> {
        self.reservations.unregister(user, id).await
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Creates a session under a conference the user organizes.
    ///
    /// When the session names a speaker, featured-speaker derivation is
    /// queued for that speaker at this conference.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`], [`Error::Forbidden`] for non-owners,
    /// [`Error::BadRequest`] for a missing name or out-of-order dates, or a
    /// store failure.
    pub async fn create_session(
        &self,
        user: &UserId,
        conference: ConferenceId,
        form: NewSession,
    ) -> Result<Session, Error> {
        let Some(parent) = self.store.get_conference(&conference).await? else {
            return Err(Error::not_found("Conference", conference));
        };
        if parent.value.organizer_user_id != *user {
            return Err(Error::forbidden("only the organizer can add sessions"));
        }
        let name = required_name(form.name.as_deref(), "session")?;
        validate_dates(form.start_date, form.end_date)?;

        let max_attendees = form.max_attendees.unwrap_or(0);
        let session = Session {
            id: self.store.allocate_session_id(&conference).await?,
            conference_id: conference,
            organizer_user_id: user.clone(),
            name,
            speaker: form.speaker,
            session_type: form.session_type,
            highlights: form.highlights,
            duration_minutes: form.duration_minutes,
            month: month_of(form.start_date),
            max_attendees,
            seats_available: max_attendees,
            start_date: form.start_date,
            end_date: form.end_date,
        };
        self.store.put(Entity::Session(session.clone())).await?;
        info!(session_id = %session.id, conference_id = %conference, "session created");

        if let Some(speaker) = &session.speaker {
            self.queue_featured_speaker(speaker, conference).await;
        }
        Ok(session)
    }

    /// Assigns a speaker to an existing session and queues featured-speaker
    /// derivation.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`], [`Error::Transient`] when contention persists,
    /// or a store failure.
    pub async fn set_session_speaker(
        &self,
        id: SessionId,
        speaker: &str,
    ) -> Result<Session, Error> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let Some(current) = self.store.get_session(&id).await? else {
                return Err(Error::not_found("Session", id));
            };
            let mut session = current.value;
            session.speaker = Some(speaker.to_owned());

            let write =
                ConditionalWrite::update(Entity::Session(session.clone()), current.version);
            match self.store.commit(vec![write]).await {
                Ok(()) => {
                    self.queue_featured_speaker(speaker, session.conference_id)
                        .await;
                    return Ok(session);
                }
                Err(StoreError::Contention) => {
                    debug!(attempt, session_id = %id, "speaker assignment contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    /// Sessions hosted by a conference.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the conference is missing, or a store
    /// failure.
    pub async fn sessions_for_conference(
        &self,
        conference: ConferenceId,
    ) -> Result<Vec<Session>, Error> {
        if self.store.get_conference(&conference).await?.is_none() {
            return Err(Error::not_found("Conference", conference));
        }
        Ok(self.store.sessions_for_conference(&conference).await?)
    }

    /// Sessions of one type within a conference.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the conference is missing, or a store
    /// failure.
    pub async fn sessions_by_type(
        &self,
        conference: ConferenceId,
        session_type: &str,
    ) -> Result<Vec<Session>, Error> {
        let mut sessions = self.sessions_for_conference(conference).await?;
        sessions.retain(|s| s.session_type.as_deref() == Some(session_type));
        Ok(sessions)
    }

    /// Sessions by a speaker across all conferences.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn sessions_by_speaker(&self, speaker: &str) -> Result<Vec<Session>, Error> {
        Ok(self.store.sessions_by_speaker(speaker).await?)
    }

    /// Every session, independent of conference.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn all_sessions(&self) -> Result<Vec<Session>, Error> {
        Ok(self.store.all_sessions().await?)
    }

    /// Sessions whose capacity does not exceed `limit`.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn sessions_by_max_size(&self, limit: u32) -> Result<Vec<Session>, Error> {
        let mut sessions = self.store.all_sessions().await?;
        sessions.retain(|s| s.max_attendees <= limit);
        Ok(sessions)
    }

    /// Adds a session to the user's wish list.
    ///
    /// # Errors
    ///
    /// See [`SeatReservationManager::add_to_wishlist`].
    pub async fn add_to_wishlist(&self, user: &UserId, id: SessionId) -> Result<bool, Error> {
        self.reservations.add_to_wishlist(user, id).await
    }

    /// Removes a session from the user's wish list.
    ///
    /// # Errors
    ///
    /// See [`SeatReservationManager::remove_from_wishlist`].
    pub async fn remove_from_wishlist(
        &self,
        user: &UserId,
        id: SessionId,
    ) -> Result<bool, Error> {
        self.reservations.remove_from_wishlist(user, id).await
    }

    /// The sessions currently on the user's wish list.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn wishlist_sessions(&self, user: &UserId) -> Result<Vec<Session>, Error> {
        let profile = self.profile_of(user, "").await?;
        let keys: Vec<EntityKey> = profile
            .wish_list
            .iter()
            .map(|id| EntityKey::Session(*id))
            .collect();
        Ok(self
            .store
            .get_many(&keys)
            .await?
            .into_iter()
            .filter_map(|record| match record {
                Some(v) => match v.value {
                    Entity::Session(s) => Some(s),
                    _ => None,
                },
                None => None,
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    /// Fetches the user's profile, creating it on first access.
    ///
    /// # Errors
    ///
    /// A store failure.
    pub async fn get_profile(&self, user: &UserId, email: &str) -> Result<Profile, Error> {
        self.profile_of(user, email).await
    }

    /// Applies a partial update to the user's profile.
    ///
    /// Only the display name and tee-shirt size are caller-mutable. The
    /// write asserts the version read at the start of the attempt, so a
    /// registration committing in between keeps its membership entry; the
    /// edit is re-applied to the fresh profile and retried.
    ///
    /// # Errors
    ///
    /// [`Error::Transient`] when contention persists, or a store failure.
    pub async fn save_profile(
        &self,
        user: &UserId,
        update: ProfileUpdate,
    ) -> Result<Profile, Error> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let (mut profile, version) = match self.store.get_profile(user).await? {
                Some(Versioned { value, version }) => (value, Some(version)),
                None => (Profile::lazy(user), None),
            };
            if let Some(display_name) = update.display_name.clone() {
                profile.display_name = display_name;
            }
            if let Some(size) = update.tee_shirt_size {
                profile.tee_shirt_size = size;
            }

            let write = match version {
                Some(v) => ConditionalWrite::update(Entity::Profile(profile.clone()), v),
                None => ConditionalWrite::create(Entity::Profile(profile.clone())),
            };
            match self.store.commit(vec![write]).await {
                Ok(()) => return Ok(profile),
                Err(StoreError::Contention) => {
                    debug!(attempt, user = %user, "profile save contended, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    /// The current near-sold-out announcement, empty when none.
    pub async fn announcement(&self) -> String {
        self.announcements.current().await
    }

    /// The current featured-speaker message, empty when none.
    pub async fn featured_speaker(&self) -> String {
        self.featured.current().await
    }

    /// Recomputes and publishes the near-sold-out announcement.
    ///
    /// # Errors
    ///
    /// A store or cache failure.
    pub async fn refresh_announcement(&self) -> Result<String, Error> {
        self.announcements.derive().await
    }

    /// Recomputes the featured-speaker entry, the task worker's entry
    /// point.
    ///
    /// # Errors
    ///
    /// See [`FeaturedSpeakerProjection::derive`].
    pub async fn derive_featured_speaker(
        &self,
        speaker: &str,
        conference: ConferenceId,
    ) -> Result<(), Error> {
        self.featured.derive(speaker, conference).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn profile_of(&self, user: &UserId, email: &str) -> Result<Profile, Error> {
        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            if let Some(existing) = self.store.get_profile(user).await? {
                return Ok(existing.value);
            }
            let mut profile = Profile::lazy(user);
            profile.main_email = email.to_owned();
            let write = ConditionalWrite::create(Entity::Profile(profile.clone()));
            match self.store.commit(vec![write]).await {
                Ok(()) => return Ok(profile),
                Err(StoreError::Contention) => {
                    // Someone created the profile first; the next read wins.
                    debug!(attempt, user = %user, "profile creation lost a race, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Transient)
    }

    async fn with_organizer_names(
        &self,
        conferences: Vec<Conference>,
    ) -> Result<Vec<ConferenceView>, Error> {
        let mut organizers: Vec<UserId> = conferences
            .iter()
            .map(|c| c.organizer_user_id.clone())
            .collect();
        organizers.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        organizers.dedup();

        let keys: Vec<EntityKey> = organizers
            .iter()
            .cloned()
            .map(EntityKey::Profile)
            .collect();
        let mut names: HashMap<UserId, String> = HashMap::new();
        for record in self.store.get_many(&keys).await?.into_iter().flatten() {
            if let Entity::Profile(p) = record.value {
                names.insert(p.user_id.clone(), p.display_name);
            }
        }

        Ok(conferences
            .into_iter()
            .map(|conference| {
                let organizer_display_name = names
                    .get(&conference.organizer_user_id)
                    .cloned()
                    .unwrap_or_else(|| conference.organizer_user_id.to_string());
                ConferenceView {
                    conference,
                    organizer_display_name,
                }
            })
            .collect())
    }

    async fn queue_featured_speaker(&self, speaker: &str, conference: ConferenceId) {
        let task = TaskRequest::new(SET_FEATURED_SPEAKER_TASK)
            .with_param("speaker", speaker)
            .with_param("conference_id", conference.to_string());
        if let Err(e) = self.dispatcher.submit(task).await {
            warn!(error = %e, "featured speaker dispatch failed");
        }
    }
}

fn apply_conference_patch(conference: &mut Conference, patch: ConferencePatch) {
    if let Some(name) = patch.name {
        conference.name = name;
    }
    if let Some(city) = patch.city {
        conference.city = city;
    }
    if let Some(topics) = patch.topics {
        conference.topics = topics;
    }
    if let Some(max_attendees) = patch.max_attendees {
        conference.max_attendees = max_attendees;
        // Keep the seat counter inside the new capacity.
        conference.seats_available = conference.seats_available.min(max_attendees);
    }
    if let Some(start_date) = patch.start_date {
        conference.start_date = Some(start_date);
        conference.month = month_of(conference.start_date);
    }
    if let Some(end_date) = patch.end_date {
        conference.end_date = Some(end_date);
    }
}

fn required_name(name: Option<&str>, entity: &str) -> Result<String, Error> {
    match name {
        Some(n) if !n.trim().is_empty() => Ok(n.to_owned()),
        _ => Err(Error::bad_request(format!("{entity} 'name' field required"))),
    }
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), Error> {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(Error::bad_request("end date must not precede start date"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::{MemoryCacheStore, MemoryEntityStore, MemoryTaskDispatcher};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn service() -> (ConferenceService, UnboundedReceiver<TaskRequest>) {
        let (dispatcher, receiver) = MemoryTaskDispatcher::channel();
        let service = ConferenceService::new(
            Arc::new(MemoryEntityStore::new()),
            Arc::new(MemoryCacheStore::new()),
            Arc::new(dispatcher),
        );
        (service, receiver)
    }

    fn named(name: &str) -> NewConference {
        NewConference {
            name: Some(name.to_owned()),
            ..NewConference::default()
        }
    }

    #[tokio::test]
    async fn test_create_conference_applies_defaults_and_queues_email() {
        let (service, mut tasks) = service();
        let user = UserId::new("alice");

        let conference = service
            .create_conference(&user, "alice@example.com", named("RustConf"))
            .await
            .unwrap();

        assert_eq!(conference.city, "Default City");
        assert_eq!(conference.topics, vec!["Default", "Topic"]);
        assert_eq!(conference.max_attendees, 0);
        assert_eq!(conference.seats_available, 0);
        assert_eq!(conference.month, 0);

        let task = tasks.recv().await.unwrap();
        assert_eq!(task.target, SEND_CONFIRMATION_EMAIL_TASK);
        assert_eq!(task.param("email"), Some("alice@example.com"));
    }

    #[tokio::test]
    async fn test_create_conference_without_name_is_bad_request() {
        let (service, _tasks) = service();
        let err = service
            .create_conference(&UserId::new("alice"), "", NewConference::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_conference_rejects_reversed_dates() {
        let (service, _tasks) = service();
        let form = NewConference {
            start_date: NaiveDate::from_ymd_opt(2026, 6, 10),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 1),
            ..named("RustConf")
        };
        let err = service
            .create_conference(&UserId::new("alice"), "", form)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_month_and_seats_derived_on_creation() {
        let (service, _tasks) = service();
        let form = NewConference {
            max_attendees: Some(40),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 10),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 12),
            ..named("RustConf")
        };
        let conference = service
            .create_conference(&UserId::new("alice"), "", form)
            .await
            .unwrap();
        assert_eq!(conference.month, 6);
        assert_eq!(conference.seats_available, 40);
    }

    #[tokio::test]
    async fn test_update_conference_is_owner_only() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();

        let err = service
            .update_conference(
                &UserId::new("mallory"),
                conference.id,
                ConferencePatch::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_update_conference_recomputes_month() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();

        let patch = ConferencePatch {
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            ..ConferencePatch::default()
        };
        let updated = service
            .update_conference(&owner, conference.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.month, 9);
    }

    #[tokio::test]
    async fn test_get_conference_resolves_organizer_display_name() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        service
            .save_profile(
                &owner,
                ProfileUpdate {
                    display_name: Some("Alice L.".to_owned()),
                    tee_shirt_size: None,
                },
            )
            .await
            .unwrap();
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();

        let view = service.get_conference(conference.id).await.unwrap();
        assert_eq!(view.organizer_display_name, "Alice L.");
    }

    #[tokio::test]
    async fn test_conferences_to_attend_follows_registration() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let attendee = UserId::new("bob");
        let form = NewConference {
            max_attendees: Some(10),
            ..named("RustConf")
        };
        let conference = service.create_conference(&owner, "", form).await.unwrap();

        assert!(service.register(&attendee, conference.id).await.unwrap());
        let attending = service.conferences_to_attend(&attendee).await.unwrap();
        assert_eq!(attending.len(), 1);
        assert_eq!(attending[0].conference.id, conference.id);

        service.unregister(&attendee, conference.id).await.unwrap();
        assert!(service
            .conferences_to_attend(&attendee)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_session_owner_only_and_dispatches_speaker_task() {
        let (service, mut tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        tasks.recv().await.unwrap(); // confirmation email

        let err = service
            .create_session(
                &UserId::new("mallory"),
                conference.id,
                NewSession {
                    name: Some("Talk".to_owned()),
                    ..NewSession::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let session = service
            .create_session(
                &owner,
                conference.id,
                NewSession {
                    name: Some("Talk".to_owned()),
                    speaker: Some("Ada".to_owned()),
                    ..NewSession::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(session.conference_id, conference.id);

        let task = tasks.recv().await.unwrap();
        assert_eq!(task.target, SET_FEATURED_SPEAKER_TASK);
        assert_eq!(task.param("speaker"), Some("Ada"));
        assert_eq!(
            task.param("conference_id"),
            Some(conference.id.to_string().as_str())
        );
    }

    #[tokio::test]
    async fn test_create_session_without_speaker_skips_dispatch() {
        let (service, mut tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        tasks.recv().await.unwrap(); // confirmation email

        service
            .create_session(
                &owner,
                conference.id,
                NewSession {
                    name: Some("Talk".to_owned()),
                    ..NewSession::default()
                },
            )
            .await
            .unwrap();
        assert!(tasks.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_set_session_speaker_updates_and_dispatches() {
        let (service, mut tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        tasks.recv().await.unwrap();
        let session = service
            .create_session(
                &owner,
                conference.id,
                NewSession {
                    name: Some("Talk".to_owned()),
                    ..NewSession::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .set_session_speaker(session.id, "Grace")
            .await
            .unwrap();
        assert_eq!(updated.speaker.as_deref(), Some("Grace"));

        let task = tasks.recv().await.unwrap();
        assert_eq!(task.target, SET_FEATURED_SPEAKER_TASK);
        assert_eq!(task.param("speaker"), Some("Grace"));
    }

    #[tokio::test]
    async fn test_sessions_by_type_filters() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        for (name, kind) in [("A", "lecture"), ("B", "workshop"), ("C", "lecture")] {
            service
                .create_session(
                    &owner,
                    conference.id,
                    NewSession {
                        name: Some(name.to_owned()),
                        session_type: Some(kind.to_owned()),
                        ..NewSession::default()
                    },
                )
                .await
                .unwrap();
        }

        let lectures = service
            .sessions_by_type(conference.id, "lecture")
            .await
            .unwrap();
        let names: Vec<&str> = lectures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_sessions_by_max_size() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        for (name, size) in [("Small", 10), ("Big", 500)] {
            service
                .create_session(
                    &owner,
                    conference.id,
                    NewSession {
                        name: Some(name.to_owned()),
                        max_attendees: Some(size),
                        ..NewSession::default()
                    },
                )
                .await
                .unwrap();
        }

        let small = service.sessions_by_max_size(100).await.unwrap();
        let names: Vec<&str> = small.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Small"]);
    }

    #[tokio::test]
    async fn test_profile_lazily_created_and_updatable() {
        let (service, _tasks) = service();
        let user = UserId::new("alice");

        let profile = service
            .get_profile(&user, "alice@example.com")
            .await
            .unwrap();
        assert_eq!(profile.display_name, "alice");
        assert_eq!(profile.main_email, "alice@example.com");
        assert_eq!(profile.tee_shirt_size, TeeShirtSize::NotSpecified);

        let updated = service
            .save_profile(
                &user,
                ProfileUpdate {
                    display_name: Some("Alice L.".to_owned()),
                    tee_shirt_size: Some(TeeShirtSize::MW),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Alice L.");
        assert_eq!(updated.tee_shirt_size, TeeShirtSize::MW);
        // Email survives the partial update.
        assert_eq!(updated.main_email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_wishlist_sessions_resolve() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let fan = UserId::new("bob");
        let conference = service
            .create_conference(&owner, "", named("RustConf"))
            .await
            .unwrap();
        let session = service
            .create_session(
                &owner,
                conference.id,
                NewSession {
                    name: Some("Talk".to_owned()),
                    max_attendees: Some(5),
                    ..NewSession::default()
                },
            )
            .await
            .unwrap();

        assert!(service.add_to_wishlist(&fan, session.id).await.unwrap());
        let wishlist = service.wishlist_sessions(&fan).await.unwrap();
        assert_eq!(wishlist.len(), 1);
        assert_eq!(wishlist[0].id, session.id);
    }

    #[tokio::test]
    async fn test_query_conferences_end_to_end() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        for (name, city) in [("Alpha", "London"), ("Beta", "Paris")] {
            let form = NewConference {
                city: Some(city.to_owned()),
                ..named(name)
            };
            service.create_conference(&owner, "", form).await.unwrap();
        }

        let criteria = [FilterCriterion {
            field: "CITY".to_owned(),
            operator: "EQ".to_owned(),
            value: "London".to_owned(),
        }];
        let views = service.query_conferences(&criteria).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].conference.name, "Alpha");
    }

    #[tokio::test]
    async fn test_derived_views_through_service() {
        let (service, _tasks) = service();
        let owner = UserId::new("alice");
        let form = NewConference {
            max_attendees: Some(3),
            ..named("Tight")
        };
        let conference = service.create_conference(&owner, "", form).await.unwrap();

        let message = service.refresh_announcement().await.unwrap();
        assert!(message.contains("Tight"));
        assert_eq!(service.announcement().await, message);

        for name in ["One", "Two"] {
            service
                .create_session(
                    &owner,
                    conference.id,
                    NewSession {
                        name: Some(name.to_owned()),
                        speaker: Some("Ada".to_owned()),
                        ..NewSession::default()
                    },
                )
                .await
                .unwrap();
        }
        service
            .derive_featured_speaker("Ada", conference.id)
            .await
            .unwrap();
        assert!(service.featured_speaker().await.contains("Ada"));
    }
}

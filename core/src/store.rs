//! Entity store port: key-addressed persistence for durable entities.
//!
//! The store is an external collaborator; this module defines only the
//! capability contract the core consumes. Reads return the version each
//! record was observed at, and [`EntityStore::commit`] is a multi-key
//! compare-and-swap over those versions — the store-native transaction
//! primitive the seat reservation path builds its retry loop on. Ancestor
//! scoping (sessions under a conference, conferences under an organizer)
//! is modeled as explicit foreign-key queries.

use crate::query::QueryPlan;
use crate::types::{Conference, ConferenceId, Profile, Session, SessionId, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by entity store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional commit lost a write-write race; the caller should
    /// re-read and retry
    #[error("write conflict: an entity changed since it was read")]
    Contention,

    /// The storage backend failed
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key addressing any durable entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    /// A conference record
    Conference(ConferenceId),
    /// A session record
    Session(SessionId),
    /// A profile record
    Profile(UserId),
}

/// A durable entity record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    /// A conference record
    Conference(Conference),
    /// A session record
    Session(Session),
    /// A profile record
    Profile(Profile),
}

impl Entity {
    /// The key this entity is stored under
    #[must_use]
    pub fn key(&self) -> EntityKey {
        match self {
            Self::Conference(c) => EntityKey::Conference(c.id),
            Self::Session(s) => EntityKey::Session(s.id),
            Self::Profile(p) => EntityKey::Profile(p.user_id.clone()),
        }
    }
}

/// A value together with the store version it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The stored value
    pub value: T,
    /// Monotonic per-entity version, bumped on every write
    pub version: u64,
}

impl<T> Versioned<T> {
    /// Pairs a value with its version
    #[must_use]
    pub const fn new(value: T, version: u64) -> Self {
        Self { value, version }
    }
}

/// One write inside a conditional commit.
///
/// `expected_version` of `None` asserts the entity does not exist yet
/// (creation); `Some(v)` asserts it is still at version `v`. When any
/// assertion fails the whole commit is rejected with
/// [`StoreError::Contention`] and nothing is written.
#[derive(Clone, Debug)]
pub struct ConditionalWrite {
    /// The entity state to persist
    pub entity: Entity,
    /// Version the entity must still carry, or `None` for creation
    pub expected_version: Option<u64>,
}

impl ConditionalWrite {
    /// A write asserting the entity is still at `version`
    #[must_use]
    pub const fn update(entity: Entity, version: u64) -> Self {
        Self {
            entity,
            expected_version: Some(version),
        }
    }

    /// A write asserting the entity does not exist yet
    #[must_use]
    pub const fn create(entity: Entity) -> Self {
        Self {
            entity,
            expected_version: None,
        }
    }
}

/// Capability contract for the external entity store.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a single entity by key, with its current version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Entity>>, StoreError>;

    /// Fetch several entities at once, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get_many(&self, keys: &[EntityKey])
        -> Result<Vec<Option<Versioned<Entity>>>, StoreError>;

    /// Unconditionally persist a single entity (native single-key
    /// atomicity suffices for everything outside seat reservation).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn put(&self, entity: Entity) -> Result<(), StoreError>;

    /// Atomically apply a group of version-checked writes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Contention`] when any version assertion fails
    /// (nothing is written), or [`StoreError::Backend`] on backend failure.
    async fn commit(&self, writes: Vec<ConditionalWrite>) -> Result<(), StoreError>;

    /// Allocate a key for a new conference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn allocate_conference_id(&self) -> Result<ConferenceId, StoreError>;

    /// Allocate a key for a new session under the given conference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn allocate_session_id(
        &self,
        conference: &ConferenceId,
    ) -> Result<SessionId, StoreError>;

    /// Execute a compiled conference query plan verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn query_conferences(&self, plan: &QueryPlan) -> Result<Vec<Conference>, StoreError>;

    /// Conferences created by the given organizer (ancestor scope).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn conferences_by_organizer(
        &self,
        organizer: &UserId,
    ) -> Result<Vec<Conference>, StoreError>;

    /// Every conference record, for global scans.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn all_conferences(&self) -> Result<Vec<Conference>, StoreError>;

    /// Sessions hosted by the given conference (ancestor scope).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn sessions_for_conference(
        &self,
        conference: &ConferenceId,
    ) -> Result<Vec<Session>, StoreError>;

    /// Sessions with the given speaker across all conferences.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn sessions_by_speaker(&self, speaker: &str) -> Result<Vec<Session>, StoreError>;

    /// Every session record, independent of conference ancestry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn all_sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// Fetch a conference by id, with its version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get_conference(
        &self,
        id: &ConferenceId,
    ) -> Result<Option<Versioned<Conference>>, StoreError> {
        Ok(self.get(&EntityKey::Conference(*id)).await?.and_then(|v| {
            match v.value {
                Entity::Conference(c) => Some(Versioned::new(c, v.version)),
                _ => None,
            }
        }))
    }

    /// Fetch a session by id, with its version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get_session(
        &self,
        id: &SessionId,
    ) -> Result<Option<Versioned<Session>>, StoreError> {
        Ok(self.get(&EntityKey::Session(*id)).await?.and_then(|v| {
            match v.value {
                Entity::Session(s) => Some(Versioned::new(s, v.version)),
                _ => None,
            }
        }))
    }

    /// Fetch a profile by user id, with its version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the backend fails.
    async fn get_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<Versioned<Profile>>, StoreError> {
        Ok(self
            .get(&EntityKey::Profile(user.clone()))
            .await?
            .and_then(|v| match v.value {
                Entity::Profile(p) => Some(Versioned::new(p, v.version)),
                _ => None,
            }))
    }
}

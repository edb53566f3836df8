//! Port mocks: a dispatcher that records submissions and entity store
//! wrappers that inject commit contention or a competing writer.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use summit_core::query::QueryPlan;
use summit_core::store::{
    ConditionalWrite, Entity, EntityKey, EntityStore, StoreError, Versioned,
};
use summit_core::tasks::{DispatchError, TaskDispatcher, TaskRequest};
use summit_core::{Conference, ConferenceId, Session, SessionId, UserId};

/// Dispatcher that captures every submitted task for later assertions.
#[derive(Default)]
pub struct RecordingDispatcher {
    submitted: Mutex<Vec<TaskRequest>>,
}

impl RecordingDispatcher {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every task submitted so far, in order.
    #[must_use]
    pub fn submitted(&self) -> Vec<TaskRequest> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submitted tasks with the given target.
    #[must_use]
    pub fn submitted_for(&self, target: &str) -> Vec<TaskRequest> {
        self.submitted()
            .into_iter()
            .filter(|t| t.target == target)
            .collect()
    }
}

#[async_trait]
impl TaskDispatcher for RecordingDispatcher {
    async fn submit(&self, task: TaskRequest) -> Result<(), DispatchError> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
        Ok(())
    }
}

/// Entity store wrapper whose next N commits fail with
/// [`StoreError::Contention`], then delegate normally.
///
/// Reads always pass through, so a retrying caller observes fresh state on
/// every attempt exactly as it would under a real write-write race.
pub struct ContentiousStore {
    inner: Arc<dyn EntityStore>,
    remaining_failures: AtomicU32,
}

impl ContentiousStore {
    /// Wraps `inner`, failing the next `failures` commits.
    #[must_use]
    pub fn new(inner: Arc<dyn EntityStore>, failures: u32) -> Self {
        Self {
            inner,
            remaining_failures: AtomicU32::new(failures),
        }
    }

    /// Commits still scheduled to fail.
    #[must_use]
    pub fn remaining_failures(&self) -> u32 {
        self.remaining_failures.load(Ordering::SeqCst)
    }

    fn should_fail(&self) -> bool {
        self.remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EntityStore for ContentiousStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Entity>>, StoreError> {
        self.inner.get(key).await
    }

    async fn get_many(
        &self,
        keys: &[EntityKey],
    ) -> Result<Vec<Option<Versioned<Entity>>>, StoreError> {
        self.inner.get_many(keys).await
    }

    async fn put(&self, entity: Entity) -> Result<(), StoreError> {
        self.inner.put(entity).await
    }

    async fn commit(&self, writes: Vec<ConditionalWrite>) -> Result<(), StoreError> {
        if self.should_fail() {
            return Err(StoreError::Contention);
        }
        self.inner.commit(writes).await
    }

    async fn allocate_conference_id(&self) -> Result<ConferenceId, StoreError> {
        self.inner.allocate_conference_id().await
    }

    async fn allocate_session_id(
        &self,
        conference: &ConferenceId,
    ) -> Result<SessionId, StoreError> {
        self.inner.allocate_session_id(conference).await
    }

    async fn query_conferences(&self, plan: &QueryPlan) -> Result<Vec<Conference>, StoreError> {
        self.inner.query_conferences(plan).await
    }

    async fn conferences_by_organizer(
        &self,
        organizer: &UserId,
    ) -> Result<Vec<Conference>, StoreError> {
        self.inner.conferences_by_organizer(organizer).await
    }

    async fn all_conferences(&self) -> Result<Vec<Conference>, StoreError> {
        self.inner.all_conferences().await
    }

    async fn sessions_for_conference(
        &self,
        conference: &ConferenceId,
    ) -> Result<Vec<Session>, StoreError> {
        self.inner.sessions_for_conference(conference).await
    }

    async fn sessions_by_speaker(&self, speaker: &str) -> Result<Vec<Session>, StoreError> {
        self.inner.sessions_by_speaker(speaker).await
    }

    async fn all_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.inner.all_sessions().await
    }
}

/// Entity store wrapper that lands a competing commit immediately before
/// the next commit it forwards, so the wrapped caller's first attempt
/// observes a write-write race at exactly the lost-update window.
///
/// Reads pass through, so a retrying caller sees the competitor's writes
/// on its next attempt.
pub struct InterposingStore {
    inner: Arc<dyn EntityStore>,
    pending: Mutex<Option<Vec<ConditionalWrite>>>,
}

impl InterposingStore {
    /// Wraps `inner` with no competing commit queued.
    #[must_use]
    pub fn new(inner: Arc<dyn EntityStore>) -> Self {
        Self {
            inner,
            pending: Mutex::new(None),
        }
    }

    /// Queues `writes` to be committed right before the next forwarded
    /// commit. Expected versions are checked against the store at that
    /// moment, as with any commit.
    pub fn interpose(&self, writes: Vec<ConditionalWrite>) {
        *self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(writes);
    }

    fn take_pending(&self) -> Option<Vec<ConditionalWrite>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[async_trait]
impl EntityStore for InterposingStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Entity>>, StoreError> {
        self.inner.get(key).await
    }

    async fn get_many(
        &self,
        keys: &[EntityKey],
    ) -> Result<Vec<Option<Versioned<Entity>>>, StoreError> {
        self.inner.get_many(keys).await
    }

    async fn put(&self, entity: Entity) -> Result<(), StoreError> {
        self.inner.put(entity).await
    }

    async fn commit(&self, writes: Vec<ConditionalWrite>) -> Result<(), StoreError> {
        if let Some(competing) = self.take_pending() {
            self.inner.commit(competing).await?;
        }
        self.inner.commit(writes).await
    }

    async fn allocate_conference_id(&self) -> Result<ConferenceId, StoreError> {
        self.inner.allocate_conference_id().await
    }

    async fn allocate_session_id(
        &self,
        conference: &ConferenceId,
    ) -> Result<SessionId, StoreError> {
        self.inner.allocate_session_id(conference).await
    }

    async fn query_conferences(&self, plan: &QueryPlan) -> Result<Vec<Conference>, StoreError> {
        self.inner.query_conferences(plan).await
    }

    async fn conferences_by_organizer(
        &self,
        organizer: &UserId,
    ) -> Result<Vec<Conference>, StoreError> {
        self.inner.conferences_by_organizer(organizer).await
    }

    async fn all_conferences(&self) -> Result<Vec<Conference>, StoreError> {
        self.inner.all_conferences().await
    }

    async fn sessions_for_conference(
        &self,
        conference: &ConferenceId,
    ) -> Result<Vec<Session>, StoreError> {
        self.inner.sessions_for_conference(conference).await
    }

    async fn sessions_by_speaker(&self, speaker: &str) -> Result<Vec<Session>, StoreError> {
        self.inner.sessions_by_speaker(speaker).await
    }

    async fn all_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.inner.all_sessions().await
    }
}

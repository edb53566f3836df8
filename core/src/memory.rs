//! In-memory adapters for the store, cache, and dispatcher ports.
//!
//! These back the test suites and the single-process server binary. The
//! entity store keeps a per-entity version counter and rejects a commit
//! whose version assertions no longer hold, which is exactly the behavior
//! the reservation retry loop is written against.

use crate::cache::{CacheError, CacheStore};
use crate::query::{CompiledFilter, FilterField, FilterOp, FilterValue, QueryPlan, SortKey};
use crate::store::{
    ConditionalWrite, Entity, EntityKey, EntityStore, StoreError, Versioned,
};
use crate::tasks::{DispatchError, TaskDispatcher, TaskRequest};
use crate::types::{Conference, ConferenceId, Session, SessionId, UserId};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tokio::sync::mpsc;

// ============================================================================
// Entity store
// ============================================================================

/// Entity store backed by a process-local map.
#[derive(Default)]
pub struct MemoryEntityStore {
    records: RwLock<HashMap<EntityKey, (Entity, u64)>>,
}

impl MemoryEntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<EntityKey, (Entity, u64)>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<EntityKey, (Entity, u64)>> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn conferences_where(&self, predicate: impl Fn(&Conference) -> bool) -> Vec<Conference> {
        self.read()
            .values()
            .filter_map(|(entity, _)| match entity {
                Entity::Conference(c) if predicate(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    fn sessions_where(&self, predicate: impl Fn(&Session) -> bool) -> Vec<Session> {
        self.read()
            .values()
            .filter_map(|(entity, _)| match entity {
                Entity::Session(s) if predicate(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn get(&self, key: &EntityKey) -> Result<Option<Versioned<Entity>>, StoreError> {
        Ok(self
            .read()
            .get(key)
            .map(|(entity, version)| Versioned::new(entity.clone(), *version)))
    }

    async fn get_many(
        &self,
        keys: &[EntityKey],
    ) -> Result<Vec<Option<Versioned<Entity>>>, StoreError> {
        let records = self.read();
        Ok(keys
            .iter()
            .map(|key| {
                records
                    .get(key)
                    .map(|(entity, version)| Versioned::new(entity.clone(), *version))
            })
            .collect())
    }

    async fn put(&self, entity: Entity) -> Result<(), StoreError> {
        let key = entity.key();
        let mut records = self.write();
        let version = records.get(&key).map_or(1, |(_, v)| v + 1);
        records.insert(key, (entity, version));
        Ok(())
    }

    async fn commit(&self, writes: Vec<ConditionalWrite>) -> Result<(), StoreError> {
        let mut records = self.write();

        // Validate every assertion before touching anything.
        for write in &writes {
            let current = records.get(&write.entity.key()).map(|(_, v)| *v);
            if current != write.expected_version {
                return Err(StoreError::Contention);
            }
        }

        for write in writes {
            let key = write.entity.key();
            let version = write.expected_version.unwrap_or(0) + 1;
            records.insert(key, (write.entity, version));
        }
        Ok(())
    }

    async fn allocate_conference_id(&self) -> Result<ConferenceId, StoreError> {
        Ok(ConferenceId::new())
    }

    async fn allocate_session_id(
        &self,
        _conference: &ConferenceId,
    ) -> Result<SessionId, StoreError> {
        Ok(SessionId::new())
    }

    async fn query_conferences(&self, plan: &QueryPlan) -> Result<Vec<Conference>, StoreError> {
        let mut matches =
            self.conferences_where(|c| plan.filters.iter().all(|f| filter_matches(f, c)));
        matches.sort_by(|a, b| compare_by_plan(&plan.order, a, b));
        Ok(matches)
    }

    async fn conferences_by_organizer(
        &self,
        organizer: &UserId,
    ) -> Result<Vec<Conference>, StoreError> {
        let mut matches = self.conferences_where(|c| c.organizer_user_id == *organizer);
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn all_conferences(&self) -> Result<Vec<Conference>, StoreError> {
        let mut matches = self.conferences_where(|_| true);
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn sessions_for_conference(
        &self,
        conference: &ConferenceId,
    ) -> Result<Vec<Session>, StoreError> {
        let mut matches = self.sessions_where(|s| s.conference_id == *conference);
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn sessions_by_speaker(&self, speaker: &str) -> Result<Vec<Session>, StoreError> {
        let mut matches = self.sessions_where(|s| s.speaker.as_deref() == Some(speaker));
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }

    async fn all_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let mut matches = self.sessions_where(|_| true);
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matches)
    }
}

fn filter_matches(filter: &CompiledFilter, conference: &Conference) -> bool {
    match (&filter.field, &filter.value) {
        (FilterField::City, FilterValue::Text(value)) => {
            text_matches(filter.op, &conference.city, value)
        }
        // Topic filters match when any element of the topic list satisfies
        // the comparison.
        (FilterField::Topic, FilterValue::Text(value)) => conference
            .topics
            .iter()
            .any(|topic| text_matches(filter.op, topic, value)),
        (FilterField::Month, FilterValue::Integer(value)) => {
            integer_matches(filter.op, i64::from(conference.month), *value)
        }
        (FilterField::MaxAttendees, FilterValue::Integer(value)) => {
            integer_matches(filter.op, i64::from(conference.max_attendees), *value)
        }
        // The compiler never produces a text value for an integer field or
        // vice versa.
        _ => false,
    }
}

fn text_matches(op: FilterOp, actual: &str, expected: &str) -> bool {
    ordering_matches(op, actual.cmp(expected))
}

fn integer_matches(op: FilterOp, actual: i64, expected: i64) -> bool {
    ordering_matches(op, actual.cmp(&expected))
}

const fn ordering_matches(op: FilterOp, ordering: Ordering) -> bool {
    match op {
        FilterOp::Eq => matches!(ordering, Ordering::Equal),
        FilterOp::Ne => !matches!(ordering, Ordering::Equal),
        FilterOp::Gt => matches!(ordering, Ordering::Greater),
        FilterOp::GtEq => !matches!(ordering, Ordering::Less),
        FilterOp::Lt => matches!(ordering, Ordering::Less),
        FilterOp::LtEq => !matches!(ordering, Ordering::Greater),
    }
}

fn compare_by_plan(order: &[SortKey], a: &Conference, b: &Conference) -> Ordering {
    for key in order {
        let ordering = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Field(FilterField::City) => a.city.cmp(&b.city),
            SortKey::Field(FilterField::Topic) => a.topics.cmp(&b.topics),
            SortKey::Field(FilterField::Month) => a.month.cmp(&b.month),
            SortKey::Field(FilterField::MaxAttendees) => a.max_attendees.cmp(&b.max_attendees),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

// ============================================================================
// Cache store
// ============================================================================

/// Cache store backed by a process-local map.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCacheStore {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// ============================================================================
// Task dispatcher
// ============================================================================

/// Task dispatcher that forwards submissions over a channel to an in-process
/// worker.
pub struct MemoryTaskDispatcher {
    sender: mpsc::UnboundedSender<TaskRequest>,
}

impl MemoryTaskDispatcher {
    /// Creates a dispatcher and the receiving end a worker drains.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TaskRequest>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl TaskDispatcher for MemoryTaskDispatcher {
    async fn submit(&self, task: TaskRequest) -> Result<(), DispatchError> {
        self.sender
            .send(task)
            .map_err(|e| DispatchError::Backend(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::query::{compile, FilterCriterion};
    use crate::types::Profile;

    fn conference(name: &str, city: &str, month: u32, max_attendees: u32) -> Conference {
        Conference {
            id: ConferenceId::new(),
            organizer_user_id: UserId::new("organizer"),
            name: name.to_owned(),
            city: city.to_owned(),
            topics: vec!["Rust".to_owned(), "Systems".to_owned()],
            month,
            max_attendees,
            seats_available: max_attendees,
            start_date: None,
            end_date: None,
        }
    }

    fn criterion(field: &str, operator: &str, value: &str) -> FilterCriterion {
        FilterCriterion {
            field: field.to_owned(),
            operator: operator.to_owned(),
            value: value.to_owned(),
        }
    }

    async fn seeded() -> MemoryEntityStore {
        let store = MemoryEntityStore::new();
        for c in [
            conference("Alpha", "London", 3, 50),
            conference("Beta", "Paris", 6, 10),
            conference("Gamma", "London", 6, 200),
        ] {
            store.put(Entity::Conference(c)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_put_bumps_versions() {
        let store = MemoryEntityStore::new();
        let conf = conference("Alpha", "London", 3, 50);
        let id = conf.id;
        store.put(Entity::Conference(conf.clone())).await.unwrap();
        store.put(Entity::Conference(conf)).await.unwrap();

        let read = store.get_conference(&id).await.unwrap().unwrap();
        assert_eq!(read.version, 2);
    }

    #[tokio::test]
    async fn test_commit_rejects_stale_version_and_writes_nothing() {
        let store = MemoryEntityStore::new();
        let conf = conference("Alpha", "London", 3, 50);
        let id = conf.id;
        store.put(Entity::Conference(conf)).await.unwrap();

        let read = store.get_conference(&id).await.unwrap().unwrap();
        let mut updated = read.value.clone();
        updated.seats_available = 1;

        // Interfering write bumps the version.
        store
            .put(Entity::Conference(read.value.clone()))
            .await
            .unwrap();

        let err = store
            .commit(vec![ConditionalWrite::update(
                Entity::Conference(updated),
                read.version,
            )])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Contention));

        let after = store.get_conference(&id).await.unwrap().unwrap();
        assert_eq!(after.value.seats_available, 50);
    }

    #[tokio::test]
    async fn test_commit_create_asserts_absence() {
        let store = MemoryEntityStore::new();
        let user = UserId::new("alice");
        let profile = Profile::lazy(&user);

        store
            .commit(vec![ConditionalWrite::create(Entity::Profile(
                profile.clone(),
            ))])
            .await
            .unwrap();

        let err = store
            .commit(vec![ConditionalWrite::create(Entity::Profile(profile))])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Contention));
    }

    #[tokio::test]
    async fn test_query_equality_filter() {
        let store = seeded().await;
        let plan = compile(&[criterion("CITY", "EQ", "London")]).unwrap();
        let results = store.query_conferences(&plan).await.unwrap();
        let names: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[tokio::test]
    async fn test_query_inequality_orders_by_ranged_field() {
        let store = seeded().await;
        let plan = compile(&[criterion("MAX_ATTENDEES", "GT", "10")]).unwrap();
        let results = store.query_conferences(&plan).await.unwrap();
        let names: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma"]);
    }

    #[tokio::test]
    async fn test_query_topic_membership() {
        let store = seeded().await;
        let plan = compile(&[criterion("TOPIC", "EQ", "Rust")]).unwrap();
        let results = store.query_conferences(&plan).await.unwrap();
        assert_eq!(results.len(), 3);

        let plan = compile(&[criterion("TOPIC", "EQ", "Cooking")]).unwrap();
        let results = store.query_conferences(&plan).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_query_combined_filters() {
        let store = seeded().await;
        let plan = compile(&[
            criterion("CITY", "EQ", "London"),
            criterion("MONTH", "GTEQ", "6"),
        ])
        .unwrap();
        let results = store.query_conferences(&plan).await.unwrap();
        let names: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma"]);
    }

    #[tokio::test]
    async fn test_memory_dispatcher_delivers_in_order() {
        let (dispatcher, mut receiver) = MemoryTaskDispatcher::channel();
        dispatcher.submit(TaskRequest::new("first")).await.unwrap();
        dispatcher.submit(TaskRequest::new("second")).await.unwrap();

        assert_eq!(receiver.recv().await.unwrap().target, "first");
        assert_eq!(receiver.recv().await.unwrap().target, "second");
    }

    #[tokio::test]
    async fn test_cache_roundtrip_and_delete() {
        let cache = MemoryCacheStore::new();
        assert!(cache.get("missing").await.unwrap().is_none());
        cache.set("key", "value").await.unwrap();
        assert_eq!(cache.get("key").await.unwrap().as_deref(), Some("value"));
        cache.delete("key").await.unwrap();
        assert!(cache.get("key").await.unwrap().is_none());
        cache.delete("key").await.unwrap();
    }
}

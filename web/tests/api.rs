//! HTTP-level flows through the full router.

#![allow(clippy::unwrap_used)]

use axum_test::TestServer;
use http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use summit_core::memory::{MemoryCacheStore, MemoryEntityStore, MemoryTaskDispatcher};
use summit_core::store::EntityStore;
use summit_core::ConferenceService;
use summit_web::{build_router, AppState};

fn server() -> TestServer {
    let (dispatcher, _tasks) = MemoryTaskDispatcher::channel();
    let service = Arc::new(ConferenceService::new(
        Arc::new(MemoryEntityStore::new()),
        Arc::new(MemoryCacheStore::new()),
        Arc::new(dispatcher),
    ));
    TestServer::new(build_router(AppState::new(service))).unwrap()
}

fn user(name: &'static str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-user-id"),
        HeaderValue::from_static(name),
    )
}

#[tokio::test]
async fn seeded_conference_is_served() {
    let store = Arc::new(MemoryEntityStore::new());
    let conference = summit_testing::fixtures::ConferenceBuilder::new("Seeded Summit")
        .city("Berlin")
        .seats(12)
        .build();
    let id = conference.id;
    store
        .put(summit_core::store::Entity::Conference(conference))
        .await
        .unwrap();

    let (dispatcher, _tasks) = MemoryTaskDispatcher::channel();
    let service = Arc::new(ConferenceService::new(
        store,
        Arc::new(MemoryCacheStore::new()),
        Arc::new(dispatcher),
    ));
    let server = TestServer::new(build_router(AppState::new(service))).unwrap();

    let response = server.get(&format!("/conferences/{id}")).await;
    response.assert_status(StatusCode::OK);
    let view: Value = response.json();
    assert_eq!(view["name"], "Seeded Summit");
    assert_eq!(view["city"], "Berlin");
    assert_eq!(view["seats_available"], 12);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn unauthenticated_writes_are_rejected() {
    let server = server();
    let response = server
        .post("/conferences")
        .json(&json!({ "name": "RustConf" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn conference_lifecycle_over_http() {
    let server = server();
    let (alice_h, alice_v) = user("alice");
    let (bob_h, bob_v) = user("bob");

    // Create a one-seat conference.
    let created = server
        .post("/conferences")
        .add_header(alice_h.clone(), alice_v.clone())
        .json(&json!({ "name": "Tiny Summit", "max_attendees": 1 }))
        .await;
    created.assert_status(StatusCode::OK);
    let conference: Value = created.json();
    let id = conference["id"].as_str().unwrap().to_owned();
    assert_eq!(conference["seats_available"], 1);

    // Alice takes the seat; Bob is refused.
    server
        .post(&format!("/conferences/{id}/registration"))
        .add_header(alice_h.clone(), alice_v.clone())
        .await
        .assert_status(StatusCode::OK);
    server
        .post(&format!("/conferences/{id}/registration"))
        .add_header(bob_h.clone(), bob_v.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    // Alice releases it; Bob gets in.
    server
        .delete(&format!("/conferences/{id}/registration"))
        .add_header(alice_h.clone(), alice_v.clone())
        .await
        .assert_status(StatusCode::OK);
    server
        .post(&format!("/conferences/{id}/registration"))
        .add_header(bob_h.clone(), bob_v.clone())
        .await
        .assert_status(StatusCode::OK);

    let attending = server
        .get("/conferences/attending")
        .add_header(bob_h, bob_v)
        .await;
    attending.assert_status(StatusCode::OK);
    let list: Value = attending.json();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn queries_reject_conflicting_inequalities() {
    let server = server();
    let response = server
        .post("/conferences/query")
        .json(&json!({
            "filters": [
                { "field": "MONTH", "operator": "GT", "value": "3" },
                { "field": "MAX_ATTENDEES", "operator": "LT", "value": "100" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_filters_conferences_by_city() {
    let server = server();
    let (alice_h, alice_v) = user("alice");

    for (name, city) in [("Alpha", "London"), ("Beta", "Paris")] {
        server
            .post("/conferences")
            .add_header(alice_h.clone(), alice_v.clone())
            .json(&json!({ "name": name, "city": city }))
            .await
            .assert_status(StatusCode::OK);
    }

    let response = server
        .post("/conferences/query")
        .json(&json!({
            "filters": [{ "field": "CITY", "operator": "EQ", "value": "London" }]
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let views: Value = response.json();
    assert_eq!(views.as_array().unwrap().len(), 1);
    assert_eq!(views[0]["name"], "Alpha");
}

#[tokio::test]
async fn session_creation_is_owner_only() {
    let server = server();
    let (alice_h, alice_v) = user("alice");
    let (bob_h, bob_v) = user("bob");

    let created = server
        .post("/conferences")
        .add_header(alice_h.clone(), alice_v.clone())
        .json(&json!({ "name": "RustConf" }))
        .await;
    let id = created.json::<Value>()["id"].as_str().unwrap().to_owned();

    server
        .post(&format!("/conferences/{id}/sessions"))
        .add_header(bob_h, bob_v)
        .json(&json!({ "name": "Talk" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post(&format!("/conferences/{id}/sessions"))
        .add_header(alice_h, alice_v)
        .json(&json!({ "name": "Talk", "session_type": "lecture" }))
        .await
        .assert_status(StatusCode::OK);

    let sessions = server
        .get(&format!("/conferences/{id}/sessions/type/lecture"))
        .await;
    sessions.assert_status(StatusCode::OK);
    assert_eq!(sessions.json::<Value>().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn profile_roundtrip() {
    let server = server();
    let (alice_h, alice_v) = user("alice");

    let fetched = server
        .get("/profile")
        .add_header(alice_h.clone(), alice_v.clone())
        .add_header(
            HeaderName::from_static("x-user-email"),
            HeaderValue::from_static("alice@example.com"),
        )
        .await;
    fetched.assert_status(StatusCode::OK);
    let profile: Value = fetched.json();
    assert_eq!(profile["main_email"], "alice@example.com");
    assert_eq!(profile["tee_shirt_size"], "NOT_SPECIFIED");

    let saved = server
        .put("/profile")
        .add_header(alice_h, alice_v)
        .json(&json!({ "display_name": "Alice L.", "tee_shirt_size": "L_W" }))
        .await;
    saved.assert_status(StatusCode::OK);
    assert_eq!(saved.json::<Value>()["display_name"], "Alice L.");
}

#[tokio::test]
async fn derived_views_default_to_empty() {
    let server = server();
    let response = server.get("/announcement").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "message": "" }));

    let response = server.get("/featured-speaker").await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({ "message": "" }));
}

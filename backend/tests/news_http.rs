//! HTTP contract tests for the news API over in-memory adapters.

mod support;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test as actix_test;
use event_contracts::{Envelope, NewsProcessMessage, Topic};
use rstest::rstest;
use serde_json::{Value, json};
use sportnews::domain::ports::{EventSubscriber, NewsCacheKey};
use sportnews::domain::{News, PLACEHOLDER_USER_ID, TRACE_ID_HEADER};
use sportnews::server::news_app;

use support::{NewsHarness, ready_health};

const MISSING_ID: &str = "6737301a2b9c4e1f0a000001";

macro_rules! init_app {
    ($harness:expr) => {
        actix_test::init_service(news_app($harness.data(), ready_health())).await
    };
}

fn draft(title: &str) -> Value {
    json!({"title": title, "content": "Match report", "category": "football"})
}

async fn only_item(harness: &NewsHarness) -> News {
    let mut all = harness.service.list_all().await.expect("list");
    assert_eq!(all.len(), 1);
    all.pop().expect("one item")
}

#[rstest]
#[actix_web::test]
async fn create_then_get_round_trips_and_serves_from_cache() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news")
            .set_json(draft("Derby day"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let created = only_item(&harness).await;
    assert_eq!(created.id.to_string().len(), 24);

    for _ in 0..2 {
        let body: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/news/{}", created.id))
                .to_request(),
        )
        .await;
        assert_eq!(body["title"], "Derby day");
        assert_eq!(body["content"], "Match report");
        assert_eq!(body["category"], "football");
        assert_eq!(body["publishedAt"], Value::Null);
    }
    assert_eq!(harness.repository.lookups(), 0);
    assert_eq!(harness.cache.hits(), 2);
}

#[rstest]
#[actix_web::test]
async fn create_publishes_registration_with_placeholder_user() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);

    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news")
            .set_json(draft("Cup final"))
            .to_request(),
    )
    .await;
    let created = only_item(&harness).await;

    let payload = harness
        .bus
        .next_message(Topic::ObjectService)
        .await
        .expect("bus")
        .expect("registration published");
    let message = NewsProcessMessage::decode(&payload).expect("valid envelope");
    assert_eq!(message.object_id, created.id.to_string());
    assert_eq!(message.user_id, PLACEHOLDER_USER_ID);
}

#[rstest]
#[actix_web::test]
async fn creates_yield_unique_identifiers() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    for title in ["one", "two", "three"] {
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/news")
                .set_json(draft(title))
                .to_request(),
        )
        .await;
    }

    let all: Vec<News> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get().uri("/api/news/all").to_request(),
    )
    .await;
    let mut ids: Vec<String> = all.iter().map(|news| news.id.to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[rstest]
#[actix_web::test]
async fn update_replaces_fields_and_invalidates_cache() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let created = harness
        .service
        .create(serde_json::from_value(draft("Old")).expect("draft"))
        .await
        .expect("create");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/news/{}", created.id))
            .set_json(json!({"title": "New", "content": "Rewritten", "category": "tennis"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: News = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/news/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(fetched.title, "New");
    assert_eq!(fetched.category, "tennis");
    let cached = harness
        .cache
        .entry(&NewsCacheKey::for_news(&created.id))
        .expect("cache refreshed");
    assert!(cached.contains("Rewritten"));
}

#[rstest]
#[case::update("PUT")]
#[case::delete("DELETE")]
#[case::get("GET")]
#[actix_web::test]
async fn missing_items_are_not_found(#[case] method: &str) {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let uri = format!("/api/news/{MISSING_ID}");
    let req = match method {
        "PUT" => actix_test::TestRequest::put().uri(&uri).set_json(draft("x")),
        "DELETE" => actix_test::TestRequest::delete().uri(&uri),
        _ => actix_test::TestRequest::get().uri(&uri),
    };

    let res = actix_test::call_service(&app, req.to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    let trace_header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "Not Found");
    assert_eq!(body["traceId"], trace_header.as_str());
    assert!(harness.repository.is_empty());
}

#[rstest]
#[actix_web::test]
async fn delete_removes_item_and_cache_entry() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let created = harness
        .service
        .create(serde_json::from_value(draft("Gone soon")).expect("draft"))
        .await
        .expect("create");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/news/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(
        harness
            .cache
            .entry(&NewsCacheKey::for_news(&created.id))
            .is_none()
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/news/{}", created.id))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn delete_all_empties_the_collection() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    for title in ["a", "b"] {
        harness
            .service
            .create(serde_json::from_value(draft(title)).expect("draft"))
            .await
            .expect("create");
    }

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete().uri("/api/news/all").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let all: Vec<News> = actix_test::call_and_read_body_json(
        &app,
        actix_test::TestRequest::get().uri("/api/news/all").to_request(),
    )
    .await;
    assert!(all.is_empty());
}

#[rstest]
#[actix_web::test]
async fn update_timestamp_sets_published_at() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let created = harness
        .service
        .create(serde_json::from_value(draft("Confirm me")).expect("draft"))
        .await
        .expect("create");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news/update-timestamp")
            .set_json(json!({
                "ObjectId": created.id.to_string(),
                "ConfirmationTimestamp": "2024-11-15T11:17:05Z"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let stored = only_item(&harness).await;
    assert_eq!(
        stored.published_at.map(|at| at.to_rfc3339()).as_deref(),
        Some("2024-11-15T11:17:05+00:00")
    );
}

#[rstest]
#[case::unknown_item(
    json!({"ObjectId": MISSING_ID, "ConfirmationTimestamp": "2024-11-15T11:17:05Z"}),
    StatusCode::NOT_FOUND
)]
#[case::bad_identifier(
    json!({"ObjectId": "nope", "ConfirmationTimestamp": "2024-11-15T11:17:05Z"}),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[actix_web::test]
async fn update_timestamp_reports_failures(#[case] body: Value, #[case] expected: StatusCode) {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news/update-timestamp")
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}

#[rstest]
#[actix_web::test]
async fn unreadable_timestamp_is_unprocessable() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let created = harness
        .service
        .create(serde_json::from_value(draft("Bad clock")).expect("draft"))
        .await
        .expect("create");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news/update-timestamp")
            .set_json(json!({"ObjectId": created.id.to_string(), "ConfirmationTimestamp": "soon"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(only_item(&harness).await.published_at.is_none());
}

#[rstest]
#[actix_web::test]
async fn invalid_path_identifier_is_rejected_before_the_store() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/news/not-an-id")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(harness.repository.lookups(), 0);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/news")
            .insert_header((CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(harness.repository.is_empty());
}

#[rstest]
#[actix_web::test]
async fn cache_outage_is_unprocessable() {
    let harness = NewsHarness::new();
    let app = init_app!(harness);
    harness.cache.set_unavailable(true);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/news/{MISSING_ID}"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["detail"], "failed to read news from cache");
}

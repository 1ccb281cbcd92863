use super::traffic::{EnrichRequest, MAX_ENRICH_LIMIT};
use super::*;
use adspace_core::{CandidateSelector, Environment, TrafficLevel};
use axum::body::{to_bytes, Body};
use axum::http::Request;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(places_api_key: Option<&str>, places_base_url: &str) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        database_url: "postgres://unused".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        places_api_key: places_api_key.map(str::to_string),
        places_base_url: places_base_url.to_string(),
        places_timeout_secs: 5,
        places_max_retries: 0,
        places_retry_backoff_base_ms: 0,
        enrich_search_radius_m: 500,
        enrich_batch_limit: 10,
        enrich_inter_item_delay_ms: 0,
        enrich_max_concurrency: 1,
        enrich_call_timeout_secs: 10,
        enrich_cron: "0 0 3 * * *".to_string(),
    })
}

fn test_state(pool: sqlx::PgPool, config: Arc<AppConfig>) -> AppState {
    AppState::new(pool, config, CancellationToken::new())
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

fn post_enrich(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/locations/traffic/enrich")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn insert_location(pool: &sqlx::PgPool, title: &str, lat: f64, lng: f64) -> Uuid {
    adspace_db::insert_location(
        pool,
        &adspace_db::NewLocation {
            title: title.to_string(),
            latitude: Some(lat),
            longitude: Some(lng),
        },
    )
    .await
    .expect("insert location")
}

// ---------------------------------------------------------------------------
// Pure
// ---------------------------------------------------------------------------

#[test]
fn configuration_error_maps_to_service_unavailable() {
    let response = ApiError::new("req-1", "configuration_error", "no key").into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn conflict_maps_to_409() {
    let response = ApiError::new("req-1", "conflict", "busy").into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn empty_enrich_request_uses_default_limit() {
    let request: EnrichRequest = serde_json::from_str("{}").unwrap();
    assert!(!request.force);
    assert_eq!(request.selector(10), Ok(CandidateSelector::Limit(10)));
}

#[test]
fn enrich_request_validates_selector() {
    let id = Uuid::new_v4();
    let by_id = EnrichRequest {
        location_ids: vec![id],
        ..EnrichRequest::default()
    };
    assert_eq!(by_id.selector(10), Ok(CandidateSelector::Ids(vec![id])));

    let both = EnrichRequest {
        location_ids: vec![id],
        limit: Some(3),
        force: false,
    };
    assert!(both.selector(10).is_err());

    let zero = EnrichRequest {
        limit: Some(0),
        ..EnrichRequest::default()
    };
    assert!(zero.selector(10).is_err());

    let too_many = EnrichRequest {
        limit: Some(MAX_ENRICH_LIMIT + 1),
        ..EnrichRequest::default()
    };
    assert!(too_many.selector(10).is_err());
}

#[test]
fn enrich_request_rejects_unknown_fields() {
    assert!(serde_json::from_str::<EnrichRequest>(r#"{"forse": true}"#).is_err());
}

// ---------------------------------------------------------------------------
// Live
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_ok(pool: sqlx::PgPool) {
    let app = build_app(test_state(pool, test_config(None, "http://unused")));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "health-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "health-1");
}

#[sqlx::test(migrations = "../../migrations")]
async fn traffic_for_unknown_location_is_404(pool: sqlx::PgPool) {
    let app = build_app(test_state(pool, test_config(None, "http://unused")));
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/locations/{}/traffic", Uuid::new_v4()))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "not_found");
}

#[sqlx::test(migrations = "../../migrations")]
async fn enrich_without_api_key_is_a_configuration_error(pool: sqlx::PgPool) {
    insert_location(&pool, "unkeyed", 10.0, 10.0).await;
    let app = build_app(test_state(pool, test_config(None, "http://unused")));

    let response = app
        .oneshot(post_enrich(&serde_json::json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "configuration_error");
}

#[sqlx::test(migrations = "../../migrations")]
async fn enrich_is_refused_while_another_run_holds_the_guard(pool: sqlx::PgPool) {
    let state = test_state(pool, test_config(Some("k"), "http://unused"));
    let _held = state.enrichment_guard.lock().await;
    let app = build_app(state.clone());

    let response = app
        .oneshot(post_enrich(&serde_json::json!({})))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../migrations")]
async fn enrich_scores_and_persists_then_serves_traffic(pool: sqlx::PgPool) {
    let places = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{ "place_id": "p-cafe", "name": "Corner Cafe" }]
        })))
        .mount(&places)
        .await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": { "user_ratings_total": 600, "types": ["cafe", "food"] }
        })))
        .mount(&places)
        .await;

    let id = insert_location(&pool, "Corner Screen", 47.6062, -122.3321).await;
    let state = test_state(pool, test_config(Some("test-key"), &places.uri()));

    let response = build_app(state.clone())
        .oneshot(post_enrich(&serde_json::json!({ "location_ids": [id] })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["successful"], 1);
    // 600 reviews (+2) and an exact "cafe" tag (+2) → high.
    assert_eq!(json["data"]["results"][0]["classification"], "high");

    let response = build_app(state)
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/locations/{id}/traffic"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["data"]["traffic"]["classification"], "high");
    assert_eq!(json["data"]["traffic"]["average_daily_visitors"], 12);
    assert_eq!(
        json["data"]["traffic"]["weekly_pattern"]["saturday"],
        TrafficLevel::VeryHigh.as_str()
    );
}

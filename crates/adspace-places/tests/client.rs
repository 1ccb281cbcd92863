//! Integration tests for `PlacesClient` using wiremock HTTP mocks.

use adspace_core::{DirectoryClient, DirectoryError, NearbyStatus};
use adspace_places::{PlacesClient, PlacesError, DETAIL_FIELDS};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 30, base_url)
        .expect("client construction should not fail")
        .with_retry(2, 0)
}

#[tokio::test]
async fn nearby_search_returns_places_in_order() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            { "place_id": "ChIJ-first", "name": "Franklin Barbecue", "types": ["restaurant", "food"] },
            { "place_id": "ChIJ-second", "name": "Congress Ave Kiosk" },
            { "place_id": "ChIJ-third" }
        ],
        "html_attributions": []
    });

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("location", "30.2672,-97.7431"))
        .and(query_param("radius", "500"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let search = client
        .search_nearby(30.2672, -97.7431, 500)
        .await
        .expect("should parse nearby results");

    assert_eq!(search.status, NearbyStatus::Ok);
    assert_eq!(search.places.len(), 3);
    assert_eq!(search.places[0].place_id, "ChIJ-first");
    assert_eq!(search.places[0].name.as_deref(), Some("Franklin Barbecue"));
    assert!(search.places[2].name.is_none());
}

#[tokio::test]
async fn zero_results_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let search = client.search_nearby(0.0, 0.0, 500).await.unwrap();

    assert_eq!(search.status, NearbyStatus::ZeroResults);
    assert!(search.places.is_empty());
}

#[tokio::test]
async fn request_denied_is_surfaced_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.search_nearby(1.0, 2.0, 500).await.unwrap_err();

    match err {
        PlacesError::ApiStatus { status, message } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert!(message.contains("API key"));
        }
        other => panic!("expected ApiStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn over_query_limit_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OVER_QUERY_LIMIT", "results": [] })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{ "place_id": "p1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let search = client.search_nearby(1.0, 2.0, 500).await.unwrap();

    assert_eq!(search.places.len(), 1);
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_place_details("p1").await.unwrap_err();

    assert!(matches!(err, PlacesError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn place_details_are_parsed() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "result": {
            "user_ratings_total": 1200,
            "types": ["restaurant", "food", "point_of_interest", "establishment"],
            "opening_hours": { "open_now": true }
        }
    });

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "ChIJ-first"))
        .and(query_param("fields", DETAIL_FIELDS))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let details = client.get_place_details("ChIJ-first").await.unwrap();

    assert_eq!(details.review_count, 1200);
    assert!(details.category_tags.contains("restaurant"));
    assert_eq!(details.category_tags.len(), 4);
    assert!(details.opening_hours_present);
}

#[tokio::test]
async fn sparse_place_details_default_to_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OK", "result": {} })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let details = client.get_place_details("sparse").await.unwrap();

    assert_eq!(details.review_count, 0);
    assert!(details.category_tags.is_empty());
    assert!(!details.opening_hours_present);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error_through_the_port() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let directory: &dyn DirectoryClient = &client;
    let err = directory.nearby_search(1.0, 2.0, 500).await.unwrap_err();

    assert!(matches!(err, DirectoryError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn not_found_details_map_to_directory_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "NOT_FOUND" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let directory: &dyn DirectoryClient = &client;
    let err = directory.place_details("gone").await.unwrap_err();

    assert!(
        matches!(err, DirectoryError::Status { ref status, .. } if status == "NOT_FOUND"),
        "got {err:?}"
    );
}

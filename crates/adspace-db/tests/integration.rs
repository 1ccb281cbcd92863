//! Offline unit tests for adspace-db pool configuration and row types.
//! These tests do not require a live database connection.

use adspace_core::{AppConfig, Environment};
use adspace_db::{CandidateRow, LocationRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        places_api_key: None,
        places_base_url: "https://maps.googleapis.com/maps/api/place/".to_string(),
        places_timeout_secs: 10,
        places_max_retries: 2,
        places_retry_backoff_base_ms: 500,
        enrich_search_radius_m: 500,
        enrich_batch_limit: 10,
        enrich_inter_item_delay_ms: 200,
        enrich_max_concurrency: 1,
        enrich_call_timeout_secs: 10,
        enrich_cron: "0 0 3 * * *".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout, std::time::Duration::from_secs(9));
}

/// Compile-time smoke test: confirm that [`LocationRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn location_row_has_expected_fields() {
    use chrono::Utc;
    use rust_decimal::Decimal;

    let row = LocationRow {
        id: uuid::Uuid::new_v4(),
        title: "I-35 Northbound".to_string(),
        latitude: Some(Decimal::new(30_267_153, 6)),
        longitude: Some(Decimal::new(-97_743_061, 6)),
        traffic_data: None,
        traffic_updated_at: None,
        traffic_attempted_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert!(row.traffic_estimate().is_none());
    assert_eq!(row.latitude.map(|d| d.to_string()).as_deref(), Some("30.267153"));
}

#[test]
fn candidate_row_without_estimate_converts() {
    let row = CandidateRow {
        id: uuid::Uuid::new_v4(),
        title: "Union Station".to_string(),
        latitude: rust_decimal::Decimal::new(38_897_600, 6),
        longitude: rust_decimal::Decimal::new(-77_006_400, 6),
        traffic_data: None,
    };

    let candidate = row.into_candidate().expect("coordinates fit in f64");
    assert_eq!(candidate.title, "Union Station");
    assert!((candidate.latitude - 38.8976).abs() < 1e-9);
}

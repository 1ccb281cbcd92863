use std::net::SocketAddr;
use std::time::Duration;

/// Ceiling on a single Places retry back-off before jitter.
pub const PLACES_MAX_BACKOFF_MS: u64 = 30_000;

/// Back-off delays are drawn from `delay × [1 - J, 1 + J]`.
pub const PLACES_BACKOFF_JITTER: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Credential for the points-of-interest directory. Absence is only an
    /// error once an enrichment run is requested.
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub places_timeout_secs: u64,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,
    pub enrich_search_radius_m: u32,
    pub enrich_batch_limit: usize,
    pub enrich_inter_item_delay_ms: u64,
    pub enrich_max_concurrency: usize,
    pub enrich_call_timeout_secs: u64,
    pub enrich_cron: String,
}

/// Back-off before Places retry `retry` (1-based), before jitter:
/// `base_ms × 2^(retry-1)`, capped at [`PLACES_MAX_BACKOFF_MS`].
#[must_use]
pub fn places_backoff_ms(base_ms: u64, retry: u32) -> u64 {
    base_ms
        .saturating_mul(1u64 << retry.saturating_sub(1).min(10))
        .min(PLACES_MAX_BACKOFF_MS)
}

impl AppConfig {
    /// Longest one directory lookup can take with retries: every attempt hits
    /// the request timeout and every back-off draws its largest jitter.
    #[must_use]
    pub fn directory_call_budget(&self) -> Duration {
        let attempts = u64::from(self.places_max_retries) + 1;
        let requests_ms = self
            .places_timeout_secs
            .saturating_mul(1000)
            .saturating_mul(attempts);

        // Past the eleventh retry every delay sits at the same ceiling.
        let ramp = self.places_max_retries.min(11);
        let plateau = u64::from(self.places_max_retries - ramp);
        let backoff_ms = (1..=ramp)
            .map(|retry| places_backoff_ms(self.places_retry_backoff_base_ms, retry))
            .fold(0u64, u64::saturating_add)
            .saturating_add(
                places_backoff_ms(self.places_retry_backoff_base_ms, 11)
                    .saturating_mul(plateau),
            );
        // Largest jitter draw, PLACES_BACKOFF_JITTER = 0.25.
        let jitter_ms = backoff_ms.div_ceil(4);

        Duration::from_millis(
            requests_ms
                .saturating_add(backoff_ms)
                .saturating_add(jitter_ms),
        )
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .field("enrich_search_radius_m", &self.enrich_search_radius_m)
            .field("enrich_batch_limit", &self.enrich_batch_limit)
            .field(
                "enrich_inter_item_delay_ms",
                &self.enrich_inter_item_delay_ms,
            )
            .field("enrich_max_concurrency", &self.enrich_max_concurrency)
            .field("enrich_call_timeout_secs", &self.enrich_call_timeout_secs)
            .field("enrich_cron", &self.enrich_cron)
            .finish()
    }
}

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so the
/// logic can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("ADSPACE_ENV", "development"))?;

    let bind_addr: SocketAddr = parse_as(
        "ADSPACE_BIND_ADDR",
        &or_default("ADSPACE_BIND_ADDR", "0.0.0.0:3000"),
    )?;
    let log_level = or_default("ADSPACE_LOG_LEVEL", "info");

    let db_max_connections = parse_as(
        "ADSPACE_DB_MAX_CONNECTIONS",
        &or_default("ADSPACE_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections = parse_as(
        "ADSPACE_DB_MIN_CONNECTIONS",
        &or_default("ADSPACE_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs = parse_as(
        "ADSPACE_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("ADSPACE_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let places_base_url = or_default(
        "ADSPACE_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place/",
    );
    let places_timeout_secs = parse_as(
        "ADSPACE_PLACES_TIMEOUT_SECS",
        &or_default("ADSPACE_PLACES_TIMEOUT_SECS", "10"),
    )?;
    let places_max_retries = parse_as(
        "ADSPACE_PLACES_MAX_RETRIES",
        &or_default("ADSPACE_PLACES_MAX_RETRIES", "2"),
    )?;
    let places_retry_backoff_base_ms = parse_as(
        "ADSPACE_PLACES_RETRY_BACKOFF_BASE_MS",
        &or_default("ADSPACE_PLACES_RETRY_BACKOFF_BASE_MS", "500"),
    )?;

    let enrich_search_radius_m = parse_as(
        "ADSPACE_ENRICH_SEARCH_RADIUS_M",
        &or_default("ADSPACE_ENRICH_SEARCH_RADIUS_M", "500"),
    )?;
    let enrich_batch_limit = parse_as(
        "ADSPACE_ENRICH_BATCH_LIMIT",
        &or_default("ADSPACE_ENRICH_BATCH_LIMIT", "10"),
    )?;
    let enrich_inter_item_delay_ms = parse_as(
        "ADSPACE_ENRICH_INTER_ITEM_DELAY_MS",
        &or_default("ADSPACE_ENRICH_INTER_ITEM_DELAY_MS", "200"),
    )?;
    let enrich_max_concurrency: usize = parse_as(
        "ADSPACE_ENRICH_MAX_CONCURRENCY",
        &or_default("ADSPACE_ENRICH_MAX_CONCURRENCY", "1"),
    )?;
    if enrich_max_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADSPACE_ENRICH_MAX_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let enrich_call_timeout_secs = parse_as(
        "ADSPACE_ENRICH_CALL_TIMEOUT_SECS",
        &or_default("ADSPACE_ENRICH_CALL_TIMEOUT_SECS", "45"),
    )?;
    let enrich_cron = or_default("ADSPACE_ENRICH_CRON", "0 0 3 * * *");

    let config = AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        places_api_key,
        places_base_url,
        places_timeout_secs,
        places_max_retries,
        places_retry_backoff_base_ms,
        enrich_search_radius_m,
        enrich_batch_limit,
        enrich_inter_item_delay_ms,
        enrich_max_concurrency,
        enrich_call_timeout_secs,
        enrich_cron,
    };
    validate_call_timeout(&config)?;
    Ok(config)
}

/// The orchestrator bounds each directory call, retries included, by
/// `ADSPACE_ENRICH_CALL_TIMEOUT_SECS`; anything at or below the worst case
/// would cut retries off.
fn validate_call_timeout(config: &AppConfig) -> Result<(), ConfigError> {
    let budget = config.directory_call_budget();
    if config.enrich_call_timeout_secs.saturating_mul(1000) <= budget_ms(budget) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADSPACE_ENRICH_CALL_TIMEOUT_SECS".to_string(),
            reason: format!(
                "must exceed the worst-case directory call of {}ms \
                 (ADSPACE_PLACES_TIMEOUT_SECS x (ADSPACE_PLACES_MAX_RETRIES + 1) plus back-off)",
                budget_ms(budget)
            ),
        });
    }
    Ok(())
}

fn budget_ms(budget: std::time::Duration) -> u64 {
    u64::try_from(budget.as_millis()).unwrap_or(u64::MAX)
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ADSPACE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

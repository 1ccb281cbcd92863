//! Retry with exponential back-off and jitter for the Places client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors. Request-level rejections such as `REQUEST_DENIED` are
//! returned immediately since retrying cannot change the answer.

use std::future::Future;
use std::time::Duration;

use adspace_core::{places_backoff_ms, PLACES_BACKOFF_JITTER};

use crate::error::PlacesError;

/// Envelope statuses that Google documents as transient.
const TRANSIENT_STATUSES: &[&str] = &["OVER_QUERY_LIMIT", "UNKNOWN_ERROR"];

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, and the
/// `OVER_QUERY_LIMIT` / `UNKNOWN_ERROR` envelope statuses.
///
/// **Not retriable:** every other envelope status, malformed bodies, and
/// configuration errors.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::ApiStatus { status, .. } => TRANSIENT_STATUSES.contains(&status.as_str()),
        PlacesError::MissingApiKey
        | PlacesError::InvalidBaseUrl { .. }
        | PlacesError::Deserialize { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The delay before retry `n` is [`places_backoff_ms`] with
/// ±[`PLACES_BACKOFF_JITTER`] jitter.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = places_backoff_ms(backoff_base_ms, attempt);
                let jitter = 1.0 + PLACES_BACKOFF_JITTER * (rand::random::<f64>() * 2.0 - 1.0);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * jitter) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Places transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

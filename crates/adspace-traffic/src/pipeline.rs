//! Bulk traffic enrichment.
//!
//! 1. Load candidates from the [`LocationStore`].
//! 2. For each candidate (bounded concurrency, candidate order preserved):
//!    skip if already estimated and not forced, otherwise nearby search,
//!    detail lookup on the top result, score, persist.
//! 3. Fold the per-location outcomes into an [`EnrichmentRunReport`].
//!
//! Failed locations are stamped through [`LocationStore::record_attempt`] so
//! limit-based runs rotate past them instead of retrying them first forever.
//!
//! A location's failure, including a panic inside an adapter, is recorded in
//! its outcome and never reaches the other locations or the caller.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use adspace_core::{
    CandidateLocation, CandidateSelector, DirectoryClient, LocationStore, TrafficEstimate,
};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::{EnrichmentError, ItemError};
use crate::scorer::{score_unmatched, TrafficSignals};
use crate::types::{EnrichmentOptions, EnrichmentRunReport, LocationOutcome};

pub const CANCELLED_MESSAGE: &str = "run cancelled";

/// Run one enrichment pass over the locations chosen by `selector`.
///
/// # Errors
///
/// Returns [`EnrichmentError::Configuration`] for unusable options and
/// [`EnrichmentError::Candidates`] if the candidate list cannot be loaded.
/// Per-location failures never surface here; they are counted in the report.
pub async fn run_enrichment<L, D>(
    store: &L,
    directory: &D,
    selector: &CandidateSelector,
    options: &EnrichmentOptions,
    cancel: &CancellationToken,
) -> Result<EnrichmentRunReport, EnrichmentError>
where
    L: LocationStore + ?Sized,
    D: DirectoryClient + ?Sized,
{
    validate_options(options)?;

    let candidates = bounded(options.call_timeout, store.list_candidates(selector))
        .await
        .map_err(EnrichmentError::Candidates)?;

    tracing::info!(
        candidates = candidates.len(),
        force = options.force,
        max_concurrency = options.max_concurrency,
        "starting traffic enrichment run"
    );

    let total = candidates.len();
    let results: Vec<LocationOutcome> = stream::iter(0..total)
        .map(|index| {
            let candidate = &candidates[index];
            // A worker slot freed at or past this point has nothing left to start.
            let paced = index + options.max_concurrency < total;
            process_location(store, directory, candidate, options, paced, cancel)
        })
        .buffered(options.max_concurrency)
        .collect()
        .await;

    let report = EnrichmentRunReport::from_outcomes(results);

    tracing::info!(
        total = report.total,
        successful = report.successful,
        failed = report.failed,
        skipped = report.skipped,
        cancelled = report.cancelled,
        "traffic enrichment run complete"
    );

    Ok(report)
}

fn validate_options(options: &EnrichmentOptions) -> Result<(), EnrichmentError> {
    if options.max_concurrency == 0 {
        return Err(EnrichmentError::Configuration(
            "max_concurrency must be at least 1".to_string(),
        ));
    }
    if options.call_timeout.is_zero() {
        return Err(EnrichmentError::Configuration(
            "call_timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Decide, run, and record a single location. Always yields an outcome.
async fn process_location<L, D>(
    store: &L,
    directory: &D,
    candidate: &CandidateLocation,
    options: &EnrichmentOptions,
    paced: bool,
    cancel: &CancellationToken,
) -> LocationOutcome
where
    L: LocationStore + ?Sized,
    D: DirectoryClient + ?Sized,
{
    if cancel.is_cancelled() {
        return LocationOutcome::skipped(candidate, Some(CANCELLED_MESSAGE));
    }

    if !options.force
        && candidate
            .current_estimate
            .as_ref()
            .is_some_and(TrafficEstimate::is_known)
    {
        tracing::debug!(location_id = %candidate.id, "traffic data already present; skipping");
        return LocationOutcome::skipped(candidate, None);
    }

    let attempt = AssertUnwindSafe(enrich_location(store, directory, candidate, options))
        .catch_unwind()
        .await;

    let outcome = match attempt {
        Ok(Ok(estimate)) => {
            tracing::info!(
                location_id = %candidate.id,
                classification = %estimate.classification,
                nearby_place_count = estimate.nearby_place_count,
                "traffic data updated"
            );
            LocationOutcome::success(candidate, estimate.classification)
        }
        Ok(Err(e)) => {
            tracing::warn!(location_id = %candidate.id, error = %e, "traffic enrichment failed");
            record_attempt(store, candidate, options).await;
            LocationOutcome::failed(candidate, e.to_string())
        }
        Err(_) => {
            tracing::error!(location_id = %candidate.id, "traffic enrichment panicked");
            record_attempt(store, candidate, options).await;
            LocationOutcome::failed(candidate, "location processing panicked")
        }
    };

    if paced {
        pace(options.inter_item_delay, cancel).await;
    }
    outcome
}

/// Best effort: a failed stamp only affects future candidate ordering.
async fn record_attempt<L>(store: &L, candidate: &CandidateLocation, options: &EnrichmentOptions)
where
    L: LocationStore + ?Sized,
{
    if let Err(e) = bounded(
        options.call_timeout,
        store.record_attempt(candidate.id, Utc::now()),
    )
    .await
    {
        tracing::warn!(location_id = %candidate.id, error = %e, "could not record enrichment attempt");
    }
}

async fn enrich_location<L, D>(
    store: &L,
    directory: &D,
    candidate: &CandidateLocation,
    options: &EnrichmentOptions,
) -> Result<TrafficEstimate, ItemError>
where
    L: LocationStore + ?Sized,
    D: DirectoryClient + ?Sized,
{
    let search = bounded(
        options.call_timeout,
        directory.nearby_search(
            candidate.latitude,
            candidate.longitude,
            options.search_radius_m,
        ),
    )
    .await
    .map_err(ItemError::NearbySearch)?;

    let nearby_place_count = u32::try_from(search.places.len()).unwrap_or(u32::MAX);

    let estimate = match search.places.first() {
        None => score_unmatched(nearby_place_count, Utc::now()),
        Some(top) => {
            let signals = match bounded(
                options.call_timeout,
                directory.place_details(&top.place_id),
            )
            .await
            {
                Ok(details) => TrafficSignals {
                    review_count: details.review_count,
                    place_categories: details.category_tags,
                    nearby_place_count,
                },
                Err(e) => {
                    tracing::warn!(
                        location_id = %candidate.id,
                        place_id = %top.place_id,
                        error = %e,
                        "place details unavailable; scoring on density only"
                    );
                    TrafficSignals {
                        nearby_place_count,
                        ..TrafficSignals::default()
                    }
                }
            };
            options.scoring.score(&signals, Utc::now())
        }
    };

    if !estimate.is_known() {
        return Err(ItemError::InvalidTrafficData);
    }

    bounded(
        options.call_timeout,
        store.write_estimate(candidate.id, &estimate),
    )
    .await
    .map_err(ItemError::Persist)?;

    Ok(estimate)
}

/// Await `fut` for at most `limit`, flattening both failure modes to a message.
async fn bounded<T, E, F>(limit: Duration, fut: F) -> Result<T, String>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
    }
}

/// Inter-item pause that wakes early on cancellation.
async fn pace(delay: Duration, cancel: &CancellationToken) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => {}
        () = cancel.cancelled() => {}
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;

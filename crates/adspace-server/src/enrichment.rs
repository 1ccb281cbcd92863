//! Shared entry point for HTTP- and cron-triggered enrichment runs.
//!
//! At most one run executes per process; a second trigger while one is in
//! flight is refused rather than queued.

use adspace_core::CandidateSelector;
use adspace_db::PgLocationStore;
use adspace_places::{PlacesClient, PlacesError};
use adspace_traffic::{run_enrichment, EnrichmentError, EnrichmentOptions, EnrichmentRunReport};
use thiserror::Error;

use crate::api::AppState;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("an enrichment run is already in progress")]
    Busy,

    #[error(transparent)]
    Places(#[from] PlacesError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

/// Run one enrichment pass with the process-wide guard held.
///
/// The run stops starting new locations once the server begins shutting down.
///
/// # Errors
///
/// - [`RunError::Busy`] if another run holds the guard.
/// - [`RunError::Places`] if the Places client cannot be configured, most
///   commonly because no API key is set.
/// - [`RunError::Enrichment`] for run-level failures.
pub async fn run_guarded(
    state: &AppState,
    selector: &CandidateSelector,
    force: bool,
) -> Result<EnrichmentRunReport, RunError> {
    let Ok(_guard) = state.enrichment_guard.try_lock() else {
        return Err(RunError::Busy);
    };

    let places = PlacesClient::from_app_config(&state.config)?;
    let store = PgLocationStore::new(state.pool.clone());
    let options = EnrichmentOptions::from_app_config(&state.config, force);
    let cancel = state.shutdown.child_token();

    Ok(run_enrichment(&store, &places, selector, &options, &cancel).await?)
}

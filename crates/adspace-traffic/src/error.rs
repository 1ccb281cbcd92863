use thiserror::Error;

/// Run-level failures. Everything that happens to a single location is
/// reported in the run report instead.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("enrichment configuration error: {0}")]
    Configuration(String),

    #[error("failed to load enrichment candidates: {0}")]
    Candidates(String),
}

/// Failure of a single location, rendered into its outcome message.
#[derive(Debug, Error)]
pub(crate) enum ItemError {
    #[error("nearby search failed: {0}")]
    NearbySearch(String),

    #[error("invalid traffic data received")]
    InvalidTrafficData,

    #[error("failed to save traffic data: {0}")]
    Persist(String),
}

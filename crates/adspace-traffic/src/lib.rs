//! Foot-traffic enrichment for advertising locations.
//!
//! Looks up points of interest around each location through a
//! [`adspace_core::DirectoryClient`], turns the signals into a
//! [`adspace_core::TrafficEstimate`] with a fixed heuristic, and writes the
//! estimate back through a [`adspace_core::LocationStore`].

pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod types;

pub use error::EnrichmentError;
pub use pipeline::{run_enrichment, CANCELLED_MESSAGE};
pub use scorer::{peak_hours, score, score_unmatched, weekly_pattern, ScoringParams, TrafficSignals};
pub use types::{
    EnrichmentOptions, EnrichmentRunReport, LocationOutcome, OutcomeStatus, DEFAULT_BATCH_LIMIT,
    DEFAULT_CALL_TIMEOUT, DEFAULT_INTER_ITEM_DELAY, DEFAULT_SEARCH_RADIUS_M,
};

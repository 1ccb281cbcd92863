//! Shared configuration, traffic domain types, and collaborator ports for
//! the adspace enrichment workspace.

mod app_config;
mod config;
pub mod ports;
pub mod traffic;

pub use app_config::{
    places_backoff_ms, AppConfig, Environment, PLACES_BACKOFF_JITTER, PLACES_MAX_BACKOFF_MS,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use ports::{
    CandidateLocation, CandidateSelector, DirectoryClient, DirectoryError, LocationId,
    LocationStore, LocationStoreError, NearbySearch, NearbyStatus, PlaceDetails, PlaceRef,
};
pub use traffic::{PeakHour, TrafficEstimate, TrafficLevel, WeeklyPattern};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

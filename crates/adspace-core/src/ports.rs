//! Collaborator ports consumed by the enrichment orchestrator.
//!
//! Concrete adapters live in `adspace-db` (Postgres) and `adspace-places`
//! (Google Places); tests substitute in-memory fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::traffic::TrafficEstimate;

pub type LocationId = Uuid;

/// Which locations an enrichment run should consider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSelector {
    /// Exactly these locations (those without coordinates are ignored).
    Ids(Vec<LocationId>),
    /// Up to this many located rows.
    Limit(usize),
}

/// A location eligible for enrichment: coordinates are always present.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLocation {
    pub id: LocationId,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub current_estimate: Option<TrafficEstimate>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationStoreError {
    #[error("location store connection failed: {0}")]
    Connection(String),
    #[error("location store query failed: {0}")]
    Query(String),
    #[error("location {0} not found")]
    NotFound(LocationId),
}

/// Read candidates and write back traffic estimates, one row at a time.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// For [`CandidateSelector::Limit`], rows attempted least recently come
    /// first, so persistently failing rows do not starve the rest.
    async fn list_candidates(
        &self,
        selector: &CandidateSelector,
    ) -> Result<Vec<CandidateLocation>, LocationStoreError>;

    /// Replace the stored estimate. Also counts as an attempt.
    async fn write_estimate(
        &self,
        id: LocationId,
        estimate: &TrafficEstimate,
    ) -> Result<(), LocationStoreError>;

    /// Note a failed attempt without touching the stored estimate.
    async fn record_attempt(
        &self,
        id: LocationId,
        attempted_at: DateTime<Utc>,
    ) -> Result<(), LocationStoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearbyStatus {
    Ok,
    ZeroResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRef {
    pub place_id: String,
    pub name: Option<String>,
}

/// Result of a nearby search. Results are ordered by relevance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbySearch {
    pub status: NearbyStatus,
    pub places: Vec<PlaceRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaceDetails {
    pub review_count: u64,
    pub category_tags: BTreeSet<String>,
    pub opening_hours_present: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Request(String),
    #[error("directory returned status {status}: {message}")]
    Status { status: String, message: String },
    #[error("directory response could not be decoded: {0}")]
    Decode(String),
}

/// Points-of-interest directory lookups.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn nearby_search(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<NearbySearch, DirectoryError>;

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, DirectoryError>;
}

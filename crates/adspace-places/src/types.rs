//! Google Places web-service response shapes.
//!
//! Only the fields the scorer consumes are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// nearbysearch/json
// ---------------------------------------------------------------------------

/// `{ "status": "OK", "results": [ ... ] }`
#[derive(Debug, Deserialize)]
pub(crate) struct NearbySearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearbyResult {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// details/json
// ---------------------------------------------------------------------------

/// `{ "status": "OK", "result": { ... } }`
#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceResult>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlaceResult {
    #[serde(default)]
    pub user_ratings_total: Option<u64>,
    #[serde(default)]
    pub types: Vec<String>,
    /// Shape varies by place; only presence matters.
    #[serde(default)]
    pub opening_hours: Option<serde_json::Value>,
}

//! HTTP client for the Google Places web service.
//!
//! Wraps `reqwest` with Places-specific error handling, API key management,
//! and typed response deserialization. Every endpoint checks the `"status"`
//! field of the JSON envelope and surfaces unexpected values as
//! [`PlacesError::ApiStatus`].

use std::time::Duration;

use adspace_core::{
    AppConfig, DirectoryClient, DirectoryError, NearbySearch, NearbyStatus, PlaceDetails,
    PlaceRef,
};
use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailsResponse, NearbySearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/";

/// Fields requested from the details endpoint.
pub const DETAIL_FIELDS: &str = "user_ratings_total,types,opening_hours";

const NEARBY_PATH: &str = "nearbysearch/json";
const DETAILS_PATH: &str = "details/json";

/// Client for the Google Places web service.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    nearby_url: Url,
    details_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("api_key", &"[redacted]")
            .field("nearby_url", &self.nearby_url.as_str())
            .field("details_url", &self.details_url.as_str())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Creates a new client pointed at the production Places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::MissingApiKey`] for a blank key, or
    /// [`PlacesError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::MissingApiKey`] for a blank key,
    /// [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`PlacesError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        if api_key.trim().is_empty() {
            return Err(PlacesError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adspace/0.1 (traffic-enrichment)")
            .build()?;

        // Exactly one trailing slash, so `join` appends rather than replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, &e))?;
        let nearby_url = base
            .join(NEARBY_PATH)
            .map_err(|e| invalid_base_url(base_url, &e))?;
        let details_url = base
            .join(DETAILS_PATH)
            .map_err(|e| invalid_base_url(base_url, &e))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            nearby_url,
            details_url,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Builds a client from application config, including retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::MissingApiKey`] when `GOOGLE_PLACES_API_KEY`
    /// was not set, otherwise the errors of [`PlacesClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let api_key = config
            .places_api_key
            .as_deref()
            .ok_or(PlacesError::MissingApiKey)?;
        Ok(
            Self::with_base_url(api_key, config.places_timeout_secs, &config.places_base_url)?
                .with_retry(config.places_max_retries, config.places_retry_backoff_base_ms),
        )
    }

    /// Retry transient failures up to `max_retries` extra times.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Points of interest within `radius_m` metres, most relevant first.
    ///
    /// `ZERO_RESULTS` is a normal answer, returned with an empty place list.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiStatus`] for any other non-`OK` status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn search_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<NearbySearch, PlacesError> {
        let location = format!("{latitude},{longitude}");
        let radius = radius_m.to_string();
        let url = self.build_url(
            &self.nearby_url,
            &[("location", &location), ("radius", &radius)],
        );

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_checked(&url, &["OK", "ZERO_RESULTS"])
        })
        .await?;

        let envelope: NearbySearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("nearbysearch(location={location})"),
                source: e,
            })?;

        let status = if envelope.status == "ZERO_RESULTS" {
            NearbyStatus::ZeroResults
        } else {
            NearbyStatus::Ok
        };
        let places = envelope
            .results
            .into_iter()
            .map(|r| PlaceRef {
                place_id: r.place_id,
                name: r.name,
            })
            .collect();

        Ok(NearbySearch { status, places })
    }

    /// Review count, category tags and opening-hours presence for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::ApiStatus`] for any non-`OK` status, e.g. `NOT_FOUND`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = self.build_url(
            &self.details_url,
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        );

        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.fetch_checked(&url, &["OK"])
        })
        .await?;

        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        let result = envelope.result.unwrap_or_default();
        Ok(PlaceDetails {
            review_count: result.user_ratings_total.unwrap_or(0),
            category_tags: result.types.into_iter().collect(),
            opening_hours_present: result.opening_hours.is_some(),
        })
    }

    /// Clones `endpoint` and appends the caller's parameters followed by the key.
    fn build_url(&self, endpoint: &Url, extra: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    async fn fetch_checked(
        &self,
        url: &Url,
        accepted: &[&str],
    ) -> Result<serde_json::Value, PlacesError> {
        let body = self.request_json(url).await?;
        Self::check_status(&body, accepted)?;
        Ok(body)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the response
    /// body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_owned(),
            source: e,
        })
    }

    /// Rejects any envelope whose `"status"` is not in `accepted`.
    fn check_status(body: &serde_json::Value, accepted: &[&str]) -> Result<(), PlacesError> {
        let status = body
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("MISSING_STATUS");
        if accepted.contains(&status) {
            return Ok(());
        }
        let message = body
            .get("error_message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no error message")
            .to_string();
        Err(PlacesError::ApiStatus {
            status: status.to_string(),
            message,
        })
    }
}

fn invalid_base_url(url: &str, reason: &dyn std::fmt::Display) -> PlacesError {
    PlacesError::InvalidBaseUrl {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl DirectoryClient for PlacesClient {
    async fn nearby_search(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<NearbySearch, DirectoryError> {
        Ok(self.search_nearby(latitude, longitude, radius_m).await?)
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, DirectoryError> {
        Ok(self.get_place_details(place_id).await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

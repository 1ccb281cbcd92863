use adspace_core::{CandidateSelector, TrafficEstimate};
use adspace_traffic::{EnrichmentError, EnrichmentRunReport};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enrichment::{run_guarded, RunError};
use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Upper bound on `limit` for a single HTTP-triggered run.
pub(super) const MAX_ENRICH_LIMIT: usize = 500;

/// Body of `POST /api/v1/locations/traffic/enrich`. Send `{}` for defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct EnrichRequest {
    #[serde(default)]
    pub location_ids: Vec<Uuid>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub force: bool,
}

impl EnrichRequest {
    /// Candidate selector for this request, or a validation message.
    pub(super) fn selector(&self, default_limit: usize) -> Result<CandidateSelector, String> {
        if !self.location_ids.is_empty() {
            if self.limit.is_some() {
                return Err("location_ids and limit are mutually exclusive".to_string());
            }
            if self.location_ids.len() > MAX_ENRICH_LIMIT {
                return Err(format!(
                    "at most {MAX_ENRICH_LIMIT} location_ids may be enriched per request"
                ));
            }
            return Ok(CandidateSelector::Ids(self.location_ids.clone()));
        }
        match self.limit {
            Some(0) => Err("limit must be at least 1".to_string()),
            Some(limit) if limit > MAX_ENRICH_LIMIT => {
                Err(format!("limit must be at most {MAX_ENRICH_LIMIT}"))
            }
            Some(limit) => Ok(CandidateSelector::Limit(limit)),
            None => Ok(CandidateSelector::Limit(default_limit)),
        }
    }
}

pub(super) async fn enrich_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<ApiResponse<EnrichmentRunReport>>, ApiError> {
    let selector = request
        .selector(state.config.enrich_batch_limit)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let report = run_guarded(&state, &selector, request.force)
        .await
        .map_err(|e| map_run_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_run_error(request_id: String, error: &RunError) -> ApiError {
    match error {
        RunError::Busy => ApiError::new(request_id, "conflict", error.to_string()),
        RunError::Places(e) => {
            tracing::error!(error = %e, "traffic enrichment: directory client unavailable");
            ApiError::new(request_id, "configuration_error", e.to_string())
        }
        RunError::Enrichment(EnrichmentError::Configuration(message)) => {
            tracing::error!(error = %message, "traffic enrichment: invalid options");
            ApiError::new(request_id, "configuration_error", error.to_string())
        }
        RunError::Enrichment(e @ EnrichmentError::Candidates(_)) => {
            tracing::error!(error = %e, "traffic enrichment: candidate load failed");
            ApiError::new(request_id, "internal_error", "failed to load enrichment candidates")
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LocationTrafficItem {
    pub location_id: Uuid,
    pub title: String,
    pub traffic_updated_at: Option<DateTime<Utc>>,
    pub traffic_attempted_at: Option<DateTime<Utc>>,
    pub traffic: Option<TrafficEstimate>,
}

pub(super) async fn get_location_traffic(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LocationTrafficItem>>, ApiError> {
    let row = adspace_db::get_location(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &adspace_db::DbError::from(e)))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("location {id} not found"),
            )
        })?;

    let traffic = row.traffic_estimate();
    Ok(Json(ApiResponse {
        data: LocationTrafficItem {
            location_id: row.id,
            title: row.title,
            traffic_updated_at: row.traffic_updated_at,
            traffic_attempted_at: row.traffic_attempted_at,
            traffic,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

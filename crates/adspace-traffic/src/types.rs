use std::time::Duration;

use adspace_core::{AppConfig, CandidateLocation, LocationId, TrafficLevel};
use serde::Serialize;

use crate::pipeline::CANCELLED_MESSAGE;
use crate::scorer::ScoringParams;

pub const DEFAULT_BATCH_LIMIT: usize = 10;
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 500;
pub const DEFAULT_INTER_ITEM_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(45);

/// Knobs for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichmentOptions {
    /// Re-enrich locations that already carry a known estimate.
    pub force: bool,
    pub search_radius_m: u32,
    /// Pause after each processed location, per worker.
    pub inter_item_delay: Duration,
    /// Ceiling on locations in flight at once.
    pub max_concurrency: usize,
    /// Upper bound on every directory and store call. A directory call
    /// includes the client's own retries, so this must exceed
    /// [`AppConfig::directory_call_budget`].
    pub call_timeout: Duration,
    pub scoring: ScoringParams,
}

impl Default for EnrichmentOptions {
    fn default() -> Self {
        Self {
            force: false,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            inter_item_delay: DEFAULT_INTER_ITEM_DELAY,
            max_concurrency: 1,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            scoring: ScoringParams::default(),
        }
    }
}

impl EnrichmentOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, force: bool) -> Self {
        Self {
            force,
            search_radius_m: config.enrich_search_radius_m,
            inter_item_delay: Duration::from_millis(config.enrich_inter_item_delay_ms),
            max_concurrency: config.enrich_max_concurrency,
            call_timeout: Duration::from_secs(config.enrich_call_timeout_secs),
            scoring: ScoringParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Skipped,
}

/// What happened to one location during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationOutcome {
    pub location_id: LocationId,
    pub title: String,
    pub status: OutcomeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Newly persisted classification, set on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<TrafficLevel>,
}

impl LocationOutcome {
    pub(crate) fn success(location: &CandidateLocation, classification: TrafficLevel) -> Self {
        Self {
            location_id: location.id,
            title: location.title.clone(),
            status: OutcomeStatus::Success,
            error_message: None,
            classification: Some(classification),
        }
    }

    pub(crate) fn failed(location: &CandidateLocation, message: impl Into<String>) -> Self {
        Self {
            location_id: location.id,
            title: location.title.clone(),
            status: OutcomeStatus::Failed,
            error_message: Some(message.into()),
            classification: None,
        }
    }

    /// Skipped because the run was cancelled before it started.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == OutcomeStatus::Skipped
            && self.error_message.as_deref() == Some(CANCELLED_MESSAGE)
    }

    pub(crate) fn skipped(location: &CandidateLocation, reason: Option<&str>) -> Self {
        Self {
            location_id: location.id,
            title: location.title.clone(),
            status: OutcomeStatus::Skipped,
            error_message: reason.map(str::to_string),
            classification: None,
        }
    }
}

/// Totals plus per-location outcomes for one run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentRunReport {
    pub total: usize,
    /// `successful + failed`.
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
    /// At least one location was skipped because the run was cancelled.
    pub cancelled: bool,
    pub results: Vec<LocationOutcome>,
}

impl EnrichmentRunReport {
    #[must_use]
    pub fn from_outcomes(results: Vec<LocationOutcome>) -> Self {
        let count = |status: OutcomeStatus| results.iter().filter(|r| r.status == status).count();
        let successful = count(OutcomeStatus::Success);
        let failed = count(OutcomeStatus::Failed);
        let skipped = count(OutcomeStatus::Skipped);
        let cancelled = results.iter().any(LocationOutcome::is_cancelled);

        Self {
            total: results.len(),
            processed: successful + failed,
            successful,
            failed,
            skipped,
            cancelled,
            results,
        }
    }

    /// Outcomes with a given status, in candidate order.
    pub fn with_status(&self, status: OutcomeStatus) -> impl Iterator<Item = &LocationOutcome> {
        self.results.iter().filter(move |r| r.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn candidate(title: &str) -> CandidateLocation {
        CandidateLocation {
            id: Uuid::new_v4(),
            title: title.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            current_estimate: None,
        }
    }

    #[test]
    fn report_totals_partition_outcomes() {
        let report = EnrichmentRunReport::from_outcomes(
            vec![
                LocationOutcome::success(&candidate("a"), TrafficLevel::High),
                LocationOutcome::failed(&candidate("b"), "boom"),
                LocationOutcome::skipped(&candidate("c"), None),
                LocationOutcome::failed(&candidate("d"), "boom"),
            ],
        );
        assert_eq!(report.total, 4);
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.processed, 3);
        assert_eq!(report.with_status(OutcomeStatus::Failed).count(), 2);
        assert!(!report.cancelled);
    }

    #[test]
    fn cancelled_only_when_a_location_was_skipped_for_it() {
        let report = EnrichmentRunReport::from_outcomes(vec![
            LocationOutcome::success(&candidate("a"), TrafficLevel::Low),
            LocationOutcome::skipped(&candidate("b"), Some(CANCELLED_MESSAGE)),
        ]);
        assert!(report.cancelled);

        let report = EnrichmentRunReport::from_outcomes(vec![
            LocationOutcome::success(&candidate("a"), TrafficLevel::Low),
            LocationOutcome::skipped(&candidate("b"), None),
        ]);
        assert!(!report.cancelled);
    }

    #[test]
    fn empty_report_is_all_zero() {
        let report = EnrichmentRunReport::from_outcomes(Vec::new());
        assert_eq!(report.total, 0);
        assert_eq!(report.processed, 0);
    }

    #[test]
    fn report_serializes_statuses_in_snake_case() {
        let report = EnrichmentRunReport::from_outcomes(
            vec![LocationOutcome::failed(&candidate("x"), "nope")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["results"][0]["status"], "failed");
        assert_eq!(json["results"][0]["error_message"], "nope");
        assert!(json["results"][0].get("classification").is_none());
    }
}

//! Row types for the `locations` table.

use adspace_core::{CandidateLocation, TrafficEstimate};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Input record for inserting a location.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub title: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A full row from the `locations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub title: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub traffic_data: Option<serde_json::Value>,
    pub traffic_updated_at: Option<DateTime<Utc>>,
    pub traffic_attempted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocationRow {
    /// The stored estimate, or `None` when absent or unreadable.
    #[must_use]
    pub fn traffic_estimate(&self) -> Option<TrafficEstimate> {
        decode_estimate(self.id, self.traffic_data.as_ref())
    }
}

/// A located row as read for an enrichment run.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub title: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub traffic_data: Option<serde_json::Value>,
}

impl CandidateRow {
    /// Convert to the port type. `None` if a coordinate does not fit an `f64`.
    #[must_use]
    pub fn into_candidate(self) -> Option<CandidateLocation> {
        let current_estimate = decode_estimate(self.id, self.traffic_data.as_ref());
        Some(CandidateLocation {
            id: self.id,
            title: self.title,
            latitude: self.latitude.to_f64()?,
            longitude: self.longitude.to_f64()?,
            current_estimate,
        })
    }
}

/// A `traffic_data` value that no longer matches the estimate shape is
/// treated as missing, so the next run re-enriches the row.
fn decode_estimate(id: Uuid, raw: Option<&serde_json::Value>) -> Option<TrafficEstimate> {
    let raw = raw?;
    match serde_json::from_value(raw.clone()) {
        Ok(estimate) => Some(estimate),
        Err(e) => {
            tracing::warn!(location_id = %id, error = %e, "unreadable traffic_data; ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspace_core::TrafficLevel;
    use std::str::FromStr;

    fn candidate_row(traffic_data: Option<serde_json::Value>) -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            title: "Fifth Ave Digital".to_string(),
            latitude: Decimal::from_str("40.758896").unwrap(),
            longitude: Decimal::from_str("-73.985130").unwrap(),
            traffic_data,
        }
    }

    #[test]
    fn candidate_coordinates_convert_to_f64() {
        let candidate = candidate_row(None).into_candidate().unwrap();
        assert!((candidate.latitude - 40.758_896).abs() < 1e-9);
        assert!((candidate.longitude + 73.985_13).abs() < 1e-9);
        assert!(candidate.current_estimate.is_none());
    }

    #[test]
    fn stored_estimate_is_decoded() {
        let estimate = TrafficEstimate::unknown(3, Utc::now());
        let json = serde_json::to_value(&estimate).unwrap();
        let candidate = candidate_row(Some(json)).into_candidate().unwrap();
        let decoded = candidate.current_estimate.unwrap();
        assert_eq!(decoded.classification, TrafficLevel::Unknown);
        assert_eq!(decoded.nearby_place_count, 3);
    }

    #[test]
    fn malformed_estimate_is_treated_as_missing() {
        let candidate = candidate_row(Some(serde_json::json!({ "traffic": "lots" })))
            .into_candidate()
            .unwrap();
        assert!(candidate.current_estimate.is_none());
    }
}

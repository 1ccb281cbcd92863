//! Traffic estimate value types shared by the scoring engine, the
//! orchestrator, and the storage adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordinal footfall classification.
///
/// `Unknown` means the estimate was never computed or the last computation
/// failed; it sits outside the `Low..VeryHigh` ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    #[default]
    Unknown,
}

impl TrafficLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficLevel::Low => "low",
            TrafficLevel::Moderate => "moderate",
            TrafficLevel::High => "high",
            TrafficLevel::VeryHigh => "very_high",
            TrafficLevel::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        self != TrafficLevel::Unknown
    }
}

impl std::fmt::Display for TrafficLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an intraday peak profile. Hours not listed are implicitly low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakHour {
    /// Hour of day, `0..=23`.
    pub hour: u8,
    pub level: TrafficLevel,
}

/// Per-weekday traffic levels. Always complete: every day carries a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPattern {
    pub monday: TrafficLevel,
    pub tuesday: TrafficLevel,
    pub wednesday: TrafficLevel,
    pub thursday: TrafficLevel,
    pub friday: TrafficLevel,
    pub saturday: TrafficLevel,
    pub sunday: TrafficLevel,
}

impl WeeklyPattern {
    /// Pattern with the same level on every day.
    #[must_use]
    pub fn uniform(level: TrafficLevel) -> Self {
        Self {
            monday: level,
            tuesday: level,
            wednesday: level,
            thursday: level,
            friday: level,
            saturday: level,
            sunday: level,
        }
    }

    /// Level for a given weekday.
    #[must_use]
    pub fn level_for(&self, day: chrono::Weekday) -> TrafficLevel {
        match day {
            chrono::Weekday::Mon => self.monday,
            chrono::Weekday::Tue => self.tuesday,
            chrono::Weekday::Wed => self.wednesday,
            chrono::Weekday::Thu => self.thursday,
            chrono::Weekday::Fri => self.friday,
            chrono::Weekday::Sat => self.saturday,
            chrono::Weekday::Sun => self.sunday,
        }
    }
}

/// Computed footfall estimate for one advertising location.
///
/// Replaced wholesale on every enrichment; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficEstimate {
    pub classification: TrafficLevel,
    /// Only present when the matched place reported reviews.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_daily_visitors: Option<u64>,
    /// Sorted by hour, no duplicates.
    #[serde(default)]
    pub peak_hours: Vec<PeakHour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_pattern: Option<WeeklyPattern>,
    pub computed_at: DateTime<Utc>,
    pub nearby_place_count: u32,
}

impl TrafficEstimate {
    /// Estimate for a location where no point of interest could be matched.
    #[must_use]
    pub fn unknown(nearby_place_count: u32, computed_at: DateTime<Utc>) -> Self {
        Self {
            classification: TrafficLevel::Unknown,
            average_daily_visitors: None,
            peak_hours: Vec::new(),
            weekly_pattern: None,
            computed_at,
            nearby_place_count,
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        self.classification.is_known()
    }

    /// Level at `hour`, defaulting to low for hours outside the profile.
    #[must_use]
    pub fn level_at_hour(&self, hour: u8) -> TrafficLevel {
        if !self.is_known() {
            return TrafficLevel::Unknown;
        }
        self.peak_hours
            .iter()
            .find(|p| p.hour == hour)
            .map_or(TrafficLevel::Low, |p| p.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_serializes_as_snake_case() {
        let json = serde_json::to_string(&TrafficLevel::VeryHigh).unwrap();
        assert_eq!(json, "\"very_high\"");
        let back: TrafficLevel = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(back, TrafficLevel::Moderate);
    }

    #[test]
    fn unknown_estimate_has_no_profile() {
        let est = TrafficEstimate::unknown(3, Utc::now());
        assert!(!est.is_known());
        assert!(est.average_daily_visitors.is_none());
        assert!(est.peak_hours.is_empty());
        assert!(est.weekly_pattern.is_none());
        assert_eq!(est.nearby_place_count, 3);
        assert_eq!(est.level_at_hour(12), TrafficLevel::Unknown);
    }

    #[test]
    fn hours_outside_profile_are_low() {
        let est = TrafficEstimate {
            classification: TrafficLevel::High,
            average_daily_visitors: Some(10),
            peak_hours: vec![PeakHour {
                hour: 12,
                level: TrafficLevel::VeryHigh,
            }],
            weekly_pattern: Some(WeeklyPattern::uniform(TrafficLevel::Moderate)),
            computed_at: Utc::now(),
            nearby_place_count: 4,
        };
        assert_eq!(est.level_at_hour(12), TrafficLevel::VeryHigh);
        assert_eq!(est.level_at_hour(3), TrafficLevel::Low);
    }

    #[test]
    fn estimate_round_trips_through_stored_json() {
        let stored = serde_json::json!({
            "classification": "high",
            "average_daily_visitors": 12,
            "peak_hours": [{ "hour": 9, "level": "high" }],
            "weekly_pattern": {
                "monday": "moderate", "tuesday": "moderate", "wednesday": "moderate",
                "thursday": "moderate", "friday": "high", "saturday": "very_high",
                "sunday": "very_high"
            },
            "computed_at": "2026-01-05T10:00:00Z",
            "nearby_place_count": 14
        });
        let est: TrafficEstimate = serde_json::from_value(stored).unwrap();
        assert_eq!(est.classification, TrafficLevel::High);
        let pattern = est.weekly_pattern.unwrap();
        assert_eq!(
            pattern.level_for(chrono::Weekday::Sat),
            TrafficLevel::VeryHigh
        );
    }
}

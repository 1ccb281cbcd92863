//! Footfall heuristics: raw point-of-interest signals in, traffic estimate out.
//!
//! Everything here is pure. The thresholds and the visitor ratio are product
//! heuristics with no published derivation; they are kept as named constants
//! and gathered into [`ScoringParams`] so callers can override them without
//! touching the algorithm.

use std::collections::BTreeSet;

use adspace_core::{PeakHour, TrafficEstimate, TrafficLevel, WeeklyPattern};
use chrono::{DateTime, Utc};

/// Review-count tiers as `(exclusive lower bound, points)`, highest first.
pub const REVIEW_TIERS: [(u64, u32); 3] = [(1000, 3), (500, 2), (100, 1)];

/// Nearby-place density tiers as `(exclusive lower bound, points)`, highest first.
pub const NEARBY_TIERS: [(u32, u32); 2] = [(20, 2), (10, 1)];

/// Place categories that mark a location as a footfall generator.
pub const HIGH_TRAFFIC_CATEGORIES: &[&str] = &[
    "mall",
    "transit_station",
    "airport",
    "train_station",
    "subway_station",
    "bus_station",
    "restaurant",
    "cafe",
    "store",
];

pub const HIGH_TRAFFIC_CATEGORY_POINTS: u32 = 2;

pub const VERY_HIGH_MIN_SCORE: u32 = 6;
pub const HIGH_MIN_SCORE: u32 = 4;
pub const MODERATE_MIN_SCORE: u32 = 2;

/// Roughly one review per fifty daily visitors.
pub const DAILY_VISITORS_PER_REVIEW: f64 = 0.02;

const TRANSIT_KEYWORDS: &[&str] = &["transit", "station", "airport"];
const RETAIL_KEYWORDS: &[&str] = &["mall", "store", "shopping"];
const DINING_KEYWORDS: &[&str] = &["restaurant", "cafe", "food"];
const OFFICE_KEYWORDS: &[&str] = &["office", "business"];

/// Raw signals gathered for one location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrafficSignals {
    /// Review count of the matched point of interest.
    pub review_count: u64,
    /// Category tags of the matched point of interest.
    pub place_categories: BTreeSet<String>,
    /// Points of interest found inside the search radius.
    pub nearby_place_count: u32,
}

/// Tunable scoring parameters. `Default` carries the documented values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringParams {
    pub review_tiers: [(u64, u32); 3],
    pub nearby_tiers: [(u32, u32); 2],
    pub high_traffic_categories: &'static [&'static str],
    pub high_traffic_category_points: u32,
    pub very_high_min_score: u32,
    pub high_min_score: u32,
    pub moderate_min_score: u32,
    pub daily_visitors_per_review: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            review_tiers: REVIEW_TIERS,
            nearby_tiers: NEARBY_TIERS,
            high_traffic_categories: HIGH_TRAFFIC_CATEGORIES,
            high_traffic_category_points: HIGH_TRAFFIC_CATEGORY_POINTS,
            very_high_min_score: VERY_HIGH_MIN_SCORE,
            high_min_score: HIGH_MIN_SCORE,
            moderate_min_score: MODERATE_MIN_SCORE,
            daily_visitors_per_review: DAILY_VISITORS_PER_REVIEW,
        }
    }
}

impl ScoringParams {
    /// Points contributed by the review count alone.
    #[must_use]
    pub fn review_points(&self, review_count: u64) -> u32 {
        self.review_tiers
            .iter()
            .find(|(floor, _)| review_count > *floor)
            .map_or(0, |(_, points)| *points)
    }

    /// Points contributed by nearby-place density alone.
    #[must_use]
    pub fn nearby_points(&self, nearby_place_count: u32) -> u32 {
        self.nearby_tiers
            .iter()
            .find(|(floor, _)| nearby_place_count > *floor)
            .map_or(0, |(_, points)| *points)
    }

    /// Points contributed by the category tags (exact set intersection).
    #[must_use]
    pub fn category_points(&self, categories: &BTreeSet<String>) -> u32 {
        let hit = self
            .high_traffic_categories
            .iter()
            .any(|c| categories.contains(*c));
        if hit {
            self.high_traffic_category_points
        } else {
            0
        }
    }

    /// Total integer score for a set of signals.
    #[must_use]
    pub fn raw_score(&self, signals: &TrafficSignals) -> u32 {
        self.review_points(signals.review_count)
            + self.category_points(&signals.place_categories)
            + self.nearby_points(signals.nearby_place_count)
    }

    /// Map a total score onto a classification. Never returns `Unknown`.
    #[must_use]
    pub fn classify(&self, score: u32) -> TrafficLevel {
        if score >= self.very_high_min_score {
            TrafficLevel::VeryHigh
        } else if score >= self.high_min_score {
            TrafficLevel::High
        } else if score >= self.moderate_min_score {
            TrafficLevel::Moderate
        } else {
            TrafficLevel::Low
        }
    }

    /// Conservative visitor estimate; `None` when there are no reviews.
    #[must_use]
    pub fn estimate_daily_visitors(&self, review_count: u64) -> Option<u64> {
        if review_count == 0 {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let visitors = (review_count as f64 * self.daily_visitors_per_review).round() as u64;
        Some(visitors)
    }

    /// Build a complete estimate for a matched point of interest.
    #[must_use]
    pub fn score(&self, signals: &TrafficSignals, computed_at: DateTime<Utc>) -> TrafficEstimate {
        let total = self.raw_score(signals);
        TrafficEstimate {
            classification: self.classify(total),
            average_daily_visitors: self.estimate_daily_visitors(signals.review_count),
            peak_hours: peak_hours(&signals.place_categories),
            weekly_pattern: Some(weekly_pattern(&signals.place_categories)),
            computed_at,
            nearby_place_count: signals.nearby_place_count,
        }
    }
}

/// Score `signals` with the default parameters.
#[must_use]
pub fn score(signals: &TrafficSignals, computed_at: DateTime<Utc>) -> TrafficEstimate {
    ScoringParams::default().score(signals, computed_at)
}

/// Estimate for a location where the search matched no point of interest.
#[must_use]
pub fn score_unmatched(nearby_place_count: u32, computed_at: DateTime<Utc>) -> TrafficEstimate {
    TrafficEstimate::unknown(nearby_place_count, computed_at)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceFamily {
    Transit,
    Retail,
    Dining,
    Office,
    General,
}

impl PlaceFamily {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            PlaceFamily::Transit => TRANSIT_KEYWORDS,
            PlaceFamily::Retail => RETAIL_KEYWORDS,
            PlaceFamily::Dining => DINING_KEYWORDS,
            PlaceFamily::Office => OFFICE_KEYWORDS,
            PlaceFamily::General => &[],
        }
    }

    fn matches(self, categories: &BTreeSet<String>) -> bool {
        let keywords = self.keywords();
        categories
            .iter()
            .any(|tag| keywords.iter().any(|kw| tag.contains(*kw)))
    }

    /// First family in `order` matching `categories`, else `General`.
    fn resolve(order: &[PlaceFamily], categories: &BTreeSet<String>) -> PlaceFamily {
        order
            .iter()
            .copied()
            .find(|family| family.matches(categories))
            .unwrap_or(PlaceFamily::General)
    }
}

const PEAK_ORDER: [PlaceFamily; 4] = [
    PlaceFamily::Transit,
    PlaceFamily::Retail,
    PlaceFamily::Dining,
    PlaceFamily::Office,
];

const WEEKLY_ORDER: [PlaceFamily; 3] = [
    PlaceFamily::Retail,
    PlaceFamily::Dining,
    PlaceFamily::Transit,
];

/// Intraday profile for the first matching category family.
#[must_use]
pub fn peak_hours(categories: &BTreeSet<String>) -> Vec<PeakHour> {
    use TrafficLevel::{High, Moderate, VeryHigh};

    let bands: &[(u8, u8, TrafficLevel)] = match PlaceFamily::resolve(&PEAK_ORDER, categories) {
        PlaceFamily::Transit => &[(7, 9, VeryHigh), (10, 16, High), (17, 19, VeryHigh)],
        PlaceFamily::Retail => &[(11, 20, High), (14, 18, VeryHigh)],
        PlaceFamily::Dining => &[(12, 14, VeryHigh), (19, 21, VeryHigh)],
        PlaceFamily::Office => &[(9, 17, High), (10, 15, VeryHigh)],
        PlaceFamily::General => &[(9, 18, Moderate)],
    };

    // Later bands overwrite earlier ones, which is how upgrades are expressed.
    let mut by_hour: [Option<TrafficLevel>; 24] = [None; 24];
    for &(first, last, level) in bands {
        for hour in first..=last {
            by_hour[usize::from(hour)] = Some(level);
        }
    }

    (0u8..24)
        .zip(by_hour)
        .filter_map(|(hour, level)| level.map(|level| PeakHour { hour, level }))
        .collect()
}

/// Weekly pattern for the first matching category family.
#[must_use]
pub fn weekly_pattern(categories: &BTreeSet<String>) -> WeeklyPattern {
    use TrafficLevel::{High, Low, Moderate, VeryHigh};

    match PlaceFamily::resolve(&WEEKLY_ORDER, categories) {
        PlaceFamily::Retail => WeeklyPattern {
            monday: Moderate,
            tuesday: Moderate,
            wednesday: Moderate,
            thursday: Moderate,
            friday: High,
            saturday: VeryHigh,
            sunday: VeryHigh,
        },
        PlaceFamily::Dining => WeeklyPattern {
            monday: Low,
            tuesday: Low,
            wednesday: Moderate,
            thursday: Moderate,
            friday: High,
            saturday: VeryHigh,
            sunday: High,
        },
        PlaceFamily::Transit => WeeklyPattern {
            monday: VeryHigh,
            tuesday: VeryHigh,
            wednesday: VeryHigh,
            thursday: VeryHigh,
            friday: VeryHigh,
            saturday: Moderate,
            sunday: Low,
        },
        PlaceFamily::Office | PlaceFamily::General => WeeklyPattern::uniform(Moderate),
    }
}

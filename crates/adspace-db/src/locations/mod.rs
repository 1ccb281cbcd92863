//! Database operations for the `locations` table.

mod read;
mod types;
mod write;

pub use read::{get_location, list_candidate_locations, list_candidate_locations_by_ids};
pub use types::{CandidateRow, LocationRow, NewLocation};
pub use write::{insert_location, record_traffic_attempt, write_traffic_estimate};

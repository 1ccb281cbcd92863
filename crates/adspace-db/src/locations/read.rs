//! Read operations for the `locations` table.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{CandidateRow, LocationRow};

/// Up to `limit` located rows, least recently attempted first.
///
/// Rows never attempted come first, then by oldest `traffic_attempted_at`,
/// then by `created_at`. Failed attempts are stamped too, so rows that keep
/// failing move behind the rest instead of filling every batch.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_candidate_locations(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        "SELECT id, title, latitude, longitude, traffic_data \
         FROM locations \
         WHERE latitude IS NOT NULL AND longitude IS NOT NULL \
         ORDER BY traffic_attempted_at ASC NULLS FIRST, created_at ASC, id ASC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// The located rows among `ids`, in the order the ids were given.
///
/// Duplicate ids are collapsed. Unknown ids and rows without coordinates are
/// silently dropped.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_candidate_locations_by_ids(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<Uuid> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, CandidateRow>(
        "SELECT l.id, l.title, l.latitude, l.longitude, l.traffic_data \
         FROM UNNEST($1::uuid[]) WITH ORDINALITY AS wanted(id, ord) \
         JOIN locations l ON l.id = wanted.id \
         WHERE l.latitude IS NOT NULL AND l.longitude IS NOT NULL \
         ORDER BY wanted.ord",
    )
    .bind(&unique)
    .fetch_all(pool)
    .await
}

/// Fetch one location by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_location(pool: &PgPool, id: Uuid) -> Result<Option<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, title, latitude, longitude, traffic_data, traffic_updated_at, \
                traffic_attempted_at, created_at, updated_at \
         FROM locations \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

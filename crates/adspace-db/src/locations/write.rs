//! Write operations for the `locations` table.

use adspace_core::TrafficEstimate;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::types::NewLocation;

/// Insert a location and return its generated id.
///
/// Coordinates are bound as `f64` and cast to `NUMERIC(9,6)` in SQL so the
/// database performs the rounding.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including when only one
/// coordinate is supplied.
pub async fn insert_location(pool: &PgPool, location: &NewLocation) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO locations (title, latitude, longitude) \
         VALUES ($1, $2::float8::numeric(9,6), $3::float8::numeric(9,6)) \
         RETURNING id",
    )
    .bind(&location.title)
    .bind(location.latitude)
    .bind(location.longitude)
    .fetch_one(pool)
    .await
}

/// Replace the stored traffic estimate for one location and stamp the
/// attempt with the estimate's `computed_at`.
///
/// Returns the number of rows updated: `0` means the id does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn write_traffic_estimate(
    pool: &PgPool,
    id: Uuid,
    estimate: &TrafficEstimate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE locations \
         SET traffic_data         = $2, \
             traffic_updated_at   = $3, \
             traffic_attempted_at = $3, \
             updated_at           = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(Json(estimate))
    .bind(estimate.computed_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Stamp an enrichment attempt that produced no estimate. The stored
/// estimate and `traffic_updated_at` are left alone.
///
/// Returns the number of rows updated: `0` means the id does not exist.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the update fails.
pub async fn record_traffic_attempt(
    pool: &PgPool,
    id: Uuid,
    attempted_at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE locations SET traffic_attempted_at = $2 WHERE id = $1")
        .bind(id)
        .bind(attempted_at)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

//! [`LocationStore`] backed by the Postgres `locations` table.

use adspace_core::{
    CandidateLocation, CandidateSelector, LocationId, LocationStore, LocationStoreError,
    TrafficEstimate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::locations::{
    list_candidate_locations, list_candidate_locations_by_ids, record_traffic_attempt,
    write_traffic_estimate, CandidateRow,
};

#[derive(Debug, Clone)]
pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn list_candidates(
        &self,
        selector: &CandidateSelector,
    ) -> Result<Vec<CandidateLocation>, LocationStoreError> {
        let rows = match selector {
            CandidateSelector::Ids(ids) => list_candidate_locations_by_ids(&self.pool, ids).await,
            CandidateSelector::Limit(limit) => {
                let limit = i64::try_from(*limit).unwrap_or(i64::MAX);
                list_candidate_locations(&self.pool, limit).await
            }
        }
        .map_err(store_error)?;

        Ok(rows.into_iter().filter_map(to_candidate).collect())
    }

    async fn write_estimate(
        &self,
        id: LocationId,
        estimate: &TrafficEstimate,
    ) -> Result<(), LocationStoreError> {
        let updated = write_traffic_estimate(&self.pool, id, estimate)
            .await
            .map_err(store_error)?;
        if updated == 0 {
            return Err(LocationStoreError::NotFound(id));
        }
        Ok(())
    }

    async fn record_attempt(
        &self,
        id: LocationId,
        attempted_at: DateTime<Utc>,
    ) -> Result<(), LocationStoreError> {
        let updated = record_traffic_attempt(&self.pool, id, attempted_at)
            .await
            .map_err(store_error)?;
        if updated == 0 {
            return Err(LocationStoreError::NotFound(id));
        }
        Ok(())
    }
}

fn to_candidate(row: CandidateRow) -> Option<CandidateLocation> {
    let id = row.id;
    let candidate = row.into_candidate();
    if candidate.is_none() {
        tracing::warn!(location_id = %id, "coordinates out of f64 range; skipping candidate");
    }
    candidate
}

fn store_error(err: sqlx::Error) -> LocationStoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => LocationStoreError::Connection(err.to_string()),
        other => LocationStoreError::Query(other.to_string()),
    }
}

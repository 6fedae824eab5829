use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::domain::{AffinityRecord, LaneKey, ModelSnapshot, SnapshotInfo};
use crate::error::AffinityError;
use crate::port::{AffinityStore, PortFuture};

// Rows per UNNEST insert statement
const INSERT_BATCH_SIZE: usize = 1000;

pub struct PgAffinityStore {
    pool: PgPool,
}

impl PgAffinityStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clear and refill `lane_driver_affinity` inside one transaction.
    ///
    /// The transaction rolls back when dropped without commit, so any failure
    /// leaves the previous snapshot in place for readers.
    pub async fn replace_snapshot(&self, snapshot: ModelSnapshot) -> Result<(), AffinityError> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM lane_driver_affinity")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for chunk in snapshot.records.chunks(INSERT_BATCH_SIZE) {
            let mut lane_keys = Vec::with_capacity(chunk.len());
            let mut driver_ids = Vec::with_capacity(chunk.len());
            let mut up_counts = Vec::with_capacity(chunk.len());
            let mut down_counts = Vec::with_capacity(chunk.len());
            let mut scores = Vec::with_capacity(chunk.len());
            for record in chunk {
                lane_keys.push(record.lane_key.as_str().to_string());
                driver_ids.push(record.driver_id.clone());
                up_counts.push(to_db_count(record.up_count)?);
                down_counts.push(to_db_count(record.down_count)?);
                scores.push(record.score);
            }

            sqlx::query(
                r"
                INSERT INTO lane_driver_affinity
                    (lane_key, driver_id, up_count, down_count, score, trained_at)
                SELECT lane_key, driver_id, up_count, down_count, score, $6
                FROM UNNEST($1::TEXT[], $2::TEXT[], $3::BIGINT[], $4::BIGINT[], $5::DOUBLE PRECISION[])
                    AS t(lane_key, driver_id, up_count, down_count, score)
                ",
            )
            .bind(&lane_keys)
            .bind(&driver_ids)
            .bind(&up_counts)
            .bind(&down_counts)
            .bind(&scores)
            .bind(snapshot.trained_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            cleared,
            inserted = snapshot.records.len(),
            "Replaced lane_driver_affinity snapshot"
        );
        Ok(())
    }

    pub async fn lane_records(
        &self,
        lane_key: &LaneKey,
        min_samples: u64,
        limit: usize,
    ) -> Result<Vec<AffinityRecord>, AffinityError> {
        let rows = sqlx::query(
            r"
            SELECT lane_key, driver_id, up_count, down_count, score, trained_at
            FROM lane_driver_affinity
            WHERE lane_key = $1 AND up_count + down_count >= $2
            ORDER BY score DESC, driver_id ASC
            LIMIT $3
            ",
        )
        .bind(lane_key.as_str())
        .bind(to_db_count(min_samples)?)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    pub async fn snapshot_info(&self) -> Result<SnapshotInfo, AffinityError> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS record_count,
                   COUNT(DISTINCT lane_key) AS lane_count,
                   MAX(trained_at) AS trained_at
            FROM lane_driver_affinity
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(SnapshotInfo {
            trained_at: row.try_get("trained_at")?,
            record_count: from_db_count(row.try_get("record_count")?)?,
            lane_count: from_db_count(row.try_get("lane_count")?)?,
        })
    }

    pub async fn all_records(&self) -> Result<Vec<AffinityRecord>, AffinityError> {
        let rows = sqlx::query(
            r"
            SELECT lane_key, driver_id, up_count, down_count, score, trained_at
            FROM lane_driver_affinity
            ORDER BY lane_key, driver_id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}

fn to_db_count(count: u64) -> Result<i64, AffinityError> {
    i64::try_from(count)
        .map_err(|_| AffinityError::Storage(format!("count {count} exceeds BIGINT range")))
}

fn from_db_count(count: i64) -> Result<u64, AffinityError> {
    u64::try_from(count).map_err(|_| AffinityError::Storage(format!("negative count {count}")))
}

fn record_from_row(row: &PgRow) -> Result<AffinityRecord, AffinityError> {
    Ok(AffinityRecord {
        lane_key: LaneKey::from_normalized(row.try_get::<String, _>("lane_key")?),
        driver_id: row.try_get("driver_id")?,
        up_count: from_db_count(row.try_get("up_count")?)?,
        down_count: from_db_count(row.try_get("down_count")?)?,
        score: row.try_get("score")?,
        trained_at: row.try_get("trained_at")?,
    })
}

impl AffinityStore for PgAffinityStore {
    fn replace_snapshot(&self, snapshot: ModelSnapshot) -> PortFuture<'_, ()> {
        Box::pin(self.replace_snapshot(snapshot))
    }

    fn lane_records<'a>(
        &'a self,
        lane_key: &'a LaneKey,
        min_samples: u64,
        limit: usize,
    ) -> PortFuture<'a, Vec<AffinityRecord>> {
        Box::pin(self.lane_records(lane_key, min_samples, limit))
    }

    fn snapshot_info(&self) -> PortFuture<'_, SnapshotInfo> {
        Box::pin(self.snapshot_info())
    }

    fn all_records(&self) -> PortFuture<'_, Vec<AffinityRecord>> {
        Box::pin(self.all_records())
    }
}

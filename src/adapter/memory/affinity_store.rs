use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::domain::{AffinityRecord, LaneKey, ModelSnapshot, SnapshotInfo};
use crate::error::AffinityError;
use crate::port::{AffinityStore, PortFuture};

/// Indexed, immutable view of one snapshot.
#[derive(Debug, Default)]
struct IndexedSnapshot {
    trained_at: Option<chrono::DateTime<chrono::Utc>>,
    by_lane: HashMap<LaneKey, Vec<AffinityRecord>>,
    record_count: u64,
}

impl IndexedSnapshot {
    fn build(snapshot: ModelSnapshot) -> Result<Self, AffinityError> {
        let mut by_lane: HashMap<LaneKey, Vec<AffinityRecord>> = HashMap::new();
        let mut pairs = BTreeSet::new();
        let record_count = snapshot.records.len() as u64;

        for record in snapshot.records {
            if !pairs.insert((record.lane_key.clone(), record.driver_id.clone())) {
                return Err(AffinityError::Storage(format!(
                    "duplicate affinity record for lane {} and driver {}",
                    record.lane_key, record.driver_id
                )));
            }
            by_lane
                .entry(record.lane_key.clone())
                .or_default()
                .push(record);
        }

        for records in by_lane.values_mut() {
            records.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| a.driver_id.cmp(&b.driver_id))
            });
        }

        Ok(Self {
            trained_at: Some(snapshot.trained_at),
            by_lane,
            record_count,
        })
    }
}

/// In-process affinity store. A replacement is built off to the side and
/// swapped in under the write lock, so readers only see whole snapshots.
#[derive(Debug, Default)]
pub struct MemoryAffinityStore {
    current: RwLock<Arc<IndexedSnapshot>>,
}

impl MemoryAffinityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self) -> Result<Arc<IndexedSnapshot>, AffinityError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| AffinityError::Storage("affinity snapshot lock poisoned".into()))
    }
}

impl AffinityStore for MemoryAffinityStore {
    fn replace_snapshot(&self, snapshot: ModelSnapshot) -> PortFuture<'_, ()> {
        Box::pin(async move {
            let indexed = Arc::new(IndexedSnapshot::build(snapshot)?);
            let mut guard = self
                .current
                .write()
                .map_err(|_| AffinityError::Storage("affinity snapshot lock poisoned".into()))?;
            *guard = indexed;
            Ok(())
        })
    }

    fn lane_records<'a>(
        &'a self,
        lane_key: &'a LaneKey,
        min_samples: u64,
        limit: usize,
    ) -> PortFuture<'a, Vec<AffinityRecord>> {
        Box::pin(async move {
            let snapshot = self.current()?;
            Ok(snapshot
                .by_lane
                .get(lane_key)
                .map(|records| {
                    records
                        .iter()
                        .filter(|record| record.event_count() >= min_samples)
                        .take(limit)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn snapshot_info(&self) -> PortFuture<'_, SnapshotInfo> {
        Box::pin(async move {
            let snapshot = self.current()?;
            Ok(SnapshotInfo {
                trained_at: snapshot.trained_at,
                record_count: snapshot.record_count,
                lane_count: snapshot.by_lane.len() as u64,
            })
        })
    }

    fn all_records(&self) -> PortFuture<'_, Vec<AffinityRecord>> {
        Box::pin(async move {
            let snapshot = self.current()?;
            let mut records: Vec<AffinityRecord> =
                snapshot.by_lane.values().flatten().cloned().collect();
            records.sort_by(|a, b| {
                a.lane_key
                    .cmp(&b.lane_key)
                    .then_with(|| a.driver_id.cmp(&b.driver_id))
            });
            Ok(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(lane: &str, driver: &str, up: u64, down: u64, score: f64) -> AffinityRecord {
        AffinityRecord {
            lane_key: LaneKey::from_normalized(lane),
            driver_id: driver.into(),
            up_count: up,
            down_count: down,
            score,
            trained_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_lane_records_sorted_and_filtered() {
        let store = MemoryAffinityStore::new();
        store
            .replace_snapshot(ModelSnapshot {
                trained_at: Utc::now(),
                records: vec![
                    record("A -> B", "D2", 1, 0, 0.66),
                    record("A -> B", "D1", 5, 0, 0.85),
                    record("A -> B", "D3", 1, 0, 0.66),
                    record("C -> D", "D1", 0, 1, 0.33),
                ],
            })
            .await
            .unwrap();

        let lane = LaneKey::from_normalized("A -> B");
        let ids: Vec<_> = store
            .lane_records(&lane, 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.driver_id)
            .collect();
        assert_eq!(ids, ["D1", "D2", "D3"]);

        let filtered = store.lane_records(&lane, 2, 10).await.unwrap();
        assert_eq!(filtered.len(), 1);

        let capped = store.lane_records(&lane, 0, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected_and_previous_snapshot_kept() {
        let store = MemoryAffinityStore::new();
        store
            .replace_snapshot(ModelSnapshot {
                trained_at: Utc::now(),
                records: vec![record("A -> B", "D1", 1, 0, 0.66)],
            })
            .await
            .unwrap();

        let result = store
            .replace_snapshot(ModelSnapshot {
                trained_at: Utc::now(),
                records: vec![
                    record("C -> D", "D1", 1, 0, 0.66),
                    record("C -> D", "D1", 2, 0, 0.75),
                ],
            })
            .await;

        assert!(result.is_err());
        let info = store.snapshot_info().await.unwrap();
        assert_eq!(info.record_count, 1);
        assert_eq!(store.all_records().await.unwrap()[0].lane_key.as_str(), "A -> B");
    }

    #[tokio::test]
    async fn test_empty_store_info() {
        let store = MemoryAffinityStore::new();
        let info = store.snapshot_info().await.unwrap();
        assert_eq!(info.trained_at, None);
        assert_eq!(info.record_count, 0);
        assert_eq!(info.lane_count, 0);
    }
}

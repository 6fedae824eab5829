//! AffinityStore trait for the trained lane/driver model.
//!
//! The store holds exactly one live snapshot. Implementations include
//! `PgAffinityStore` for production and `MemoryAffinityStore` for tests and
//! single-process deployments.

use super::PortFuture;
use crate::domain::{AffinityRecord, LaneKey, ModelSnapshot, SnapshotInfo};

pub trait AffinityStore: Send + Sync {
    /// Replace the whole record set with `snapshot`.
    ///
    /// Readers must observe either the previous snapshot or the new one in
    /// full. On error the previous snapshot stays in place.
    fn replace_snapshot(&self, snapshot: ModelSnapshot) -> PortFuture<'_, ()>;

    /// Records for one lane with at least `min_samples` events, ordered by
    /// score descending then driver id ascending, capped at `limit`.
    fn lane_records<'a>(
        &'a self,
        lane_key: &'a LaneKey,
        min_samples: u64,
        limit: usize,
    ) -> PortFuture<'a, Vec<AffinityRecord>>;

    fn snapshot_info(&self) -> PortFuture<'_, SnapshotInfo>;

    /// Every record of the current snapshot, ordered by lane key then driver id.
    fn all_records(&self) -> PortFuture<'_, Vec<AffinityRecord>>;
}

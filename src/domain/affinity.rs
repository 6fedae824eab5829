use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lane::LaneKey;

/// Score assigned to a driver without a trained record for the lane.
pub const FALLBACK_SCORE: f64 = 0.5;

/// Trained score for one (lane, driver) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffinityRecord {
    pub lane_key: LaneKey,
    pub driver_id: String,
    pub up_count: u64,
    pub down_count: u64,
    pub score: f64,
    pub trained_at: DateTime<Utc>,
}

impl AffinityRecord {
    pub fn event_count(&self) -> u64 {
        self.up_count + self.down_count
    }
}

/// A complete trained model, published as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    pub trained_at: DateTime<Utc>,
    pub records: Vec<AffinityRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    pub trained_at: Option<DateTime<Utc>>,
    pub record_count: u64,
    pub lane_count: u64,
}

/// Per-lane summary of the current snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSummary {
    pub lane_key: LaneKey,
    pub driver_count: u64,
    pub event_count: u64,
    pub best_driver_id: String,
    pub best_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Learned,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub driver_id: String,
    pub score: f64,
    pub source: RecommendationSource,
}

//! Affinity scoring and the training job that publishes model snapshots.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::aggregator::{self, AggregationReport, CountTable};
use crate::domain::{AffinityRecord, ModelSnapshot};
use crate::error::AffinityError;
use crate::port::{AffinityStore, OutcomeLog};

/// Laplace (add-one) smoothed share of positive outcomes.
///
/// Always in `(0, 1)`; `laplace_score(0, 0) == 0.5`.
pub fn laplace_score(up_count: u64, down_count: u64) -> f64 {
    (up_count as f64 + 1.0) / ((up_count + down_count) as f64 + 2.0)
}

/// Score every counted pair. All records share `trained_at`.
pub fn build_snapshot(counts: &CountTable, trained_at: DateTime<Utc>) -> ModelSnapshot {
    let records = counts
        .iter()
        .map(|((lane_key, driver_id), counts)| AffinityRecord {
            lane_key: lane_key.clone(),
            driver_id: driver_id.clone(),
            up_count: counts.up_count,
            down_count: counts.down_count,
            score: laplace_score(counts.up_count, counts.down_count),
            trained_at,
        })
        .collect();

    ModelSnapshot {
        trained_at,
        records,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingSummary {
    pub trained_at: DateTime<Utc>,
    pub record_count: u64,
    pub lane_count: u64,
    pub report: AggregationReport,
}

/// Training job: outcome log -> aggregation -> scoring -> snapshot swap.
pub struct Trainer {
    outcome_log: Arc<dyn OutcomeLog>,
    store: Arc<dyn AffinityStore>,
    run_guard: Mutex<()>,
}

impl Trainer {
    pub fn new(outcome_log: Arc<dyn OutcomeLog>, store: Arc<dyn AffinityStore>) -> Self {
        Self {
            outcome_log,
            store,
            run_guard: Mutex::new(()),
        }
    }

    pub async fn train(&self) -> Result<TrainingSummary, AffinityError> {
        self.train_at(Utc::now()).await
    }

    /// Run one full training pass stamped with `trained_at`.
    ///
    /// Rejects overlapping runs in this process with
    /// [`AffinityError::TrainingInProgress`].
    pub async fn train_at(
        &self,
        trained_at: DateTime<Utc>,
    ) -> Result<TrainingSummary, AffinityError> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            return Err(AffinityError::TrainingInProgress);
        };

        let assignments = self.outcome_log.assignments().await?;
        let votes = self.outcome_log.votes().await?;
        info!(
            assignments = assignments.len(),
            votes = votes.len(),
            "Loaded outcome facts for training"
        );

        let aggregation = aggregator::aggregate(&assignments, &votes);
        let snapshot = build_snapshot(&aggregation.counts, trained_at);
        let lane_count = snapshot
            .records
            .iter()
            .map(|record| &record.lane_key)
            .collect::<BTreeSet<_>>()
            .len() as u64;
        let record_count = snapshot.records.len() as u64;

        if let Err(e) = self.store.replace_snapshot(snapshot).await {
            error!("Failed to publish affinity snapshot: {e}");
            return Err(e);
        }

        let report = aggregation.report;
        info!(
            record_count,
            lane_count,
            events_counted = report.events_counted,
            skipped_malformed = report.skipped_malformed,
            skipped_unknown_lane = report.skipped_unknown_lane,
            skipped_unrecognized_vote = report.skipped_unrecognized_vote,
            "Published affinity snapshot"
        );

        Ok(TrainingSummary {
            trained_at,
            record_count,
            lane_count,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::LaneDriverCounts;
    use crate::domain::Lane;
    use proptest::prelude::*;

    #[test]
    fn test_neutral_prior() {
        assert_eq!(laplace_score(0, 0), 0.5);
    }

    #[test]
    fn test_three_up_one_down() {
        let score = laplace_score(3, 1);
        assert!((score - 4.0 / 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_up_vote_produces_record() {
        let mut counts = CountTable::new();
        counts.insert(
            (Lane::from_places(Some("A"), Some("B")).key(), "D1".into()),
            LaneDriverCounts {
                up_count: 1,
                down_count: 0,
            },
        );
        let trained_at = Utc::now();

        let snapshot = build_snapshot(&counts, trained_at);

        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.records[0].trained_at, trained_at);
        assert!((snapshot.records[0].score - 2.0 / 3.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn score_is_strictly_between_zero_and_one(up in 0u64..1_000_000, down in 0u64..1_000_000) {
            let score = laplace_score(up, down);
            prop_assert!(score > 0.0);
            prop_assert!(score < 1.0);
        }

        #[test]
        fn score_increases_with_up_count(up in 0u64..1_000_000, down in 0u64..1_000_000) {
            prop_assert!(laplace_score(up + 1, down) > laplace_score(up, down));
        }

        #[test]
        fn score_decreases_with_down_count(up in 0u64..1_000_000, down in 0u64..1_000_000) {
            prop_assert!(laplace_score(up, down + 1) < laplace_score(up, down));
        }
    }
}

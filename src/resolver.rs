//! Recommendation resolver: learned lane records merged with a neutral
//! roster fallback.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::domain::{
    AffinityRecord, FALLBACK_SCORE, Lane, Recommendation, RecommendationSource,
};
use crate::error::AffinityError;
use crate::port::{AffinityStore, DriverRoster};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    pub limit: usize,
}

/// Concatenate learned records and fallback drivers.
///
/// Learned entries keep their order and come first. Fallback drivers are
/// deduplicated, sorted by id, and dropped when already learned. The result
/// is truncated to `limit`.
pub fn merge_recommendations(
    learned: Vec<AffinityRecord>,
    mut roster: Vec<String>,
    limit: usize,
) -> Vec<Recommendation> {
    roster.sort();
    roster.dedup();

    let mut seen = HashSet::new();
    let learned: Vec<_> = learned
        .into_iter()
        .filter(|record| seen.insert(record.driver_id.clone()))
        .map(|record| Recommendation {
            driver_id: record.driver_id,
            score: record.score,
            source: RecommendationSource::Learned,
        })
        .collect();

    let fallback = roster
        .into_iter()
        .filter(|driver_id| !seen.contains(driver_id))
        .map(|driver_id| Recommendation {
            driver_id,
            score: FALLBACK_SCORE,
            source: RecommendationSource::Fallback,
        });

    learned.into_iter().chain(fallback).take(limit).collect()
}

pub struct Resolver {
    store: Arc<dyn AffinityStore>,
    roster: Arc<dyn DriverRoster>,
    min_learned_samples: u64,
}

impl Resolver {
    pub fn new(
        store: Arc<dyn AffinityStore>,
        roster: Arc<dyn DriverRoster>,
        min_learned_samples: u64,
    ) -> Self {
        Self {
            store,
            roster,
            min_learned_samples,
        }
    }

    /// Ranked drivers for a lane. Never empty while an active driver exists
    /// and `limit > 0`.
    pub async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<Recommendation>, AffinityError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }

        let lane = Lane::from_places(query.origin.as_deref(), query.destination.as_deref());
        let lane_key = lane.key();

        let learned = if lane.is_resolved() {
            self.store
                .lane_records(&lane_key, self.min_learned_samples, query.limit)
                .await?
        } else {
            Vec::new()
        };
        let roster = self.roster.active_drivers().await?;

        debug!(
            lane_key = %lane_key,
            learned = learned.len(),
            roster = roster.len(),
            "Resolving recommendations"
        );

        Ok(merge_recommendations(learned, roster, query.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LaneKey;
    use chrono::Utc;

    fn record(driver: &str, score: f64) -> AffinityRecord {
        AffinityRecord {
            lane_key: LaneKey::from_normalized("A -> B"),
            driver_id: driver.into(),
            up_count: 1,
            down_count: 0,
            score,
            trained_at: Utc::now(),
        }
    }

    fn roster(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn test_learned_precede_fallback_even_with_lower_score() {
        let merged = merge_recommendations(vec![record("D1", 0.25)], roster(&["D2"]), 5);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].driver_id, "D1");
        assert_eq!(merged[0].source, RecommendationSource::Learned);
        assert_eq!(merged[1].driver_id, "D2");
        assert_eq!(merged[1].source, RecommendationSource::Fallback);
        assert_eq!(merged[1].score, FALLBACK_SCORE);
    }

    #[test]
    fn test_learned_driver_not_repeated_as_fallback() {
        let merged = merge_recommendations(
            vec![record("D1", 0.8)],
            roster(&["D3", "D1", "D2", "D2"]),
            10,
        );

        let ids: Vec<_> = merged.iter().map(|r| r.driver_id.as_str()).collect();
        assert_eq!(ids, ["D1", "D2", "D3"]);
    }

    #[test]
    fn test_truncates_to_limit() {
        let merged = merge_recommendations(
            vec![record("D1", 0.8), record("D2", 0.7)],
            roster(&["D3", "D4"]),
            3,
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2].driver_id, "D3");
    }

    #[test]
    fn test_empty_roster_and_no_model_is_empty() {
        assert!(merge_recommendations(Vec::new(), Vec::new(), 5).is_empty());
    }
}

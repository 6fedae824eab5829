//! Lane report over the current snapshot.

use crate::domain::{AffinityRecord, LaneSummary};

/// Lanes need at least this many events to be reported as stable.
pub const DEFAULT_MIN_LANE_EVENTS: u64 = 2;

/// Summarise `records` per lane, keeping lanes with at least `min_events`
/// total events. The best driver is the highest score, ties broken by id.
pub fn lane_report(records: &[AffinityRecord], min_events: u64) -> Vec<LaneSummary> {
    let mut sorted: Vec<&AffinityRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.lane_key
            .cmp(&b.lane_key)
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });

    let mut summaries: Vec<LaneSummary> = Vec::new();
    for record in sorted {
        match summaries.last_mut() {
            Some(summary) if summary.lane_key == record.lane_key => {
                summary.driver_count += 1;
                summary.event_count += record.event_count();
            }
            _ => summaries.push(LaneSummary {
                lane_key: record.lane_key.clone(),
                driver_count: 1,
                event_count: record.event_count(),
                best_driver_id: record.driver_id.clone(),
                best_score: record.score,
            }),
        }
    }

    summaries.retain(|summary| summary.event_count >= min_events);
    summaries.sort_by(|a, b| {
        b.event_count
            .cmp(&a.event_count)
            .then_with(|| a.lane_key.cmp(&b.lane_key))
    });
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LaneKey;
    use crate::scorer::laplace_score;
    use chrono::Utc;

    fn record(lane: &str, driver: &str, up: u64, down: u64) -> AffinityRecord {
        AffinityRecord {
            lane_key: LaneKey::from_normalized(lane),
            driver_id: driver.into(),
            up_count: up,
            down_count: down,
            score: laplace_score(up, down),
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_event_lanes_are_not_stable() {
        let records = vec![
            record("A -> B", "D1", 3, 1),
            record("A -> B", "D2", 0, 1),
            record("C -> D", "D1", 1, 0),
        ];

        let report = lane_report(&records, DEFAULT_MIN_LANE_EVENTS);

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].lane_key.as_str(), "A -> B");
        assert_eq!(report[0].driver_count, 2);
        assert_eq!(report[0].event_count, 5);
        assert_eq!(report[0].best_driver_id, "D1");
    }

    #[test]
    fn test_zero_threshold_reports_every_lane_by_volume() {
        let records = vec![record("C -> D", "D1", 1, 0), record("A -> B", "D1", 4, 0)];

        let report = lane_report(&records, 0);

        let lanes: Vec<_> = report.iter().map(|s| s.lane_key.as_str()).collect();
        assert_eq!(lanes, ["A -> B", "C -> D"]);
    }
}

//! Event aggregation: outcome facts to per (lane, driver) up/down counts.
//!
//! Completed assignments and explicit votes are turned into [`OutcomeEvent`]s
//! by two independent producers and concatenated. A load that was both
//! completed and voted on counts twice.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    AssignmentFact, EventSource, Lane, LaneKey, OutcomeEvent, Polarity, VoteFact, VoteSignal,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneDriverCounts {
    pub up_count: u64,
    pub down_count: u64,
}

/// Counts keyed by `(lane_key, driver_id)`, in key order.
pub type CountTable = BTreeMap<(LaneKey, String), LaneDriverCounts>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub assignments_seen: u64,
    pub votes_seen: u64,
    pub events_counted: u64,
    pub skipped_malformed: u64,
    pub skipped_unknown_lane: u64,
    pub skipped_unrecognized_vote: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub counts: CountTable,
    pub report: AggregationReport,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// One implicit positive per completed assignment.
pub fn events_from_assignments(
    facts: &[AssignmentFact],
    report: &mut AggregationReport,
) -> Vec<OutcomeEvent> {
    let mut events = Vec::with_capacity(facts.len());
    for fact in facts {
        report.assignments_seen += 1;
        let (Some(driver_id), Some(_load_id)) =
            (present(fact.driver_id.as_ref()), present(fact.load_id.as_ref()))
        else {
            warn!(
                load_id = ?fact.load_id,
                driver_id = ?fact.driver_id,
                "Skipping malformed assignment fact"
            );
            report.skipped_malformed += 1;
            continue;
        };

        events.push(OutcomeEvent {
            lane: Lane::from_places(fact.origin.as_deref(), fact.destination.as_deref()),
            driver_id: driver_id.to_string(),
            polarity: Polarity::Positive,
            source: EventSource::CompletedAssignment,
        });
    }
    events
}

/// Explicit votes with a recognizable polarity.
pub fn events_from_votes(facts: &[VoteFact], report: &mut AggregationReport) -> Vec<OutcomeEvent> {
    let mut events = Vec::with_capacity(facts.len());
    for fact in facts {
        report.votes_seen += 1;
        let (Some(driver_id), Some(_load_id)) =
            (present(fact.driver_id.as_ref()), present(fact.load_id.as_ref()))
        else {
            warn!(
                load_id = ?fact.load_id,
                driver_id = ?fact.driver_id,
                "Skipping malformed vote fact"
            );
            report.skipped_malformed += 1;
            continue;
        };

        let Some(polarity) = VoteSignal::from_value(&fact.vote).polarity() else {
            debug!(vote = %fact.vote, driver_id, "Dropping unrecognized vote value");
            report.skipped_unrecognized_vote += 1;
            continue;
        };

        events.push(OutcomeEvent {
            lane: Lane::from_places(fact.origin.as_deref(), fact.destination.as_deref()),
            driver_id: driver_id.to_string(),
            polarity,
            source: EventSource::ExplicitVote,
        });
    }
    events
}

/// Fold events into counts, discarding any on an unresolved lane.
pub fn count_events<I>(events: I, report: &mut AggregationReport) -> CountTable
where
    I: IntoIterator<Item = OutcomeEvent>,
{
    let mut counts = CountTable::new();
    for event in events {
        if !event.lane.is_resolved() {
            report.skipped_unknown_lane += 1;
            continue;
        }

        let entry = counts
            .entry((event.lane.key(), event.driver_id))
            .or_default();
        match event.polarity {
            Polarity::Positive => entry.up_count += 1,
            Polarity::Negative => entry.down_count += 1,
        }
        report.events_counted += 1;
    }
    counts
}

/// Run both producers over the log contents and count the union.
pub fn aggregate(assignments: &[AssignmentFact], votes: &[VoteFact]) -> Aggregation {
    let mut report = AggregationReport::default();
    let implicit = events_from_assignments(assignments, &mut report);
    let explicit = events_from_votes(votes, &mut report);
    let counts = count_events(implicit.into_iter().chain(explicit), &mut report);
    Aggregation { counts, report }
}

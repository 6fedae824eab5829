pub mod affinity;
pub mod event;
pub mod lane;

pub use affinity::{
    AffinityRecord, FALLBACK_SCORE, LaneSummary, ModelSnapshot, Recommendation,
    RecommendationSource, SnapshotInfo,
};
pub use event::{AssignmentFact, EventSource, OutcomeEvent, Polarity, VoteFact, VoteSignal};
pub use lane::{Lane, LaneKey, UNKNOWN_ENDPOINT, normalize_place};

//! OutcomeLog trait: the append-only feed of assignment and vote facts.

use super::PortFuture;
use crate::domain::{AssignmentFact, VoteFact};

/// Two independent producers (completed assignments, explicit votes) feeding
/// one log. Facts are never mutated or deleted individually.
pub trait OutcomeLog: Send + Sync {
    fn record_assignment(&self, fact: AssignmentFact) -> PortFuture<'_, ()>;

    fn record_vote(&self, fact: VoteFact) -> PortFuture<'_, ()>;

    fn assignments(&self) -> PortFuture<'_, Vec<AssignmentFact>>;

    fn votes(&self) -> PortFuture<'_, Vec<VoteFact>>;
}

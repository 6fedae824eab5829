use std::sync::Mutex;

use crate::domain::{AssignmentFact, VoteFact};
use crate::error::AffinityError;
use crate::port::{OutcomeLog, PortFuture};

#[derive(Debug, Default)]
struct Facts {
    assignments: Vec<AssignmentFact>,
    votes: Vec<VoteFact>,
}

/// Append-only outcome log held in memory.
#[derive(Debug, Default)]
pub struct MemoryOutcomeLog {
    facts: Mutex<Facts>,
}

impl MemoryOutcomeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_facts<T>(&self, f: impl FnOnce(&mut Facts) -> T) -> Result<T, AffinityError> {
        let mut guard = self
            .facts
            .lock()
            .map_err(|_| AffinityError::Storage("outcome log lock poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

impl OutcomeLog for MemoryOutcomeLog {
    fn record_assignment(&self, fact: AssignmentFact) -> PortFuture<'_, ()> {
        Box::pin(async move { self.with_facts(|facts| facts.assignments.push(fact)) })
    }

    fn record_vote(&self, fact: VoteFact) -> PortFuture<'_, ()> {
        Box::pin(async move { self.with_facts(|facts| facts.votes.push(fact)) })
    }

    fn assignments(&self) -> PortFuture<'_, Vec<AssignmentFact>> {
        Box::pin(async move { self.with_facts(|facts| facts.assignments.clone()) })
    }

    fn votes(&self) -> PortFuture<'_, Vec<VoteFact>> {
        Box::pin(async move { self.with_facts(|facts| facts.votes.clone()) })
    }
}

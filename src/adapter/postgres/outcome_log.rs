use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::{AssignmentFact, VoteFact};
use crate::error::AffinityError;
use crate::port::{OutcomeLog, PortFuture};

/// Outcome log backed by `lane_assignment_events` and `lane_feedback_votes`.
pub struct PgOutcomeLog {
    pool: PgPool,
}

impl PgOutcomeLog {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record_assignment(&self, fact: AssignmentFact) -> Result<(), AffinityError> {
        sqlx::query(
            r"
            INSERT INTO lane_assignment_events (load_id, origin, destination, driver_id)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(fact.load_id)
        .bind(fact.origin)
        .bind(fact.destination)
        .bind(fact.driver_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_vote(&self, fact: VoteFact) -> Result<(), AffinityError> {
        sqlx::query(
            r"
            INSERT INTO lane_feedback_votes (load_id, origin, destination, driver_id, vote)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(fact.load_id)
        .bind(fact.origin)
        .bind(fact.destination)
        .bind(fact.driver_id)
        .bind(Json(fact.vote))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn assignments(&self) -> Result<Vec<AssignmentFact>, AffinityError> {
        let rows = sqlx::query(
            r"
            SELECT load_id, origin, destination, driver_id
            FROM lane_assignment_events
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            facts.push(AssignmentFact {
                load_id: row.try_get("load_id")?,
                origin: row.try_get("origin")?,
                destination: row.try_get("destination")?,
                driver_id: row.try_get("driver_id")?,
            });
        }
        Ok(facts)
    }

    pub async fn votes(&self) -> Result<Vec<VoteFact>, AffinityError> {
        let rows = sqlx::query(
            r"
            SELECT load_id, origin, destination, driver_id, vote
            FROM lane_feedback_votes
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut facts = Vec::with_capacity(rows.len());
        for row in rows {
            let vote: Option<Json<Value>> = row.try_get("vote")?;
            facts.push(VoteFact {
                load_id: row.try_get("load_id")?,
                origin: row.try_get("origin")?,
                destination: row.try_get("destination")?,
                driver_id: row.try_get("driver_id")?,
                vote: vote.map(|Json(v)| v).unwrap_or(Value::Null),
            });
        }
        Ok(facts)
    }
}

impl OutcomeLog for PgOutcomeLog {
    fn record_assignment(&self, fact: AssignmentFact) -> PortFuture<'_, ()> {
        Box::pin(self.record_assignment(fact))
    }

    fn record_vote(&self, fact: VoteFact) -> PortFuture<'_, ()> {
        Box::pin(self.record_vote(fact))
    }

    fn assignments(&self) -> PortFuture<'_, Vec<AssignmentFact>> {
        Box::pin(self.assignments())
    }

    fn votes(&self) -> PortFuture<'_, Vec<VoteFact>> {
        Box::pin(self.votes())
    }
}

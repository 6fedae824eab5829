use sqlx::PgPool;
use tracing::info;

use crate::error::AffinityError;

/// Idempotent schema for the outcome log, roster and affinity model.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS lane_assignment_events (
    id BIGSERIAL PRIMARY KEY,
    load_id TEXT,
    origin TEXT,
    destination TEXT,
    driver_id TEXT,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS lane_feedback_votes (
    id BIGSERIAL PRIMARY KEY,
    load_id TEXT,
    origin TEXT,
    destination TEXT,
    driver_id TEXT,
    vote JSONB,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS drivers (
    driver_id TEXT PRIMARY KEY,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS lane_driver_affinity (
    lane_key TEXT NOT NULL,
    driver_id TEXT NOT NULL,
    up_count BIGINT NOT NULL CHECK (up_count >= 0),
    down_count BIGINT NOT NULL CHECK (down_count >= 0),
    score DOUBLE PRECISION NOT NULL CHECK (score > 0 AND score < 1),
    trained_at TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (lane_key, driver_id)
);

CREATE INDEX IF NOT EXISTS lane_driver_affinity_lane_score_idx
    ON lane_driver_affinity (lane_key, score DESC, driver_id);
";

pub async fn migrate(pool: &PgPool) -> Result<(), AffinityError> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Applied lane affinity schema");
    Ok(())
}

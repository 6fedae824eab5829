//! Postgres adapter tests. Run with a disposable database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use lane_affinity::adapter::postgres::{PgAffinityStore, PgDriverRoster, PgOutcomeLog, schema};
use lane_affinity::domain::{AffinityRecord, Lane, LaneKey, ModelSnapshot};
use lane_affinity::scorer::Trainer;
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use common::{assignment, vote};

async fn setup_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect to postgres");
    schema::migrate(&pool).await.expect("apply schema");
    sqlx::raw_sql(
        "TRUNCATE lane_assignment_events, lane_feedback_votes, drivers, lane_driver_affinity",
    )
    .execute(&pool)
    .await
    .expect("truncate tables");
    pool
}

fn record(lane: &LaneKey, driver: &str, up: u64, down: u64) -> AffinityRecord {
    AffinityRecord {
        lane_key: lane.clone(),
        driver_id: driver.into(),
        up_count: up,
        down_count: down,
        score: lane_affinity::scorer::laplace_score(up, down),
        trained_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn test_training_round_trip_through_postgres() {
    let pool = setup_pool().await;
    let log = Arc::new(PgOutcomeLog::new(pool.clone()));
    let store = Arc::new(PgAffinityStore::new(pool.clone()));

    log.record_assignment(assignment("L1", "Birmingham, AL", "Charlotte, NC", "D1"))
        .await
        .unwrap();
    log.record_vote(vote("L1", "Birmingham, AL", "Charlotte, NC", "D1", json!("👎")))
        .await
        .unwrap();
    log.record_vote(vote("L2", "Birmingham, AL", "Charlotte, NC", "D2", json!(true)))
        .await
        .unwrap();

    let summary = Trainer::new(log, store.clone()).train().await.unwrap();
    assert_eq!(summary.record_count, 2);

    let lane = Lane::from_places(Some("Birmingham, AL"), Some("Charlotte, NC")).key();
    let records = store.lane_records(&lane, 1, 10).await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.driver_id.as_str()).collect();
    assert_eq!(ids, ["D2", "D1"]);
    assert_eq!(records[1].up_count, 1);
    assert_eq!(records[1].down_count, 1);
}

#[tokio::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn test_failed_insert_rolls_back_to_previous_snapshot() {
    let pool = setup_pool().await;
    let store = PgAffinityStore::new(pool);
    let lane = LaneKey::from_normalized("A -> B");
    let first = ModelSnapshot {
        trained_at: Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap(),
        records: vec![record(&lane, "D1", 1, 0)],
    };
    store.replace_snapshot(first).await.unwrap();

    // Duplicate primary key makes the insert phase fail after the clear.
    let broken = ModelSnapshot {
        trained_at: Utc.with_ymd_and_hms(2026, 10, 2, 0, 0, 0).unwrap(),
        records: vec![record(&lane, "D2", 1, 0), record(&lane, "D2", 2, 0)],
    };
    assert!(store.replace_snapshot(broken).await.is_err());

    let records = store.all_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].driver_id, "D1");
}

#[tokio::test]
#[ignore = "requires a running postgres (DATABASE_URL)"]
async fn test_roster_upsert_and_snapshot_info() {
    let pool = setup_pool().await;
    let roster = PgDriverRoster::new(pool.clone());
    roster.upsert_driver("D2".into(), true).await.unwrap();
    roster.upsert_driver("D1".into(), true).await.unwrap();
    roster.upsert_driver("D2".into(), false).await.unwrap();
    assert_eq!(roster.active_drivers().await.unwrap(), ["D1"]);

    let store = PgAffinityStore::new(pool);
    let empty = store.snapshot_info().await.unwrap();
    assert_eq!(empty.record_count, 0);
    assert_eq!(empty.trained_at, None);
}

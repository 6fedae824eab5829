//! Shared integration test support
//!
//! Fact builders, a store that can be told to fail, and an `AppState` wired
//! to in-memory adapters. Each test binary uses a different subset.
#![allow(dead_code)]

use lane_affinity::adapter::memory::{MemoryAffinityStore, MemoryDriverRoster, MemoryOutcomeLog};
use lane_affinity::app::state::AppState;
use lane_affinity::config::{self, Settings};
use lane_affinity::domain::{AffinityRecord, AssignmentFact, LaneKey, ModelSnapshot, SnapshotInfo, VoteFact};
use lane_affinity::error::AffinityError;
use lane_affinity::port::{AffinityStore, PortFuture};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn assignment(load_id: &str, origin: &str, destination: &str, driver_id: &str) -> AssignmentFact {
    AssignmentFact {
        load_id: Some(load_id.into()),
        origin: Some(origin.into()),
        destination: Some(destination.into()),
        driver_id: Some(driver_id.into()),
    }
}

pub fn vote(
    load_id: &str,
    origin: &str,
    destination: &str,
    driver_id: &str,
    value: serde_json::Value,
) -> VoteFact {
    VoteFact {
        load_id: Some(load_id.into()),
        origin: Some(origin.into()),
        destination: Some(destination.into()),
        driver_id: Some(driver_id.into()),
        vote: value,
    }
}

/// Settings with every default applied (memory backend).
pub fn default_settings() -> Settings {
    config::from_lookup(|_| None).expect("default settings are valid")
}

/// Affinity store wrapper whose snapshot replacement can be forced to fail.
///
/// A failing replacement never touches the wrapped store, like a rolled
/// back transaction.
pub struct FlakyAffinityStore {
    inner: MemoryAffinityStore,
    should_fail: AtomicBool,
    replace_calls: AtomicUsize,
}

impl FlakyAffinityStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryAffinityStore::new(),
            should_fail: AtomicBool::new(false),
            replace_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }
}

impl Default for FlakyAffinityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AffinityStore for FlakyAffinityStore {
    fn replace_snapshot(&self, snapshot: ModelSnapshot) -> PortFuture<'_, ()> {
        Box::pin(async move {
            self.replace_calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(AffinityError::Storage("Mock snapshot insert failure".into()));
            }
            self.inner.replace_snapshot(snapshot).await
        })
    }

    fn lane_records<'a>(
        &'a self,
        lane_key: &'a LaneKey,
        min_samples: u64,
        limit: usize,
    ) -> PortFuture<'a, Vec<AffinityRecord>> {
        self.inner.lane_records(lane_key, min_samples, limit)
    }

    fn snapshot_info(&self) -> PortFuture<'_, SnapshotInfo> {
        self.inner.snapshot_info()
    }

    fn all_records(&self) -> PortFuture<'_, Vec<AffinityRecord>> {
        self.inner.all_records()
    }
}

/// In-memory adapters plus the `AppState` built on them.
pub struct MemoryHarness {
    pub store: Arc<FlakyAffinityStore>,
    pub outcome_log: Arc<MemoryOutcomeLog>,
    pub roster: Arc<MemoryDriverRoster>,
    pub state: AppState,
}

impl MemoryHarness {
    pub fn new<I, S>(active_drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_settings(default_settings(), active_drivers)
    }

    pub fn with_settings<I, S>(settings: Settings, active_drivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Arc::new(FlakyAffinityStore::new());
        let outcome_log = Arc::new(MemoryOutcomeLog::new());
        let roster = Arc::new(MemoryDriverRoster::with_active(active_drivers));
        let state = AppState::new(
            settings,
            store.clone(),
            outcome_log.clone(),
            roster.clone(),
        );
        Self {
            store,
            outcome_log,
            roster,
            state,
        }
    }
}

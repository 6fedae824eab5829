pub mod affinity_store;
pub mod driver_roster;
pub mod outcome_log;

pub use affinity_store::MemoryAffinityStore;
pub use driver_roster::MemoryDriverRoster;
pub use outcome_log::MemoryOutcomeLog;

pub mod affinity_store;
pub mod driver_roster;
pub mod outcome_log;
pub mod schema;

pub use affinity_store::PgAffinityStore;
pub use driver_roster::PgDriverRoster;
pub use outcome_log::PgOutcomeLog;

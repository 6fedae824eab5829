pub mod affinity_store;
pub mod driver_roster;
pub mod outcome_log;

use crate::error::AffinityError;
use std::future::Future;
use std::pin::Pin;

pub use affinity_store::AffinityStore;
pub use driver_roster::DriverRoster;
pub use outcome_log::OutcomeLog;

/// Boxed future returned by every port method, keeping the traits dyn-compatible.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AffinityError>> + Send + 'a>>;

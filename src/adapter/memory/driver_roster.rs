use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::AffinityError;
use crate::port::{DriverRoster, PortFuture};

#[derive(Debug, Default)]
pub struct MemoryDriverRoster {
    drivers: Mutex<BTreeMap<String, bool>>,
}

impl MemoryDriverRoster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Roster with every id in `driver_ids` active.
    pub fn with_active<I, S>(driver_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let drivers = driver_ids
            .into_iter()
            .map(|id| (id.into(), true))
            .collect();
        Self {
            drivers: Mutex::new(drivers),
        }
    }
}

impl DriverRoster for MemoryDriverRoster {
    fn active_drivers(&self) -> PortFuture<'_, Vec<String>> {
        Box::pin(async move {
            let drivers = self
                .drivers
                .lock()
                .map_err(|_| AffinityError::Storage("driver roster lock poisoned".into()))?;
            Ok(drivers
                .iter()
                .filter(|(_, active)| **active)
                .map(|(id, _)| id.clone())
                .collect())
        })
    }

    fn upsert_driver(&self, driver_id: String, active: bool) -> PortFuture<'_, ()> {
        Box::pin(async move {
            let mut drivers = self
                .drivers
                .lock()
                .map_err(|_| AffinityError::Storage("driver roster lock poisoned".into()))?;
            drivers.insert(driver_id, active);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_inactive_drivers_are_hidden() {
        let roster = MemoryDriverRoster::with_active(["D1", "D2"]);
        roster.upsert_driver("D2".into(), false).await.unwrap();
        roster.upsert_driver("D3".into(), true).await.unwrap();

        assert_eq!(roster.active_drivers().await.unwrap(), ["D1", "D3"]);
    }
}

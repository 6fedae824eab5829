use sqlx::{PgPool, Row};

use crate::error::AffinityError;
use crate::port::{DriverRoster, PortFuture};

pub struct PgDriverRoster {
    pool: PgPool,
}

impl PgDriverRoster {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn active_drivers(&self) -> Result<Vec<String>, AffinityError> {
        let rows = sqlx::query("SELECT driver_id FROM drivers WHERE active ORDER BY driver_id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("driver_id").map_err(AffinityError::from))
            .collect()
    }

    pub async fn upsert_driver(&self, driver_id: String, active: bool) -> Result<(), AffinityError> {
        sqlx::query(
            r"
            INSERT INTO drivers (driver_id, active)
            VALUES ($1, $2)
            ON CONFLICT (driver_id) DO UPDATE SET
                active = EXCLUDED.active,
                updated_at = NOW()
            ",
        )
        .bind(driver_id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl DriverRoster for PgDriverRoster {
    fn active_drivers(&self) -> PortFuture<'_, Vec<String>> {
        Box::pin(self.active_drivers())
    }

    fn upsert_driver(&self, driver_id: String, active: bool) -> PortFuture<'_, ()> {
        Box::pin(self.upsert_driver(driver_id, active))
    }
}

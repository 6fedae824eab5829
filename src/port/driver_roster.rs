use super::PortFuture;

/// Live list of drivers eligible for fallback recommendations.
pub trait DriverRoster: Send + Sync {
    /// Active driver ids. Order is not significant.
    fn active_drivers(&self) -> PortFuture<'_, Vec<String>>;

    fn upsert_driver(&self, driver_id: String, active: bool) -> PortFuture<'_, ()>;
}

//! In-memory holder for the last status report.
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use btx_common::StatusReport;
use tokio::time::Instant;

pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(10 * 60);

/// Keeps the most recent [`StatusReport`] for a fixed freshness window.
///
/// Owned by whoever serves status requests; the health monitor itself never caches.
#[derive(Debug)]
pub struct StatusCache {
    ttl: Duration,
    slot: Mutex<Option<(Instant, StatusReport)>>,
}

impl StatusCache {
    pub const fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a copy of the cached report while it is fresh.
    pub fn get(&self) -> Option<StatusReport> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, report)| report.clone())
    }

    pub fn store(&self, report: StatusReport) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((Instant::now(), report));
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_TTL)
    }
}

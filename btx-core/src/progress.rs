use std::fmt::Debug;
use std::sync::Arc;

use btx_common::SiteStatus;

/// Receives progress from a health check run. All methods should be thread-safe.
pub trait ProbeListener: Send + Sync + Debug {
    /// Sets the number of sites about to be probed.
    fn set_total(&self, total: u64);
    /// Called once per site, as soon as its probe has settled.
    fn site_done(&self, status: &SiteStatus);
    /// Signals that every batch has completed.
    fn done(&self);
}

/// A no-operation implementation of `ProbeListener`.
#[derive(Debug, Clone)]
pub struct NoOpProbeListener;

impl ProbeListener for NoOpProbeListener {
    fn set_total(&self, _total: u64) {}
    fn site_done(&self, _status: &SiteStatus) {}
    fn done(&self) {}
}

/// Convenience type alias for a shared, thread-safe probe listener.
pub type SharedProbeListener = Arc<dyn ProbeListener>;

/// Returns a shared instance of a `NoOpProbeListener`.
pub fn no_op_probe_listener() -> SharedProbeListener {
    Arc::new(NoOpProbeListener)
}

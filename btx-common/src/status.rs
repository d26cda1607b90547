//! Health status of the external sites the extractor depends on.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Reachability of a single site, or of the whole catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Operational => "operational",
            Self::Degraded => "degraded",
            Self::PartialOutage => "partial outage",
            Self::MajorOutage => "major outage",
        };
        f.write_str(s)
    }
}

/// Result of probing one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatus {
    pub name: String,
    pub status: Status,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "lastChecked")]
    pub checked_at: DateTime<Utc>,
}

impl SiteStatus {
    pub fn new(name: &str, status: Status, response_time_ms: u64, error: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            response_time_ms,
            error,
            checked_at: Utc::now(),
        }
    }
}

/// Aggregate numbers over every probed site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatus {
    /// Share of operational sites, rounded to two decimals.
    pub uptime_percentage: f64,
    pub operational_count: usize,
    pub total_count: usize,
    pub status: Status,
}

impl OverallStatus {
    /// An empty catalog counts as fully operational.
    pub fn from_sites(sites: &[SiteStatus]) -> Self {
        let total_count = sites.len();
        let operational_count = sites
            .iter()
            .filter(|site| site.status == Status::Operational)
            .count();

        let uptime_percentage = if total_count == 0 {
            100.0
        } else {
            let raw = operational_count as f64 / total_count as f64 * 100.0;
            (raw * 100.0).round() / 100.0
        };

        Self {
            uptime_percentage,
            operational_count,
            total_count,
            status: overall_status(operational_count, total_count),
        }
    }
}

/// Maps operational/total counts onto the catalog-wide status.
///
/// Everything up is `Operational`, a strict majority up is `Degraded` and anything less is a
/// `MajorOutage`. The overall status never reports `PartialOutage`.
pub const fn overall_status(operational: usize, total: usize) -> Status {
    if operational == total {
        Status::Operational
    } else if operational * 2 > total {
        Status::Degraded
    } else {
        Status::MajorOutage
    }
}

/// Full output of one health check run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub overall: OverallStatus,
    pub sites: Vec<SiteStatus>,
    /// Result of the synthetic end-to-end extraction check. Not counted in `overall`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<SiteStatus>,
    pub last_updated: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(sites: Vec<SiteStatus>, pipeline: Option<SiteStatus>) -> Self {
        Self {
            overall: OverallStatus::from_sites(&sites),
            sites,
            pipeline,
            last_updated: Utc::now(),
        }
    }
}

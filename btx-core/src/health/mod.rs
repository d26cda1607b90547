//! Site health monitor.
//! # Batching
//!
//! Targets are split into batches of a fixed size. Every probe in a batch runs concurrently
//! under its own deadline and the next batch only starts once the whole previous one has
//! settled, so at most `batch_size` probes are ever in flight. A failing probe only affects
//! its own [`SiteStatus`].
use std::{path::Path, time::Duration};

use btx_common::{
    ahash::AHashSet,
    log::{debug, info, warn},
    SiteStatus, Status, StatusReport,
};
use btx_extractors::{
    extractor_config::BOT_UA,
    registry::{normalize_host, SiteRegistry},
};
use futures::future::join_all;
use serde::Deserialize;
use tokio::time::{timeout, Instant};
use url::{Position, Url};

use crate::{
    config::AppConfig,
    error::CoreError,
    progress::{no_op_probe_listener, SharedProbeListener},
};

pub mod pipeline;
pub mod probe;

pub use pipeline::PipelineCheck;
pub use probe::{classify, HttpProbe, Probe, ProbeOutcome};

pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Requests a single probe may issue: HEAD, GET, mirror GET, bot HEAD and bot GET.
const MAX_ATTEMPTS: u32 = 5;

/// One site to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub name: String,
    pub url: Url,
    /// Host (optionally with a port) to retry against when the primary refuses.
    pub mirror_host: Option<String>,
}

impl ProbeTarget {
    /// The probe URL moved onto the mirror host, keeping scheme, path and query.
    pub fn mirror_url(&self) -> Option<Url> {
        let mirror = self.mirror_host.as_deref()?;
        Url::parse(&format!(
            "{}://{mirror}{}",
            self.url.scheme(),
            &self.url[Position::BeforePath..]
        ))
        .ok()
    }
}

/// Entry of the long-tail site list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LongTailSite {
    pub name: String,
    pub url: String,
}

/// Reads a JSON array of `{ "name", "url" }` objects.
pub async fn load_long_tail(path: &Path) -> Result<Vec<LongTailSite>, CoreError> {
    let contents = tokio::fs::read_to_string(path).await?;
    let sites: Vec<LongTailSite> = btx_common::serde_json::from_str(&contents)?;
    debug!("Loaded {} long-tail sites from {}", sites.len(), path.display());
    Ok(sites)
}

/// Builds the probe list: the catalog in rank order, then long-tail sites whose host the
/// catalog does not already cover.
pub fn targets_from(registry: &SiteRegistry, long_tail: &[LongTailSite]) -> Vec<ProbeTarget> {
    let mut seen: AHashSet<String> = AHashSet::new();
    let mut targets = Vec::with_capacity(registry.len() + long_tail.len());

    let catalog = registry
        .ranked()
        .into_iter()
        .map(|profile| {
            (
                profile.name.as_str(),
                profile.probe_url.as_str(),
                profile.mirror_host.clone(),
            )
        });
    let extra = long_tail
        .iter()
        .map(|site| (site.name.as_str(), site.url.as_str(), None));

    for (name, raw_url, mirror_host) in catalog.chain(extra) {
        let Ok(url) = Url::parse(raw_url) else {
            warn!("Skipping {name}: invalid probe URL {raw_url}");
            continue;
        };
        let Some(host) = url.host_str().map(normalize_host) else {
            warn!("Skipping {name}: probe URL has no host");
            continue;
        };

        if !seen.insert(host) {
            debug!("Skipping {name}: host already probed");
            continue;
        }

        targets.push(ProbeTarget {
            name: name.to_string(),
            url,
            mirror_host,
        });
    }

    targets
}

/// Probes sites in bounded batches and aggregates their status.
#[derive(Debug)]
pub struct HealthMonitor<P = HttpProbe> {
    probe: P,
    batch_size: usize,
    deadline: Duration,
    pipeline: Option<PipelineCheck>,
    listener: SharedProbeListener,
}

impl HealthMonitor<HttpProbe> {
    /// A monitor probing over HTTP with the timeouts and user agents from `config`.
    ///
    /// The pipeline check is enabled when both `self_check_target` and an endpoint are known.
    /// `default_endpoint` is used when the config does not set `self_check_endpoint`.
    pub fn from_config(
        config: &AppConfig,
        default_endpoint: Option<&str>,
    ) -> Result<Self, CoreError> {
        let gateway = config.gateway()?;
        let bot_ua = if config.fetch.bot_user_agent.is_empty() {
            BOT_UA
        } else {
            config.fetch.bot_user_agent.as_str()
        };

        let probe = HttpProbe::new(
            gateway.clone(),
            &config.fetch.user_agent,
            bot_ua,
            config.probe_timeout(),
        );

        let mut monitor = Self::new(probe)
            .with_batch_size(config.health.batch_size)
            .with_deadline(config.probe_timeout() * MAX_ATTEMPTS);

        let endpoint = config
            .health
            .self_check_endpoint
            .as_deref()
            .or(default_endpoint);
        if let (Some(target), Some(endpoint)) = (&config.health.self_check_target, endpoint) {
            let client = btx_common::reqwest::Client::builder()
                .user_agent(gateway.user_agent())
                .build()
                .map_err(btx_extractors::error::ExtractorError::from)?;
            monitor = monitor.with_pipeline_check(PipelineCheck::new(
                client,
                endpoint,
                target,
                config.page_timeout(),
            )?);
        }

        Ok(monitor)
    }
}

impl<P: Probe> HealthMonitor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            batch_size: DEFAULT_BATCH_SIZE,
            deadline: btx_extractors::gateway::DEFAULT_PROBE_TIMEOUT * MAX_ATTEMPTS,
            pipeline: None,
            listener: no_op_probe_listener(),
        }
    }

    /// Sets how many probes run at once. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the deadline of a whole probe, ladder included.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_pipeline_check(mut self, check: PipelineCheck) -> Self {
        self.pipeline = Some(check);
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: SharedProbeListener) -> Self {
        self.listener = listener;
        self
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Probes every target and builds a [`StatusReport`]. Sites keep the order of `targets`.
    pub async fn check_all(&self, targets: &[ProbeTarget]) -> StatusReport {
        info!(
            "Checking {} sites in batches of {}",
            targets.len(),
            self.batch_size
        );
        self.listener.set_total(targets.len() as u64);

        let mut sites = Vec::with_capacity(targets.len());
        for batch in targets.chunks(self.batch_size) {
            sites.extend(join_all(batch.iter().map(|target| self.check_one(target))).await);
        }

        let pipeline = match &self.pipeline {
            Some(check) => Some(check.run().await),
            None => None,
        };

        self.listener.done();

        let report = StatusReport::new(sites, pipeline);
        info!(
            "{}/{} sites operational",
            report.overall.operational_count, report.overall.total_count
        );
        report
    }

    async fn check_one(&self, target: &ProbeTarget) -> SiteStatus {
        let started = Instant::now();
        let outcome = timeout(self.deadline, self.probe.probe(target)).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (status, error) = match outcome {
            Ok(outcome) => classify(&outcome),
            Err(_) => (Status::Degraded, Some(String::from("Timed out"))),
        };

        if status != Status::Operational {
            debug!("{} is {status}: {}", target.name, error.as_deref().unwrap_or_default());
        }

        let site = SiteStatus::new(&target.name, status, elapsed, error);
        self.listener.site_done(&site);
        site
    }
}

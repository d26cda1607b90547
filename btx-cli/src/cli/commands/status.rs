use std::path::PathBuf;

use btx_common::StatusReport;
use btx_core::{
    health::{load_long_tail, targets_from, HealthMonitor},
    progress::SharedProbeListener,
    AppConfig,
};
use btx_extractors::registry::SiteRegistry;
use clap::Args;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct StatusCheck {
    /// Number of sites probed at once
    ///
    /// [default: value from the config file]
    #[clap(
        short = 'n',
        long,
        value_parser(clap::value_parser!(u16).range(1..=100)),
        help_heading = "HEALTH"
    )]
    pub batch_size: Option<u16>,

    /// JSON file with additional `{ "name", "url" }` sites to probe
    #[clap(long, value_name = "FILE", help_heading = "HEALTH")]
    pub long_tail: Option<PathBuf>,

    /// Print the raw JSON report
    #[clap(long, value_parser, default_value_t = false, help_heading = "OUTPUT")]
    pub json: bool,
}

impl StatusCheck {
    pub async fn run(
        &self,
        config: &AppConfig,
        registry: &SiteRegistry,
        listener: SharedProbeListener,
    ) -> Result<StatusReport, CliError> {
        let long_tail = match self.long_tail.as_ref().or(config.health.long_tail.as_ref()) {
            Some(path) => load_long_tail(path).await?,
            None => Vec::new(),
        };
        let targets = targets_from(registry, &long_tail);

        let mut monitor = HealthMonitor::from_config(config, None)?.with_listener(listener);
        if let Some(batch_size) = self.batch_size {
            monitor = monitor.with_batch_size(usize::from(batch_size));
        }

        Ok(monitor.check_all(&targets).await)
    }
}


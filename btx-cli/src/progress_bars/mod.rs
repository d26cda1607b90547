use btx_common::{SiteStatus, Status};
use btx_core::progress::ProbeListener;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use owo_colors::OwoColorize;
use std::{fmt::Write, time::Duration};

const PROGRESS_CHARS: &str = "━━";
const TEMPLATE: &str = "{spinner:.green.bold} {elapsed_precise:.bold} {wide_bar:.green/white.dim} {percent:.bold}  {pos:.green} {msg}";

/// Renders health check progress with `indicatif`.
///
/// Sites that are not operational are printed above the bar as soon as their probe settles.
#[derive(Debug)]
pub struct IndicatifProbeHandler {
    bar: ProgressBar,
    verbose: bool,
}

impl IndicatifProbeHandler {
    /// # Arguments
    /// * `verbose`: also print operational sites as they finish.
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new(0).with_style(master_progress_style());
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, verbose }
    }

    /// A handler drawing nothing, for `--json` output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            verbose: false,
        }
    }
}

impl ProbeListener for IndicatifProbeHandler {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    fn site_done(&self, status: &SiteStatus) {
        self.bar.inc(1);
        self.bar.set_message(status.name.clone());

        if status.status != Status::Operational || self.verbose {
            self.bar.println(format!(
                "{} {}",
                status.name.blue().italic(),
                status_label(status)
            ));
        }
    }

    fn done(&self) {
        self.bar.finish_and_clear();
    }
}

/// Colored `status (error)` label used both while probing and in the final summary.
pub fn status_label(status: &SiteStatus) -> String {
    let label = match status.status {
        Status::Operational => status.status.green().bold().to_string(),
        Status::Degraded => status.status.yellow().bold().to_string(),
        Status::PartialOutage => status.status.bright_red().bold().to_string(),
        Status::MajorOutage => status.status.red().bold().to_string(),
    };

    match &status.error {
        Some(error) => format!("{label} ({error})"),
        None => label,
    }
}

fn master_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("pos", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{}/{}", state.pos(), state.len().unwrap_or_default());
        })
        .with_key("percent", |state: &ProgressState, w: &mut dyn Write| {
            let _ = write!(w, "{:>3.0}%", state.fraction() * 100_f32);
        })
        .progress_chars(PROGRESS_CHARS)
}

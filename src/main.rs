#![deny(clippy::all)]
use std::sync::Arc;

use booru_tag_extractor::{serve, AppState};
use btx_cli::cli::extra::{load_config, load_registry};
use btx_cli::cli::{Cli, Commands};
use btx_cli::clap::Parser;
use btx_cli::progress_bars::{status_label, IndicatifProbeHandler};
use btx_common::{ExtractionResult, StatusReport, TagCategory};
use btx_extractors::registry::SiteRegistry;
use color_eyre::eyre::Result;
use owo_colors::OwoColorize;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    env_logger::builder().format_timestamp(None).init();
    color_eyre::install()?;

    let config = load_config(args.config.as_deref()).await?;
    let registry = load_registry(&config)?;

    match &args.mode {
        Commands::Extract(com) => {
            let result = com.run(&config, registry).await?;
            if com.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result, &com.categories());
            }
        }
        Commands::Status(com) => {
            let handler = if com.json {
                IndicatifProbeHandler::hidden()
            } else {
                IndicatifProbeHandler::new(false)
            };
            let report = com.run(&config, &registry, Arc::new(handler)).await?;
            if com.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Sites => print_sites(&registry),
        Commands::Serve(com) => {
            let addr = com.bind_addr(&config)?;
            let endpoint = com.self_check_endpoint(&config)?;
            let state = AppState::from_config(&config, registry, &endpoint).await?;
            serve(addr, state).await?;
        }
    }

    Ok(())
}

fn print_result(result: &ExtractionResult, categories: &[TagCategory]) {
    println!(
        "{} {}",
        result.site_name.bold().blue(),
        format!("({} tags)", result.tag_count()).italic()
    );

    if let Some(title) = &result.title {
        println!(" - {} {}", "Title:".bold().blue(), title.bold());
    }
    if let Some(image) = &result.image_url {
        println!(" - {} {}", "Image:".bold().blue(), image.purple().underline());
    }

    for category in categories {
        let values: Vec<&str> = result.tags.values(*category).collect();
        if values.is_empty() {
            continue;
        }
        println!(
            " - {} {}",
            format!("{category}:").bold().green(),
            values.join(", ")
        );
    }

    for warning in &result.warnings {
        println!("{} {}", "Warning:".bold().yellow(), warning.yellow());
    }
}

fn print_report(report: &StatusReport) {
    for site in &report.sites {
        println!(
            "{:<24} {} {}",
            site.name.bold(),
            status_label(site),
            format!("{}ms", site.response_time_ms).dimmed()
        );
    }

    if let Some(pipeline) = &report.pipeline {
        println!("{:<24} {}", pipeline.name.bold().purple(), status_label(pipeline));
    }

    println!(
        "\n{} {}/{} {} ({}%)",
        report.overall.status.bold().blue(),
        report.overall.operational_count.to_string().bold().green(),
        report.overall.total_count,
        "sites operational".bold(),
        report.overall.uptime_percentage
    );
}

fn print_sites(registry: &SiteRegistry) {
    println!(
        "{}\n----------------",
        "Supported Sites:".underline().bold().blue()
    );

    for profile in registry.ranked() {
        println!(
            "{:<6} {:<20} {}",
            format!("[{}]", profile.rank),
            profile.name.bold().green(),
            profile.domain.purple().underline()
        );
    }
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use clap::Parser as _;
use collectd_summary_model::{append_report, load_report, load_reports, RunReport};
use collectd_summariser::filter::latest_reports_by_host_and_config;
use collectd_summariser::render::render_report;
use collectd_summariser::Config;
use log::{debug, info};

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let args = cli::CliArgs::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = args.log_level {
        logger.filter_level(level);
    }
    logger.try_init()?;

    debug!("{CRATE_NAME} {CRATE_VERSION}");

    match args.command {
        cli::Command::Parse {
            config,
            host,
            output,
            append,
        } => {
            let mut config = Config::load(config.as_deref()).context("Failed to load config")?;
            if let Some(host) = host {
                config.general.host = host;
            }
            info!(
                "Summarising host {} from {}",
                config.general.host,
                config.general.datadir.display()
            );

            let report = collectd_summariser::execute_report(&config)?;
            print_reports(std::slice::from_ref(&report))?;

            if let Some(path) = output {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                serde_json::to_writer_pretty(file, &report)?;
                info!("Report written to {}", path.display());
            }
            if let Some(path) = append {
                append_report(&report, path.clone())
                    .with_context(|| format!("Failed to append to {}", path.display()))?;
                info!("Report appended to {}", path.display());
            }
        }
        cli::Command::Show { path, all } => {
            let reports = load_saved_reports(&path, all)?;
            print_reports(&reports)?;
        }
    }

    Ok(())
}

/// Load a single `.json` report, or the reports of a `.jsonl` history.
fn load_saved_reports(path: &Path, all: bool) -> anyhow::Result<Vec<RunReport>> {
    debug!("Loading reports from {}", path.display());

    if path.extension().is_some_and(|ext| ext == "jsonl") {
        let reports = load_reports(path.to_path_buf())
            .with_context(|| format!("Failed to load reports from {}", path.display()))?;
        if all {
            return Ok(reports);
        }

        let latest = latest_reports_by_host_and_config(reports);
        for (host, fingerprint, report) in &latest {
            debug!("Selected report for {host} ({fingerprint}): {}", report.window_end);
        }
        Ok(latest.into_iter().map(|(_, _, report)| report).collect())
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(vec![load_report(file)?])
    }
}

fn print_reports(reports: &[RunReport]) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        render_report(report, &mut out)?;
    }
    out.flush()?;
    Ok(())
}

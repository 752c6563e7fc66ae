//! Summary statistics for the CSV output of collectd.
//!
//! The collectd CSV plugin writes one directory per host, one directory per plugin instance
//! (`cpu-0`, `netlink-eth0`, ...) and one file per category and day. This crate reads the samples
//! of a host within a time window, normalizes their units and summarizes each metric with
//! outlier-robust statistics.

use anyhow::Context;
use collectd_summary_model::RunReport;

mod analyze;
mod catalog;
pub mod config;
mod convert;
mod extract;
pub mod family;
pub mod filter;
mod locate;
pub mod render;
mod window;

pub use analyze::{summarize, DEFAULT_OUTLIER_THRESHOLD};
pub use catalog::{MetricCatalog, MetricSeries};
pub use config::{Config, ConfigError};
pub use convert::{convert, parse_raw};
pub use extract::{extract_family, ExtractError, Extractor};
pub use family::Family;
pub use locate::{classify, list_files, list_plugin_dirs, LocateError, PluginFilter, SUFFIX_LEN};
pub use window::{timestamp_from_epoch, TimeWindow};

/// Summarize every enabled family of the configured host over the configured period.
pub fn execute_report(config: &Config) -> anyhow::Result<RunReport> {
    execute_report_in(config, &TimeWindow::last(config.general.period))
}

/// Summarize every enabled family of the configured host within `window`.
///
/// Fails on the first family that can't be extracted.
pub fn execute_report_in(config: &Config, window: &TimeWindow) -> anyhow::Result<RunReport> {
    log::debug!(
        "Summarising {} in {} from {:?}",
        config.general.host,
        config.general.datadir.display(),
        window.start()
    );

    let mut report = RunReport::new(
        config.general.host.clone(),
        config.general.datadir.display().to_string(),
        config.general.period,
        window.start().map(|start| start.timestamp()),
        window.end().timestamp(),
    );

    for family in Family::ALL {
        let Some(catalog) = extract_family(config, family, window)
            .with_context(|| format!("Extract {family} metrics"))?
        else {
            continue;
        };

        let stats = summarize(&catalog, config.stats.outlier_threshold)
            .with_context(|| format!("Summarize {family} metrics"))?;
        report.add_family(family.label().to_string(), stats);
    }

    Ok(report)
}

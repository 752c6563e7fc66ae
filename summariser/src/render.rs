use std::io::Write;

use chrono::DateTime;
use collectd_summary_model::{RunReport, StatSummary};

/// Write a report in the collectd results format.
pub fn render_report<W: Write>(report: &RunReport, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "COLLECTD RESULTS")?;
    writeln!(
        writer,
        "host: {}, window: {} to {}",
        report.host,
        report
            .window_start
            .map(format_timestamp)
            .unwrap_or_else(|| "beginning".to_string()),
        format_timestamp(report.window_end)
    )?;

    for family in &report.families {
        writeln!(writer)?;
        writeln!(writer, "[{}]", family.family)?;
        for stats in &family.stats {
            render_stats(stats, writer)?;
        }
    }

    Ok(())
}

/// Write the statistics of one metric, one dotted line per aggregate.
pub fn render_stats<W: Write>(stats: &StatSummary, writer: &mut W) -> std::io::Result<()> {
    writeln!(
        writer,
        "{} ({} elements, {} outliers)",
        stats.metric.to_uppercase(),
        stats.samples.len(),
        stats.outliers.len()
    )?;

    let aggregates = stats.aggregates();
    let width = aggregates
        .iter()
        .map(|(key, _)| key.len())
        .max()
        .unwrap_or_default();

    for (key, value) in aggregates {
        let dots = ".".repeat(width + 2 - key.len());
        match value {
            Some(value) if stats.unit.is_empty() => writeln!(writer, "{key}{dots}{value:.2}")?,
            Some(value) => writeln!(writer, "{key}{dots}{value:.2} {}", stats.unit)?,
            None => writeln!(writer, "{key}{dots}n/a")?,
        }
    }

    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| secs.to_string())
}

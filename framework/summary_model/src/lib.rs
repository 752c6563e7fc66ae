use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Statistics for a single metric series
///
/// All the numeric aggregates are `None` when the series has no samples, so that an empty series
/// is still reported (as "0 elements") rather than failing the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatSummary {
    /// The metric name, `<instance> <category>[ <subcategory>]`
    pub metric: String,
    /// The unit label of the samples, possibly empty
    pub unit: String,
    /// Every sample in file and row encounter order
    pub samples: Vec<f64>,
    /// The samples rejected by the outlier filter
    ///
    /// This is a sub-multiset of [StatSummary::samples], in sample order.
    pub outliers: Vec<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub average_no_outliers: Option<f64>,
    pub std: Option<f64>,
    pub std_no_outliers: Option<f64>,
}

impl StatSummary {
    /// A summary for a metric without any samples.
    pub fn empty(metric: String, unit: String) -> Self {
        Self {
            metric,
            unit,
            samples: Vec::with_capacity(0),
            outliers: Vec::with_capacity(0),
            min: None,
            max: None,
            average: None,
            average_no_outliers: None,
            std: None,
            std_no_outliers: None,
        }
    }

    /// The aggregates in report order, keyed by their display name.
    pub fn aggregates(&self) -> [(&'static str, Option<f64>); 6] {
        [
            ("min", self.min),
            ("max", self.max),
            ("average", self.average),
            ("average_no_outliers", self.average_no_outliers),
            ("std", self.std),
            ("std_no_outliers", self.std_no_outliers),
        ]
    }
}

/// The statistics for every metric of one family, in metric declaration order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyReport {
    /// The family label, for example `cpu` or `netlink`
    pub family: String,
    pub stats: Vec<StatSummary>,
}

/// The result of one summariser run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// The host whose collectd data was summarised
    pub host: String,
    /// The collectd CSV data root
    pub datadir: String,
    /// The configured retention period in seconds, `<= 0` meaning unbounded
    pub period: i64,
    /// The inclusive lower bound of the query window
    ///
    /// This is a Unix timestamp in seconds. It is not set when the window is unbounded.
    pub window_start: Option<i64>,
    /// The time the data was parsed, which bounds the query window from above
    ///
    /// This is a Unix timestamp in seconds.
    pub window_end: i64,
    /// The families in the order they were extracted
    pub families: Vec<FamilyReport>,
}

impl RunReport {
    /// Create a new report with no families
    pub fn new(
        host: String,
        datadir: String,
        period: i64,
        window_start: Option<i64>,
        window_end: i64,
    ) -> Self {
        Self {
            host,
            datadir,
            period,
            window_start,
            window_end,
            families: Vec::new(),
        }
    }

    /// Add the statistics of a family
    pub fn add_family(&mut self, family: String, stats: Vec<StatSummary>) {
        self.families.push(FamilyReport { family, stats });
    }

    /// Look up the statistics of a family by label
    pub fn family(&self, family: &str) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.family == family)
    }

    /// Compute a fingerprint for this report
    ///
    /// The fingerprint is intended to identify the configuration that produced the report. It uses
    /// the
    ///     - Host
    ///     - Data directory
    ///     - Period
    ///     - Family labels
    ///
    /// The fingerprint is computed using [sha3::Sha3_256].
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.host.as_bytes());
        Digest::update(&mut hasher, self.datadir.as_bytes());
        Digest::update(&mut hasher, self.period.to_le_bytes());
        self.families
            .iter()
            .map(|f| f.family.as_str())
            .sorted()
            .for_each(|family| {
                Digest::update(&mut hasher, family.as_bytes());
            });

        format!("{:x}", hasher.finalize())
    }
}

/// Append the report to a file
///
/// The report will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_report(report: &RunReport, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_report(report, &mut file)?;
    let _ = file.write("\n".as_bytes())?;
    Ok(())
}

/// Serialize the report to a writer
pub fn store_report<W: Write>(report: &RunReport, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer(writer, report)?;
    Ok(())
}

/// Load a report from a reader
pub fn load_report<R: Read>(reader: R) -> anyhow::Result<RunReport> {
    let reader = std::io::BufReader::new(reader);
    let report: RunReport = serde_json::from_reader(reader)?;
    Ok(report)
}

/// Load reports from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_report].
pub fn load_reports(path: PathBuf) -> anyhow::Result<Vec<RunReport>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut reports = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let report: RunReport = serde_json::from_str(&line)?;
        reports.push(report);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_report(window_end: i64) -> RunReport {
        let mut report = RunReport::new(
            "host1".to_string(),
            "/var/lib/collectd/csv".to_string(),
            0,
            None,
            window_end,
        );
        report.add_family(
            "cpu".to_string(),
            vec![StatSummary {
                metric: "cpu-0 user".to_string(),
                unit: "jiffies".to_string(),
                samples: vec![1.0, 2.0, 100.0],
                outliers: vec![100.0],
                min: Some(1.0),
                max: Some(100.0),
                average: Some(103.0 / 3.0),
                average_no_outliers: Some(1.5),
                std: Some(46.43),
                std_no_outliers: Some(0.5),
            }],
        );
        report.add_family(
            "memory".to_string(),
            vec![StatSummary::empty(
                "memory memory-used".to_string(),
                "MB".to_string(),
            )],
        );
        report
    }

    #[test]
    fn fingerprint_ignores_window_and_family_order() {
        let report = test_report(1_700_000_000);
        let mut later = test_report(1_700_000_600);
        later.families.reverse();

        assert_eq!(report.fingerprint(), later.fingerprint());
    }

    #[test]
    fn fingerprint_changes_with_host() {
        let report = test_report(1_700_000_000);
        let mut other = report.clone();
        other.host = "host2".to_string();

        assert_ne!(report.fingerprint(), other.fingerprint());
    }

    #[test]
    fn store_and_load_report() {
        let report = test_report(1_700_000_000);

        let mut buf = Vec::new();
        store_report(&report, &mut buf).unwrap();
        let loaded = load_report(buf.as_slice()).unwrap();

        assert_eq!(report, loaded);
        assert_eq!(
            vec!["cpu", "memory"],
            loaded
                .families
                .iter()
                .map(|f| f.family.as_str())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn append_and_load_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        append_report(&test_report(1), path.clone()).unwrap();
        append_report(&test_report(2), path.clone()).unwrap();

        let reports = load_reports(path).unwrap();
        assert_eq!(2, reports.len());
        assert_eq!(1, reports[0].window_end);
        assert_eq!(2, reports[1].window_end);
    }

    #[test]
    fn empty_summary_has_no_aggregates() {
        let summary = StatSummary::empty("memory memory-free".to_string(), "MB".to_string());
        assert!(summary.aggregates().iter().all(|(_, v)| v.is_none()));
    }
}

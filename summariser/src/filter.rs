use collectd_summary_model::RunReport;
use itertools::Itertools;

/// Keep the most recent report for each host and configuration fingerprint.
///
/// Reports are returned ordered by host, then by when they were produced.
pub fn latest_reports_by_host_and_config(
    reports: Vec<RunReport>,
) -> Vec<(String, String, RunReport)> {
    reports
        .into_iter()
        .into_group_map_by(|report| (report.host.clone(), report.fingerprint()))
        .into_iter()
        .filter_map(|((host, fingerprint), reports)| {
            reports
                .into_iter()
                .max_by_key(|report| report.window_end)
                .map(|report| (host, fingerprint, report))
        })
        .sorted_by_key(|(host, _, report)| (host.clone(), report.window_end))
        .collect::<Vec<_>>()
}

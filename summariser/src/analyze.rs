use std::collections::HashMap;

use anyhow::Context;
use collectd_summary_model::StatSummary;
use itertools::Itertools;
use polars::prelude::*;

use crate::catalog::{MetricCatalog, MetricSeries};

/// Default modified z-score at or above which a sample is an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Summarize every series of the catalog, in catalog order.
pub fn summarize(catalog: &MetricCatalog, threshold: f64) -> anyhow::Result<Vec<StatSummary>> {
    catalog
        .iter()
        .map(|series| {
            summarize_series(series, threshold)
                .with_context(|| format!("Summarize {}", series.name))
        })
        .collect()
}

pub(crate) fn summarize_series(
    series: &MetricSeries,
    threshold: f64,
) -> anyhow::Result<StatSummary> {
    if series.samples.is_empty() {
        return Ok(StatSummary::empty(series.name.clone(), series.unit.clone()));
    }

    let (kept, outliers) = reject_outliers(&series.samples, threshold)?;

    let all = standard_stats(&series.samples).context("All samples")?;
    let no_outliers = if kept.is_empty() {
        None
    } else {
        Some(standard_stats(&kept).context("Samples without outliers")?)
    };

    Ok(StatSummary {
        metric: series.name.clone(),
        unit: series.unit.clone(),
        samples: series.samples.clone(),
        outliers,
        min: Some(all.min),
        max: Some(all.max),
        average: Some(all.mean),
        average_no_outliers: no_outliers.as_ref().map(|s| s.mean),
        std: Some(all.std),
        std_no_outliers: no_outliers.as_ref().map(|s| s.std),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StandardStats {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Mean, population standard deviation, min and max of a non-empty set of samples.
pub(crate) fn standard_stats(values: &[f64]) -> anyhow::Result<StandardStats> {
    let value_series = Series::new("value".into(), values);

    let mean = value_series.mean().context("Mean")?;
    let std = value_series.std(0).context("Std")?;
    let min = value_series
        .min::<f64>()
        .context("Min")?
        .context("Missing min")?;
    let max = value_series
        .max::<f64>()
        .context("Max")?
        .context("Missing max")?;

    Ok(StandardStats {
        mean,
        std,
        min,
        max,
    })
}

/// Split samples into the ones kept by the modified z-score filter and the outliers.
///
/// The score of a sample is its absolute deviation from the median, divided by the median of all
/// absolute deviations. When that median deviation is zero the deviation is used as is. Samples
/// scoring at or above `threshold` are outliers.
///
/// Outliers are the multiset difference of the samples and the kept samples, so a value that
/// occurs several times is matched once per occurrence.
pub(crate) fn reject_outliers(
    samples: &[f64],
    threshold: f64,
) -> anyhow::Result<(Vec<f64>, Vec<f64>)> {
    let centre = median(samples).context("Median")?;
    let deviations = samples
        .iter()
        .map(|x| (x - centre).abs())
        .collect::<Vec<_>>();
    let mdev = median(&deviations).context("Median deviation")?;
    let divisor = if mdev != 0.0 { mdev } else { 1.0 };

    let kept = samples
        .iter()
        .zip(deviations.iter())
        .filter(|(_, d)| *d / divisor < threshold)
        .map(|(x, _)| *x)
        .collect::<Vec<_>>();
    let outliers = multiset_difference(samples, &kept);

    Ok((kept, outliers))
}

fn median(values: &[f64]) -> Option<f64> {
    Series::new("value".into(), values).median()
}

/// The elements of `all` left after removing each element of `subset` once, in `all` order.
fn multiset_difference(all: &[f64], subset: &[f64]) -> Vec<f64> {
    let mut remaining: HashMap<u64, usize> = subset.iter().counts_by(|v| v.to_bits());

    all.iter()
        .filter(|v| match remaining.get_mut(&v.to_bits()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, samples: Vec<f64>) -> MetricSeries {
        MetricSeries {
            name: name.to_string(),
            unit: "MB".to_string(),
            samples,
        }
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn constant_series_has_no_outliers() {
        let (kept, outliers) = reject_outliers(&[5.0, 5.0, 5.0, 5.0], 3.0).unwrap();

        assert_eq!(vec![5.0, 5.0, 5.0, 5.0], kept);
        assert!(outliers.is_empty());
    }

    #[test]
    fn single_extreme_value_is_an_outlier() {
        // median 3, deviations [2, 1, 0, 1, 97], median deviation 1
        let (kept, outliers) = reject_outliers(&[1.0, 2.0, 3.0, 4.0, 100.0], 3.0).unwrap();

        assert_eq!(vec![1.0, 2.0, 3.0, 4.0], kept);
        assert_eq!(vec![100.0], outliers);
    }

    #[test]
    fn score_equal_to_threshold_is_an_outlier() {
        // median 2, deviations [1, 0, 0, 1, 3], median deviation 1, score of 5 is exactly 3
        let (kept, outliers) = reject_outliers(&[1.0, 2.0, 2.0, 3.0, 5.0], 3.0).unwrap();

        assert_eq!(vec![1.0, 2.0, 2.0, 3.0], kept);
        assert_eq!(vec![5.0], outliers);
    }

    #[test]
    fn zero_median_deviation_divides_by_one() {
        // median 1, median deviation 0, so the raw deviations are the scores
        let (kept, outliers) = reject_outliers(&[1.0, 1.0, 1.0, 3.0, 4.5], 3.0).unwrap();

        assert_eq!(vec![1.0, 1.0, 1.0, 3.0], kept);
        assert_eq!(vec![4.5], outliers);
    }

    #[test]
    fn duplicate_outliers_are_kept() {
        let (_, outliers) =
            reject_outliers(&[1.0, 100.0, 2.0, 2.0, 3.0, 2.0, 100.0], 3.0).unwrap();

        assert_eq!(vec![100.0, 100.0], outliers);
    }

    #[test]
    fn threshold_is_configurable() {
        let (_, outliers) = reject_outliers(&[1.0, 2.0, 3.0, 4.0, 100.0], 200.0).unwrap();
        assert!(outliers.is_empty());
    }

    #[test]
    fn multiset_difference_matches_each_occurrence_once() {
        assert_eq!(
            vec![2.0, 3.0],
            multiset_difference(&[2.0, 1.0, 2.0, 3.0], &[1.0, 2.0])
        );
    }

    #[test]
    fn summary_of_series() {
        let summary =
            summarize_series(&series("eth0 if_octets rx", vec![1.0, 2.0, 3.0, 4.0, 100.0]), 3.0)
                .unwrap();

        assert_eq!("eth0 if_octets rx", summary.metric);
        assert_eq!("MB", summary.unit);
        assert_eq!(vec![100.0], summary.outliers);
        assert_eq!(Some(1.0), summary.min);
        assert_eq!(Some(100.0), summary.max);
        assert_close(22.0, summary.average.unwrap());
        assert_close(39.01281840626232, summary.std.unwrap());
        assert_close(2.5, summary.average_no_outliers.unwrap());
        assert_close(1.118033988749895, summary.std_no_outliers.unwrap());
    }

    #[test]
    fn empty_series_has_no_aggregates() {
        let summary = summarize_series(&series("memory memory-used", vec![]), 3.0).unwrap();

        assert!(summary.samples.is_empty());
        assert!(summary.outliers.is_empty());
        assert_eq!(None, summary.min);
        assert_eq!(None, summary.average);
        assert_eq!(None, summary.std_no_outliers);
    }

    #[test]
    fn summaries_follow_catalog_order() {
        let mut catalog = MetricCatalog::new();
        catalog.declare("z".to_string(), "");
        catalog.declare("a".to_string(), "");
        catalog.push("a", 1.0);

        let summaries = summarize(&catalog, DEFAULT_OUTLIER_THRESHOLD).unwrap();

        assert_eq!(
            vec!["z", "a"],
            summaries
                .iter()
                .map(|s| s.metric.as_str())
                .collect::<Vec<_>>()
        );
        assert_eq!(Some(0.0), summaries[1].std);
    }
}

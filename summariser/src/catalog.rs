use std::collections::HashMap;

/// An ordered sequence of samples for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub name: String,
    pub unit: String,
    /// Samples in file and row encounter order, not necessarily sorted by time.
    pub samples: Vec<f64>,
}

/// The metrics extracted for a family, keyed by metric name.
///
/// A catalog is built in two phases. Every metric the configuration asks for is declared up front
/// so that it is reported even when no samples are found, then samples are pushed to the declared
/// series while scanning files. Iteration follows declaration order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MetricCatalog {
    series: Vec<MetricSeries>,
    index: HashMap<String, usize>,
}

impl MetricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a metric with no samples.
    ///
    /// Declaring a metric twice keeps the first declaration.
    pub fn declare(&mut self, name: String, unit: &str) {
        if self.index.contains_key(&name) {
            return;
        }

        self.index.insert(name.clone(), self.series.len());
        self.series.push(MetricSeries {
            name,
            unit: unit.to_string(),
            samples: Vec::new(),
        });
    }

    /// Append a sample to a declared metric.
    ///
    /// Returns `false` if the metric was never declared.
    pub fn push(&mut self, name: &str, value: f64) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.series[i].samples.push(value);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&MetricSeries> {
        self.index.get(name).map(|&i| &self.series[i])
    }

    /// The series in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricSeries> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples across all series.
    pub fn sample_count(&self) -> usize {
        self.series.iter().map(|s| s.samples.len()).sum()
    }

    /// Move the series of `other` into this catalog, after the existing ones.
    pub fn merge(&mut self, other: MetricCatalog) {
        for series in other.series {
            match self.index.get(&series.name) {
                Some(&i) => self.series[i].samples.extend(series.samples),
                None => {
                    self.index.insert(series.name.clone(), self.series.len());
                    self.series.push(series);
                }
            }
        }
    }
}

impl IntoIterator for MetricCatalog {
    type Item = MetricSeries;
    type IntoIter = std::vec::IntoIter<MetricSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.into_iter()
    }
}

use std::path::{Path, PathBuf};

use crate::catalog::MetricCatalog;
use crate::config::{instance_dirs, Config};
use crate::convert::{convert, parse_raw};
use crate::family::{self, ColumnSpec, Family, SourceSpec, VPP_HICN_NODE_DIR};
use crate::locate::{classify, list_files, list_plugin_dirs, LocateError, PluginFilter};
use crate::window::{timestamp_from_epoch, TimeWindow};

/// Name of the timestamp column of every collectd CSV file.
const EPOCH_COLUMN: &str = "epoch";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error("Failed to read {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Missing column `{column}` in {}", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("Invalid `{column}` value {value:?} on line {line} of {}", path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
}

/// Reads the samples of one source of metrics into a [`MetricCatalog`].
pub struct Extractor<'a> {
    root: &'a Path,
    host: &'a str,
    window: &'a TimeWindow,
    spec: SourceSpec,
    filter: PluginFilter,
    categories: &'a [String],
}

impl<'a> Extractor<'a> {
    /// Create an extractor for `spec`.
    ///
    /// When `instances` is empty the plugin directories are found with the pattern of `spec`.
    pub fn new(
        root: &'a Path,
        host: &'a str,
        window: &'a TimeWindow,
        spec: SourceSpec,
        instances: Vec<String>,
        categories: &'a [String],
    ) -> Self {
        let filter = PluginFilter::new(instances, spec.pattern, spec.exclude);
        Self {
            root,
            host,
            window,
            spec,
            filter,
            categories,
        }
    }

    /// Extract every configured metric.
    ///
    /// Metrics without samples in the window are still part of the catalog.
    pub fn extract(&self) -> Result<MetricCatalog, ExtractError> {
        let dirs = list_plugin_dirs(self.root, self.host, &self.filter)?;

        let mut catalog = MetricCatalog::new();
        for instance in self.instances(&dirs) {
            self.declare(&mut catalog, &instance);
        }

        for dir in &dirs {
            let instance = instance_name(dir);
            for file in list_files(dir)? {
                let Some(category) = classify(&file, self.categories) else {
                    log::trace!("Skipping {}", file.display());
                    continue;
                };
                let Some(columns) = self.spec.schema.columns(category) else {
                    log::warn!(
                        "No columns known for category {category}, skipping {}",
                        file.display()
                    );
                    continue;
                };

                let samples =
                    self.scan_file(&file, &instance, category, columns, &mut catalog)?;
                log::debug!("Read {samples} samples from {}", file.display());
            }
        }

        Ok(catalog)
    }

    /// The instances to declare metrics for.
    ///
    /// Configured instances are all declared, even those without a directory, so that missing
    /// data shows up in the report.
    fn instances(&self, dirs: &[PathBuf]) -> Vec<String> {
        match &self.filter {
            PluginFilter::Named(names) => {
                for name in names {
                    if !dirs.iter().any(|dir| instance_name(dir) == *name) {
                        log::warn!("No plugin directory for {name} of host {}", self.host);
                    }
                }
                let mut names = names.clone();
                names.sort();
                names.dedup();
                names
            }
            PluginFilter::Contains { .. } => dirs.iter().map(|dir| instance_name(dir)).collect(),
        }
    }

    fn declare(&self, catalog: &mut MetricCatalog, instance: &str) {
        for category in self.categories {
            match self.spec.schema.columns(category) {
                Some(columns) => {
                    for column in columns {
                        catalog.declare(column.metric_name(instance, category), column.unit);
                    }
                }
                None => log::warn!("Unknown category {category} for {instance}"),
            }
        }
    }

    /// Read the samples of one category file into the catalog, returning how many were read.
    ///
    /// A row that can't be parsed fails the whole file. Values must be finite, so `nan` and
    /// `inf` are rejected unless the source reads `nan` as zero.
    fn scan_file(
        &self,
        path: &Path,
        instance: &str,
        category: &str,
        columns: &[ColumnSpec],
        catalog: &mut MetricCatalog,
    ) -> Result<usize, ExtractError> {
        let csv_error = |source| ExtractError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        let position = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| ExtractError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
        };

        let epoch_index = position(EPOCH_COLUMN)?;
        let targets = columns
            .iter()
            .map(|column| {
                Ok((
                    position(column.column)?,
                    column,
                    column.metric_name(instance, category),
                ))
            })
            .collect::<Result<Vec<_>, ExtractError>>()?;

        let mut samples = 0;
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |index: usize, column: &str| {
                record.get(index).ok_or_else(|| ExtractError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                })
            };
            let invalid = |column: &str, value: &str| ExtractError::InvalidValue {
                path: path.to_path_buf(),
                line,
                column: column.to_string(),
                value: value.to_string(),
            };

            let raw_epoch = field(epoch_index, EPOCH_COLUMN)?;
            let timestamp = parse_raw(raw_epoch, false)
                .ok()
                .and_then(timestamp_from_epoch)
                .ok_or_else(|| invalid(EPOCH_COLUMN, raw_epoch))?;
            if !self.window.in_window(timestamp) {
                continue;
            }

            for (index, column, metric) in &targets {
                let raw = field(*index, column.column)?;
                let value = parse_raw(raw, self.spec.nan_as_zero)
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| invalid(column.column, raw))?;
                if catalog.push(metric, convert(value, column.unit)) {
                    samples += 1;
                } else {
                    log::warn!("Dropping sample for undeclared metric {metric}");
                }
            }
        }

        Ok(samples)
    }
}

/// The base name of a plugin directory, which names the instance in metric names.
fn instance_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Extract the metrics of one family for the configured host.
///
/// Returns `Ok(None)` when the family is disabled.
pub fn extract_family(
    config: &Config,
    family: Family,
    window: &TimeWindow,
) -> Result<Option<MetricCatalog>, ExtractError> {
    let catalog = match family {
        Family::Load if config.load.enabled => extract_source(
            config,
            window,
            family::load(config.load.term),
            Vec::new(),
            &[LOAD_CATEGORY.to_string()],
        )?,
        Family::Cpu if config.cpu.enabled => extract_source(
            config,
            window,
            family::CPU,
            instance_dirs("cpu", &config.cpu.cpus),
            &config.cpu.categories,
        )?,
        Family::Memory if config.memory.enabled => extract_source(
            config,
            window,
            family::MEMORY,
            Vec::new(),
            &config.memory.categories,
        )?,
        Family::Netlink if config.netlink.enabled => extract_source(
            config,
            window,
            family::NETLINK,
            instance_dirs("netlink", &config.netlink.interfaces),
            &config.netlink.categories,
        )?,
        Family::Vpp if config.vpp.enabled => extract_source(
            config,
            window,
            family::VPP,
            instance_dirs("vpp", &config.vpp.interfaces),
            &config.vpp.categories,
        )?,
        Family::VppHicn if config.vpp_hicn.enabled => {
            let mut catalog = extract_source(
                config,
                window,
                family::VPP_HICN_FACES,
                instance_dirs("vpp_hicn", &config.vpp_hicn.faces),
                &config.vpp_hicn.face_categories,
            )?;
            if config.vpp_hicn.node {
                catalog.merge(extract_source(
                    config,
                    window,
                    family::VPP_HICN_NODE,
                    vec![VPP_HICN_NODE_DIR.to_string()],
                    &config.vpp_hicn.node_categories,
                )?);
            }
            catalog
        }
        _ => {
            log::debug!("Family {family} is disabled");
            return Ok(None);
        }
    };

    log::info!(
        "Extracted {} samples for {} {family} metrics",
        catalog.sample_count(),
        catalog.len()
    );

    Ok(Some(catalog))
}

/// The load plugin writes a single `load` category.
const LOAD_CATEGORY: &str = "load";

fn extract_source(
    config: &Config,
    window: &TimeWindow,
    spec: SourceSpec,
    instances: Vec<String>,
    categories: &[String],
) -> Result<MetricCatalog, ExtractError> {
    Extractor::new(
        &config.general.datadir,
        &config.general.host,
        window,
        spec,
        instances,
        categories,
    )
    .extract()
}

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::family::LoadTerm;

/// The built-in configuration, overridden key by key by a user configuration file.
const DEFAULT_CONFIG: &str = include_str!("../default.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Summariser configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    pub general: GeneralConfig,
    pub stats: StatsConfig,
    pub load: LoadConfig,
    pub cpu: CpuConfig,
    pub memory: MemoryConfig,
    pub netlink: InterfacesConfig,
    pub vpp: InterfacesConfig,
    pub vpp_hicn: VppHicnConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Root of the collectd CSV output, one directory per host
    pub datadir: PathBuf,
    pub host: String,
    /// Retention period in seconds, `<= 0` for every sample
    pub period: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StatsConfig {
    pub outlier_threshold: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoadConfig {
    pub enabled: bool,
    pub term: LoadTerm,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CpuConfig {
    pub enabled: bool,
    #[serde(default)]
    pub cpus: Vec<Instance>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub categories: Vec<String>,
}

/// Configuration of a family with one plugin directory per network interface
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InterfacesConfig {
    pub enabled: bool,
    #[serde(default)]
    pub interfaces: Vec<Instance>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VppHicnConfig {
    pub enabled: bool,
    #[serde(default)]
    pub faces: Vec<Instance>,
    /// Whether to read the forwarder node counters
    pub node: bool,
    pub face_categories: Vec<String>,
    pub node_categories: Vec<String>,
}

/// A plugin instance, the part of the directory name after the family prefix
///
/// This allows both `cpus = [0, 3]` and `interfaces = ["eth0"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Instance {
    Index(u64),
    Name(String),
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Index(index) => write!(f, "{index}"),
            Instance::Name(name) => write!(f, "{name}"),
        }
    }
}

/// The plugin directory names of `instances`, e.g. `cpu-0` for instance `0` of `cpu`.
pub fn instance_dirs(prefix: &str, instances: &[Instance]) -> Vec<String> {
    instances
        .iter()
        .map(|instance| format!("{prefix}-{instance}"))
        .collect()
}

impl Config {
    /// Load the default configuration, with the file at `path` merged on top if given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                log::info!("Loading config: {}", path.display());
                let content =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Self::from_toml_str(&content)
            }
            None => Self::from_toml_str(""),
        }
    }

    /// Parse a configuration from TOML, merged on top of the default configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        let overrides: toml::Table = toml::from_str(content)?;
        merge(&mut table, overrides);

        let mut config: Config = toml::Value::Table(table).try_into()?;
        config.general.datadir = expand_home(&config.general.datadir);
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.general.host.is_empty() {
            return Err(ConfigError::Invalid("general.host must not be empty".into()));
        }

        let threshold = self.stats.outlier_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "stats.outlier_threshold must be a positive number, got {threshold}"
            )));
        }

        Ok(())
    }
}

/// Merge `overrides` into `base`, recursing into tables present in both.
fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match value {
            toml::Value::Table(nested) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge(existing, nested),
                _ => {
                    base.insert(key, toml::Value::Table(nested));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

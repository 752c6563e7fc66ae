use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Length of the per-file suffix collectd appends to the category, `-YYYY-MM-DD`.
pub const SUFFIX_LEN: usize = 11;

/// Selects the plugin directories of a family under the host directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginFilter {
    /// Only directories with one of these base names, e.g. `cpu-0` and `cpu-3`.
    Named(Vec<String>),
    /// Directories whose base name contains `pattern` and is not listed in `exclude`.
    Contains {
        pattern: String,
        exclude: Vec<String>,
    },
}

impl PluginFilter {
    /// Build the filter for a family.
    ///
    /// An explicit list of instances takes precedence, otherwise every directory containing
    /// `pattern` qualifies.
    pub fn new(instances: Vec<String>, pattern: &str, exclude: &[&str]) -> Self {
        if instances.is_empty() {
            PluginFilter::Contains {
                pattern: pattern.to_string(),
                exclude: exclude.iter().map(|e| e.to_string()).collect(),
            }
        } else {
            PluginFilter::Named(instances)
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            PluginFilter::Named(names) => names.iter().any(|n| n == name),
            PluginFilter::Contains { pattern, exclude } => {
                name.contains(pattern.as_str()) && !exclude.iter().any(|e| e == name)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Data directory not found: {}", path.display())]
    MissingDataDir { path: PathBuf },
    #[error("Host directory not found: {}", path.display())]
    MissingHostDir { path: PathBuf },
    #[error("Failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// List the plugin directories of `host` under `root` that satisfy `filter`, sorted by name.
///
/// A missing data root or host directory is an error rather than an empty result.
pub fn list_plugin_dirs(
    root: &Path,
    host: &str,
    filter: &PluginFilter,
) -> Result<Vec<PathBuf>, LocateError> {
    if !root.is_dir() {
        return Err(LocateError::MissingDataDir {
            path: root.to_path_buf(),
        });
    }

    let host_dir = root.join(host);
    if !host_dir.is_dir() {
        return Err(LocateError::MissingHostDir { path: host_dir });
    }

    let mut dirs = Vec::new();
    for entry in list_entries(&host_dir) {
        let entry = entry.map_err(|source| LocateError::Walk {
            path: host_dir.clone(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        if filter.matches(&entry.file_name().to_string_lossy()) {
            dirs.push(entry.into_path());
        }
    }

    log::debug!(
        "Found {} plugin directories in {} for {filter:?}",
        dirs.len(),
        host_dir.display()
    );

    Ok(dirs)
}

/// List the files in a plugin directory, sorted by name.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, LocateError> {
    let mut files = Vec::new();
    for entry in list_entries(dir) {
        let entry = entry.map_err(|source| LocateError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Map a file to the category it holds, if that category is allowed.
///
/// The category is the base name without the collectd date suffix. Files for other categories
/// return `None` and are expected to be skipped.
pub fn classify<'a>(file: &Path, allowed: &'a [String]) -> Option<&'a str> {
    let name = file.file_name()?.to_str()?;
    let end = name.len().checked_sub(SUFFIX_LEN)?;
    let candidate = name.get(..end)?;

    allowed
        .iter()
        .map(String::as_str)
        .find(|category| *category == candidate)
}

/// The directory entries one level below `dir`, in lexicographic order.
fn list_entries(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn host_tree(dirs: &[&str]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for dir in dirs {
            fs::create_dir_all(root.path().join("host1").join(dir)).unwrap();
        }
        root
    }

    fn names(dirs: &[PathBuf]) -> Vec<String> {
        dirs.iter()
            .map(|d| d.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn classify_strips_date_suffix() {
        let allowed = vec!["if_octets".to_string()];

        assert_eq!(
            Some("if_octets"),
            classify(Path::new("/data/netlink-eth0/if_octets-abcdefghijk"), &allowed)
        );
        assert_eq!(
            Some("if_octets"),
            classify(Path::new("if_octets-2024-01-31"), &allowed)
        );
    }

    #[test]
    fn classify_rejects_unlisted_categories() {
        let allowed = vec!["if_octets".to_string()];

        assert_eq!(None, classify(Path::new("if_packets-2024-01-31"), &allowed));
        assert_eq!(None, classify(Path::new("if_octets"), &allowed));
        assert_eq!(None, classify(Path::new("short"), &allowed));
    }

    #[test]
    fn substring_filter_lists_sorted_dirs() {
        let root = host_tree(&["cpu-2", "memory", "cpu-0", "cpu-10", "load"]);

        let dirs = list_plugin_dirs(
            root.path(),
            "host1",
            &PluginFilter::new(Vec::new(), "cpu", &[]),
        )
        .unwrap();

        assert_eq!(vec!["cpu-0", "cpu-10", "cpu-2"], names(&dirs));
    }

    #[test]
    fn named_filter_takes_precedence() {
        let root = host_tree(&["cpu-0", "cpu-1", "cpu-3"]);

        let filter = PluginFilter::new(vec!["cpu-3".to_string(), "cpu-0".to_string()], "cpu", &[]);
        let dirs = list_plugin_dirs(root.path(), "host1", &filter).unwrap();

        assert_eq!(vec!["cpu-0", "cpu-3"], names(&dirs));
    }

    #[test]
    fn substring_filter_honours_exclusions() {
        let root = host_tree(&["vpp_hicn-0", "vpp_hicn-node", "vpp-0"]);

        let filter = PluginFilter::new(Vec::new(), "vpp_hicn-", &["vpp_hicn-node"]);
        let dirs = list_plugin_dirs(root.path(), "host1", &filter).unwrap();

        assert_eq!(vec!["vpp_hicn-0"], names(&dirs));
    }

    #[test]
    fn files_are_sorted_and_dirs_skipped() {
        let root = host_tree(&["cpu-0/nested"]);
        let dir = root.path().join("host1").join("cpu-0");
        fs::write(dir.join("percent-user-2024-01-02"), "epoch,value\n").unwrap();
        fs::write(dir.join("percent-user-2024-01-01"), "epoch,value\n").unwrap();

        let files = list_files(&dir).unwrap();

        assert_eq!(
            vec!["percent-user-2024-01-01", "percent-user-2024-01-02"],
            names(&files)
        );
    }

    #[test]
    fn missing_host_is_an_error() {
        let root = host_tree(&["cpu-0"]);

        let err = list_plugin_dirs(
            root.path(),
            "other-host",
            &PluginFilter::new(Vec::new(), "cpu", &[]),
        )
        .unwrap_err();

        assert!(matches!(err, LocateError::MissingHostDir { .. }));
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = host_tree(&[]);
        let missing = root.path().join("nope");

        let err = list_plugin_dirs(&missing, "host1", &PluginFilter::Named(Vec::new()))
            .unwrap_err();

        assert!(matches!(err, LocateError::MissingDataDir { .. }));
    }
}

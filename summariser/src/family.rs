use std::fmt;

use serde::{Deserialize, Serialize};

mod netlink;
mod vpp;
mod vpp_hicn;

/// A CSV column holding one value of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// The header of the column in the CSV file
    pub column: &'static str,
    /// Appended to `<instance> <category>` to name the metric, if set
    pub label: Option<&'static str>,
    /// The unit values of this column are converted to
    pub unit: &'static str,
}

impl ColumnSpec {
    /// A column that is also the metric's subcategory, like `rx` or `packets`.
    pub const fn labelled(column: &'static str, unit: &'static str) -> Self {
        Self {
            column,
            label: Some(column),
            unit,
        }
    }

    /// A column whose metric is named by the category alone.
    pub const fn unlabelled(column: &'static str, unit: &'static str) -> Self {
        Self {
            column,
            label: None,
            unit,
        }
    }

    /// The metric name for this column of `category` in `instance`.
    pub fn metric_name(&self, instance: &str, category: &str) -> String {
        match self.label {
            Some(label) => format!("{instance} {category} {label}"),
            None => format!("{instance} {category}"),
        }
    }
}

/// The columns of one known category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: &'static str,
    pub columns: &'static [ColumnSpec],
}

/// How the categories of a family map to CSV columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Any configured category, all read from the same columns.
    Uniform(&'static [ColumnSpec]),
    /// Only the categories of the table, each with its own columns.
    Table(&'static [CategorySpec]),
}

impl Schema {
    /// The columns to read for `category`, `None` if the category is unknown.
    pub fn columns(&self, category: &str) -> Option<&'static [ColumnSpec]> {
        match *self {
            Schema::Uniform(columns) => Some(columns),
            Schema::Table(table) => table
                .iter()
                .find(|spec| spec.category == category)
                .map(|spec| spec.columns),
        }
    }
}

/// Everything that distinguishes one source of collectd metrics from another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSpec {
    /// Substring of the plugin directories when no instances are configured
    pub pattern: &'static str,
    /// Directories never matched by `pattern`
    pub exclude: &'static [&'static str],
    pub schema: Schema,
    /// Read `nan` values as zero instead of rejecting them as non-finite
    pub nan_as_zero: bool,
}

/// The monitored subsystems, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Load,
    Cpu,
    Memory,
    Netlink,
    Vpp,
    VppHicn,
}

impl Family {
    pub const ALL: [Family; 6] = [
        Family::Load,
        Family::Cpu,
        Family::Memory,
        Family::Netlink,
        Family::Vpp,
        Family::VppHicn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Family::Load => "load",
            Family::Cpu => "cpu",
            Family::Memory => "memory",
            Family::Netlink => "netlink",
            Family::Vpp => "vpp",
            Family::VppHicn => "vpp_hicn",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The load average reported by the load family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadTerm {
    #[default]
    Short,
    Mid,
    Long,
}

const LOAD_SHORT: &[ColumnSpec] = &[ColumnSpec::labelled("shortterm", "")];
const LOAD_MID: &[ColumnSpec] = &[ColumnSpec::labelled("midterm", "")];
const LOAD_LONG: &[ColumnSpec] = &[ColumnSpec::labelled("longterm", "")];

/// The collectd load plugin, a single `load` directory.
pub fn load(term: LoadTerm) -> SourceSpec {
    let columns = match term {
        LoadTerm::Short => LOAD_SHORT,
        LoadTerm::Mid => LOAD_MID,
        LoadTerm::Long => LOAD_LONG,
    };

    SourceSpec {
        pattern: "load",
        exclude: &[],
        schema: Schema::Uniform(columns),
        nan_as_zero: false,
    }
}

const CPU_COLUMNS: &[ColumnSpec] = &[ColumnSpec::unlabelled("value", "jiffies")];
const MEMORY_COLUMNS: &[ColumnSpec] = &[ColumnSpec::unlabelled("value", "MB")];

/// The collectd cpu plugin, one `cpu-<n>` directory per core.
pub const CPU: SourceSpec = SourceSpec {
    pattern: "cpu",
    exclude: &[],
    schema: Schema::Uniform(CPU_COLUMNS),
    nan_as_zero: false,
};

/// The collectd memory plugin, a single `memory` directory.
pub const MEMORY: SourceSpec = SourceSpec {
    pattern: "memory",
    exclude: &[],
    schema: Schema::Uniform(MEMORY_COLUMNS),
    nan_as_zero: false,
};

/// The collectd netlink plugin, one `netlink-<interface>` directory per interface.
pub const NETLINK: SourceSpec = SourceSpec {
    pattern: "netlink",
    exclude: &[],
    schema: Schema::Table(netlink::CATEGORIES),
    nan_as_zero: false,
};

/// The VPP interface counters, one `vpp-<interface>` directory per interface.
pub const VPP: SourceSpec = SourceSpec {
    pattern: "vpp-",
    exclude: &[],
    schema: Schema::Table(vpp::CATEGORIES),
    nan_as_zero: false,
};

/// Directory of the hICN forwarder node counters.
pub const VPP_HICN_NODE_DIR: &str = "vpp_hicn-node";

/// The hICN face counters, one `vpp_hicn-<face>` directory per face.
pub const VPP_HICN_FACES: SourceSpec = SourceSpec {
    pattern: "vpp_hicn-",
    exclude: &[VPP_HICN_NODE_DIR],
    schema: Schema::Uniform(vpp_hicn::FACE_COLUMNS),
    nan_as_zero: true,
};

/// The hICN forwarder node counters.
pub const VPP_HICN_NODE: SourceSpec = SourceSpec {
    pattern: VPP_HICN_NODE_DIR,
    exclude: &[],
    schema: Schema::Table(vpp_hicn::NODE_CATEGORIES),
    nan_as_zero: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names() {
        let rx = ColumnSpec::labelled("rx", "MB");
        assert_eq!("netlink-eth0 if_octets rx", rx.metric_name("netlink-eth0", "if_octets"));

        let value = ColumnSpec::unlabelled("value", "jiffies");
        assert_eq!("cpu-0 cpu-user", value.metric_name("cpu-0", "cpu-user"));
    }

    #[test]
    fn uniform_schema_accepts_any_category() {
        assert_eq!(
            Some(&[ColumnSpec::unlabelled("value", "jiffies")][..]),
            CPU.schema.columns("anything")
        );
    }

    #[test]
    fn table_schema_knows_its_categories() {
        let octets = NETLINK.schema.columns("if_octets").unwrap();
        assert_eq!(
            vec!["rx", "tx"],
            octets.iter().map(|c| c.column).collect::<Vec<_>>()
        );
        assert!(octets.iter().all(|c| c.unit == "MB"));

        assert_eq!(None, NETLINK.schema.columns("if_unknown"));
    }

    #[test]
    fn load_term_selects_column() {
        let Schema::Uniform(columns) = load(LoadTerm::Mid).schema else {
            panic!("load schema should be uniform");
        };
        assert_eq!("midterm", columns[0].column);
    }

    #[test]
    fn vpp_pattern_does_not_match_hicn() {
        assert!(!"vpp_hicn-0".contains(VPP.pattern));
        assert!("vpp-0".contains(VPP.pattern));
    }

    #[test]
    fn family_labels() {
        assert_eq!(
            vec!["load", "cpu", "memory", "netlink", "vpp", "vpp_hicn"],
            Family::ALL.iter().map(|f| f.to_string()).collect::<Vec<_>>()
        );
    }
}

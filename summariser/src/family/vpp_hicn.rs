use super::{CategorySpec, ColumnSpec};

/// Every face category reports a packet rate and a byte rate.
pub(super) const FACE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::labelled("packets", "packet/s"),
    ColumnSpec::labelled("bytes", "Mb/s"),
];

const PACKETS: &[ColumnSpec] = &[ColumnSpec::unlabelled("packets", "packet")];
const INTERESTS: &[ColumnSpec] = &[ColumnSpec::unlabelled("interests", "interest")];
const DATA: &[ColumnSpec] = &[ColumnSpec::unlabelled("data", "data")];

const fn category(category: &'static str, columns: &'static [ColumnSpec]) -> CategorySpec {
    CategorySpec { category, columns }
}

/// Forwarder node counters, one column each.
pub(super) const NODE_CATEGORIES: &[CategorySpec] = &[
    category("pkts_processed", PACKETS),
    category("pkts_interest_count", PACKETS),
    category("pkts_data_count", PACKETS),
    category("pkts_from_cache_count", PACKETS),
    category("pkts_no_pit_count", PACKETS),
    category("pit_expired_count", INTERESTS),
    category("cs_expired_count", DATA),
    category("cs_lru_count", DATA),
    category("pkts_drop_no_buf", PACKETS),
    category("interests_aggregated", INTERESTS),
    category("interests_retx", INTERESTS),
    category("interests_hash_collision", INTERESTS),
    category("pit_entries_count", INTERESTS),
    category("cs_entries_count", DATA),
    category("cs_entries_ntw_count", DATA),
];

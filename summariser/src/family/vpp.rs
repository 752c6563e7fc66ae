use super::{CategorySpec, ColumnSpec};

const PACKETS: &[ColumnSpec] = &[ColumnSpec::labelled("packets", "packet")];
const PACKETS_BYTES: &[ColumnSpec] = &[
    ColumnSpec::labelled("packets", "packet"),
    ColumnSpec::labelled("bytes", "MB"),
];

const fn category(category: &'static str, columns: &'static [ColumnSpec]) -> CategorySpec {
    CategorySpec { category, columns }
}

/// VPP interface counters, either packet counts or packet and byte counts.
pub(super) const CATEGORIES: &[CategorySpec] = &[
    category("if_drops", PACKETS),
    category("if_punt", PACKETS),
    category("if_ip4", PACKETS),
    category("if_ip6", PACKETS),
    category("if_rx-no-buf", PACKETS),
    category("if_rx-miss", PACKETS),
    category("if_rx-error", PACKETS),
    category("if_tx-error", PACKETS),
    category("if_mpls", PACKETS),
    category("if_rx", PACKETS_BYTES),
    category("if_rx_unicast", PACKETS_BYTES),
    category("if_rx_multicast", PACKETS_BYTES),
    category("if_rx_broadcast", PACKETS_BYTES),
    category("if_tx", PACKETS_BYTES),
    category("if_tx_unicast", PACKETS_BYTES),
    category("if_tx_multicast", PACKETS_BYTES),
    category("if_tx_broadcast", PACKETS_BYTES),
];

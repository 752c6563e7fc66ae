use super::{CategorySpec, ColumnSpec};

const RX_TX_PACKETS: &[ColumnSpec] = &[
    ColumnSpec::labelled("rx", "packets"),
    ColumnSpec::labelled("tx", "packets"),
];
const RX_TX_BYTES: &[ColumnSpec] = &[
    ColumnSpec::labelled("rx", "MB"),
    ColumnSpec::labelled("tx", "MB"),
];
const PACKETS: &[ColumnSpec] = &[ColumnSpec::labelled("value", "packets")];
const BYTES: &[ColumnSpec] = &[ColumnSpec::labelled("value", "MB")];

const fn category(category: &'static str, columns: &'static [ColumnSpec]) -> CategorySpec {
    CategorySpec { category, columns }
}

/// Interface, error and traffic-control counters of the netlink plugin.
pub(super) const CATEGORIES: &[CategorySpec] = &[
    category("if_collisions", PACKETS),
    category("if_dropped", RX_TX_PACKETS),
    category("if_errors", RX_TX_PACKETS),
    category("if_multicast", PACKETS),
    category("if_octets", RX_TX_BYTES),
    category("if_packets", RX_TX_PACKETS),
    category("if_rx_errors-crc", PACKETS),
    category("if_rx_errors-fifo", PACKETS),
    category("if_rx_errors-frame", PACKETS),
    category("if_rx_errors-length", PACKETS),
    category("if_rx_errors-missed", PACKETS),
    category("if_rx_errors-over", PACKETS),
    category("if_tx_errors-aborted", PACKETS),
    category("if_tx_errors-carrier", PACKETS),
    category("if_tx_errors-fifo", PACKETS),
    category("if_tx_errors-heartbeat", PACKETS),
    category("if_tx_errors-window", PACKETS),
    category("ipt_bytes-qdisc-fq_codel-0:0", BYTES),
    category("ipt_bytes-qdisc-mq-0:0", BYTES),
    category("ipt_packets-qdisc-fq_codel-0:0", PACKETS),
    category("ipt_packets-qdisc-mq-0:0", PACKETS),
    category("ipt_bytes-class-mq-0:1", BYTES),
    category("ipt_bytes-class-mq-0:2", BYTES),
    category("ipt_bytes-class-mq-0:3", BYTES),
    category("ipt_bytes-class-mq-0:4", BYTES),
    category("ipt_bytes-class-mq-0:5", BYTES),
    category("ipt_bytes-class-mq-0:6", BYTES),
    category("ipt_bytes-class-mq-0:7", BYTES),
    category("ipt_bytes-class-mq-0:8", BYTES),
    category("ipt_packets-class-mq-0:1", PACKETS),
    category("ipt_packets-class-mq-0:2", PACKETS),
    category("ipt_packets-class-mq-0:3", PACKETS),
    category("ipt_packets-class-mq-0:4", PACKETS),
    category("ipt_packets-class-mq-0:5", PACKETS),
    category("ipt_packets-class-mq-0:6", PACKETS),
    category("ipt_packets-class-mq-0:7", PACKETS),
    category("ipt_packets-class-mq-0:8", PACKETS),
];

//! Log renderer for orderings.
//!
//! The presentation layer proper is out of scope for the daemon; the
//! ranking callback lands here and the leading rows go to the log.

use tracing::info;

use mintgrid_registry::{MintRecord, UNKNOWN_LATENCY_MS};

/// Log the leading `top` rows of a fresh ordering.
pub fn log_ranking(ordering: &[MintRecord], top: usize) {
    info!(total = ordering.len(), "ranking updated");
    for (index, record) in ordering.iter().take(top).enumerate() {
        info!(
            pos = index + 1,
            mint = record.display_name(),
            up = record.is_up,
            latency = %latency_display(record),
            class = ?record.latency_class(),
            units = record.currency_count,
            "ranked"
        );
    }
}

fn latency_display(record: &MintRecord) -> String {
    if record.latency_ms == UNKNOWN_LATENCY_MS {
        "-".to_string()
    } else {
        format!("{} ms", record.latency_ms)
    }
}

use std::net::SocketAddr;
use tracing::{info, warn};

pub const FETCH_ERRORS_TOTAL: &str = "relay_fetch_errors_total";
pub const MESSAGES_SENT_TOTAL: &str = "relay_messages_sent_total";
pub const SEND_FAILURES_TOTAL: &str = "relay_send_failures_total";
pub const WATERMARK_WRITE_ERRORS_TOTAL: &str = "relay_watermark_write_errors_total";
pub const WATERMARK_TIMESTAMP: &str = "relay_watermark_timestamp";

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Without a recorder the counters below are no-ops, so this is only called when
/// an address is configured.
pub fn init_metrics(addr: SocketAddr) {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            info!("Prometheus exporter listening on http://{}/metrics", addr);
            ::metrics::describe_counter!(FETCH_ERRORS_TOTAL, "Feed fetches that failed or did not parse");
            ::metrics::describe_counter!(MESSAGES_SENT_TOTAL, "Entries delivered to the chat");
            ::metrics::describe_counter!(SEND_FAILURES_TOTAL, "Deliveries that halted a batch");
            ::metrics::describe_counter!(WATERMARK_WRITE_ERRORS_TOTAL, "Failed watermark file writes");
            ::metrics::describe_gauge!(WATERMARK_TIMESTAMP, "Timestamp of the last delivered entry");
        }
        Err(e) => {
            warn!("Prometheus exporter install failed: {}", e);
        }
    }
}

pub fn fetch_failed() {
    ::metrics::counter!(FETCH_ERRORS_TOTAL).increment(1);
}

pub fn message_sent() {
    ::metrics::counter!(MESSAGES_SENT_TOTAL).increment(1);
}

pub fn send_failed() {
    ::metrics::counter!(SEND_FAILURES_TOTAL).increment(1);
}

pub fn watermark_advanced(timestamp: f64) {
    ::metrics::gauge!(WATERMARK_TIMESTAMP).set(timestamp);
}

pub fn watermark_write_failed() {
    ::metrics::counter!(WATERMARK_WRITE_ERRORS_TOTAL).increment(1);
}

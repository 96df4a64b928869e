//! Prometheus metrics
//!
//! Counters are recorded through the `metrics` facade. Without an
//! installed exporter every call is a no-op, so recording is always safe.
//!
//! # Metrics
//!
//! * `desk_orders_created_total` - Orders persisted
//! * `desk_messages_created_total` - Contact messages persisted
//! * `desk_notifications_total{outcome}` - Confirmation mail outcomes
//! * `desk_store_errors_total{operation}` - Failed store calls

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus metrics exporter
///
/// Starts an HTTP listener exposing metrics at `/metrics`.
///
/// # Arguments
///
/// * `port` - Port to expose metrics on
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// What happened to a confirmation mail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    Failed,
    /// Mail disabled or no recipient on the order
    Skipped,
}

impl NotificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Desk-level counters
pub struct DeskMetrics;

impl DeskMetrics {
    pub fn order_created() {
        counter!("desk_orders_created_total").increment(1);
    }

    pub fn message_created() {
        counter!("desk_messages_created_total").increment(1);
    }

    pub fn notification(outcome: NotificationOutcome) {
        counter!("desk_notifications_total", "outcome" => outcome.as_str()).increment(1);
    }

    /// # Arguments
    ///
    /// * `operation` - e.g. "create_order", "list_messages"
    pub fn store_error(operation: &'static str) {
        counter!("desk_store_errors_total", "operation" => operation).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter_is_noop() {
        DeskMetrics::order_created();
        DeskMetrics::message_created();
        DeskMetrics::notification(NotificationOutcome::Skipped);
        DeskMetrics::store_error("create_order");
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(NotificationOutcome::Sent.as_str(), "sent");
        assert_eq!(NotificationOutcome::Failed.as_str(), "failed");
        assert_eq!(NotificationOutcome::Skipped.as_str(), "skipped");
    }
}

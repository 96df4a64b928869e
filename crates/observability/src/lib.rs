//! Observability infrastructure for ProjectDesk
//!
//! This crate provides:
//! - Structured logging via tracing
//! - Prometheus counters for records and confirmation mails
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("projectdesk", LogFormat::Pretty)?;
//!
//! // Optional
//! observability::metrics::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use self::metrics::{init_metrics, DeskMetrics, NotificationOutcome};

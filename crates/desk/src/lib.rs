//! Order and contact message intake for ProjectDesk
//!
//! Students submit project orders and contact messages over HTTP; both are
//! stored append-only and listed newest first. A stored order triggers a
//! best-effort confirmation mail.
//!
//! # Feature Flags
//!
//! - `postgres` - Enable PostgreSQL storage
//! - `api` - Enable HTTP API (default)

pub mod error;
pub mod notifier;
pub mod service;
pub mod store;
pub mod text;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

// Re-export commonly used types
pub use error::{DeskError, NotifyError, Result};
pub use notifier::{Mailer, MockMailer, Notifier, OutgoingMail, SmtpMailer};
pub use service::{DeskService, LIST_LIMIT};
pub use types::{ContactMessage, ContactSubmission, NewContactMessage, Order, OrderDetails};

// Store exports
pub use store::memory::{InMemoryMessageStore, InMemoryOrderStore};
pub use store::traits::{MessageStore, OrderStore};

#[cfg(feature = "postgres")]
pub use store::postgres::{PostgresMessageStore, PostgresOrderStore};

#[cfg(feature = "api")]
pub use api::create_router;

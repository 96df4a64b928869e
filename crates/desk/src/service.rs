//! Desk service - intake logic shared by the HTTP handlers

use std::sync::Arc;

use observability::DeskMetrics;

use crate::error::Result;
use crate::notifier::Notifier;
use crate::store::traits::{MessageStore, OrderStore};
use crate::types::{ContactMessage, ContactSubmission, Order, OrderDetails};

/// Maximum number of records returned by a listing
pub const LIST_LIMIT: u32 = 200;

/// Stores and notifier behind the HTTP surface
///
/// Built once at startup and handed to the router as state.
#[derive(Clone)]
pub struct DeskService {
    orders: Arc<dyn OrderStore>,
    messages: Arc<dyn MessageStore>,
    notifier: Notifier,
}

impl DeskService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        messages: Arc<dyn MessageStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            orders,
            messages,
            notifier,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Validate and store an order, then dispatch its confirmation mail
    ///
    /// The mail is sent on a detached task; its outcome does not affect
    /// the result.
    pub async fn submit_order(&self, details: OrderDetails) -> Result<Order> {
        let details = details.validate()?;

        let order = self.orders.create(details).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to store order");
            DeskMetrics::store_error("create_order");
            e
        })?;

        tracing::info!(order_id = %order.id, "Order stored");
        DeskMetrics::order_created();

        self.notifier.dispatch(order.clone());
        Ok(order)
    }

    /// Newest orders first, at most [`LIST_LIMIT`]
    pub async fn recent_orders(&self) -> Result<Vec<Order>> {
        self.orders.list_recent(LIST_LIMIT).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list orders");
            DeskMetrics::store_error("list_orders");
            e
        })
    }

    /// Validate and store a contact message
    pub async fn submit_message(&self, submission: ContactSubmission) -> Result<ContactMessage> {
        let message = submission.validate()?;

        let message = self.messages.create(message).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to store contact message");
            DeskMetrics::store_error("create_message");
            e
        })?;

        tracing::info!(message_id = %message.id, "Contact message stored");
        DeskMetrics::message_created();
        Ok(message)
    }

    /// Newest messages first, at most [`LIST_LIMIT`]
    pub async fn recent_messages(&self) -> Result<Vec<ContactMessage>> {
        self.messages.list_recent(LIST_LIMIT).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list contact messages");
            DeskMetrics::store_error("list_messages");
            e
        })
    }
}

impl std::fmt::Debug for DeskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeskService")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

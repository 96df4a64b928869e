//! Store trait definitions

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContactMessage, NewContactMessage, Order, OrderDetails};

/// OrderStore trait - append-only storage for project orders
///
/// Implementations assign the identifier and creation timestamp. Records
/// are never updated or deleted through this interface.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order
    ///
    /// # Arguments
    /// * `details` - Validated order fields
    ///
    /// # Returns
    /// The stored order with id and timestamps assigned
    async fn create(&self, details: OrderDetails) -> Result<Order>;

    /// Most recently created orders, newest first
    ///
    /// # Arguments
    /// * `limit` - Maximum number of records returned
    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>>;
}

/// MessageStore trait - append-only storage for contact messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new contact message
    async fn create(&self, message: NewContactMessage) -> Result<ContactMessage>;

    /// Most recently created messages, newest first
    async fn list_recent(&self, limit: u32) -> Result<Vec<ContactMessage>>;
}

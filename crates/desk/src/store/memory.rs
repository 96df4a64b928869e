//! In-memory store implementations
//!
//! Used for tests and local development when no database is running.
//! Contents are lost when the process exits.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::store::traits::{MessageStore, OrderStore};
use crate::types::{ContactMessage, NewContactMessage, Order, OrderDetails};

/// Next creation timestamp, kept strictly after the previous one
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

/// Newest-first copy of at most `limit` records
fn newest_first<T: Clone>(records: &[T], limit: u32) -> Vec<T> {
    records.iter().rev().take(limit as usize).cloned().collect()
}

/// In-memory order store
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored orders
    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, details: OrderDetails) -> Result<Order> {
        let mut orders = self.orders.write();
        let created_at = next_timestamp(orders.last().map(|o| o.created_at));
        let order = Order::new(Uuid::new_v4(), details, created_at);
        orders.push(order.clone());
        Ok(order)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Order>> {
        Ok(newest_first(&self.orders.read(), limit))
    }
}

/// In-memory contact message store
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<ContactMessage>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn create(&self, message: NewContactMessage) -> Result<ContactMessage> {
        let mut messages = self.messages.write();
        let created_at = next_timestamp(messages.last().map(|m| m.created_at));
        let stored = ContactMessage::new(Uuid::new_v4(), message, created_at);
        messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<ContactMessage>> {
        Ok(newest_first(&self.messages.read(), limit))
    }
}

//! Response envelopes
//!
//! Every body carries `ok`; failures and single-record responses also
//! carry a human-readable `message`.

use serde::{Deserialize, Serialize};

use crate::types::{ContactMessage, Order};

/// Bare `{ok, message}` envelope used for the index and for every failure
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Response after storing an order
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderCreatedResponse {
    pub ok: bool,
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub ok: bool,
    pub orders: Vec<Order>,
}

/// Response after storing a contact message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageCreatedResponse {
    pub ok: bool,
    pub message: String,
    pub data: ContactMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageListResponse {
    pub ok: bool,
    pub messages: Vec<ContactMessage>,
}

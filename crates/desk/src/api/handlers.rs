//! API handlers for desk HTTP endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::{ApiError, METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND};
use crate::api::models::*;
use crate::service::DeskService;
use crate::types::{ContactSubmission, OrderDetails};

pub const INDEX_MESSAGE: &str = "ProjectDesk API is running";
pub const ORDER_SUBMITTED: &str = "Order submitted successfully";
pub const ORDER_SAVE_FAILED: &str = "Server error while saving order";
pub const ORDER_LIST_FAILED: &str = "Server error while fetching orders";
pub const MESSAGE_RECEIVED: &str = "Message received successfully";
pub const MESSAGE_SAVE_FAILED: &str = "Server error while saving message";
pub const MESSAGE_LIST_FAILED: &str = "Server error while fetching messages";

/// Liveness message
pub async fn index() -> Json<StatusResponse> {
    Json(StatusResponse::ok(INDEX_MESSAGE))
}

/// Create order handler
pub async fn create_order(
    State(service): State<DeskService>,
    payload: Result<Json<OrderDetails>, JsonRejection>,
) -> Result<Json<OrderCreatedResponse>, ApiError> {
    let Json(details) = payload?;

    let order = service
        .submit_order(details)
        .await
        .map_err(|e| ApiError::from_desk(e, ORDER_SAVE_FAILED))?;

    Ok(Json(OrderCreatedResponse {
        ok: true,
        message: ORDER_SUBMITTED.to_string(),
        order,
    }))
}

/// List orders handler
pub async fn list_orders(
    State(service): State<DeskService>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let orders = service
        .recent_orders()
        .await
        .map_err(|e| ApiError::from_desk(e, ORDER_LIST_FAILED))?;

    Ok(Json(OrderListResponse { ok: true, orders }))
}

/// Create contact message handler
pub async fn create_message(
    State(service): State<DeskService>,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<Json<MessageCreatedResponse>, ApiError> {
    let Json(submission) = payload?;

    let data = service
        .submit_message(submission)
        .await
        .map_err(|e| ApiError::from_desk(e, MESSAGE_SAVE_FAILED))?;

    Ok(Json(MessageCreatedResponse {
        ok: true,
        message: MESSAGE_RECEIVED.to_string(),
        data,
    }))
}

/// List contact messages handler
pub async fn list_messages(
    State(service): State<DeskService>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let messages = service
        .recent_messages()
        .await
        .map_err(|e| ApiError::from_desk(e, MESSAGE_LIST_FAILED))?;

    Ok(Json(MessageListResponse { ok: true, messages }))
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found(ROUTE_NOT_FOUND)
}

/// Known path, unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

//! API routes for the desk

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::cors::cors_layer;
use crate::api::handlers::*;
use crate::service::DeskService;

/// Create the desk router
pub fn create_router(service: DeskService) -> Router {
    Router::new()
        .route("/", get(index).fallback(method_not_allowed))
        .route(
            "/api/orders",
            post(create_order)
                .get(list_orders)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/messages",
            post(create_message)
                .get(list_messages)
                .fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::notifier::{Mailer, MockMailer, Notifier, OutgoingMail};
    use crate::service::testing::UnavailableStore;
    use crate::store::memory::{InMemoryMessageStore, InMemoryOrderStore};
    use axum::{
        body::Body,
        http::{header, HeaderMap, Request, StatusCode},
    };
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    /// Mailer that holds every send until the gate opens
    #[derive(Default)]
    struct GatedMailer {
        gate: Notify,
        sent: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Mailer for GatedMailer {
        async fn send(&self, _mail: OutgoingMail) -> Result<(), NotifyError> {
            self.gate.notified().await;
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct TestApp {
        router: Router,
        orders: Arc<InMemoryOrderStore>,
        messages: Arc<InMemoryMessageStore>,
        service: DeskService,
    }

    fn app(notifier: Notifier) -> TestApp {
        let orders = Arc::new(InMemoryOrderStore::new());
        let messages = Arc::new(InMemoryMessageStore::new());
        let service = DeskService::new(orders.clone(), messages.clone(), notifier);

        TestApp {
            router: create_router(service.clone()),
            orders,
            messages,
            service,
        }
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };

        (status, headers, json)
    }

    fn valid_order() -> Value {
        json!({
            "studentName": "Asha Patil",
            "instituteName": "COEP",
            "mobile": "9876543210",
            "email": "asha@example.com",
            "projectTitle": "Smart Irrigation",
            "projectDomain": "IoT",
            "orderedFromIdea": "yes",
            "budget": 5000
        })
    }

    #[tokio::test]
    async fn test_index() {
        let app = app(Notifier::disabled());
        let (status, _, json) = send(&app.router, get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["message"], "ProjectDesk API is running");
    }

    #[tokio::test]
    async fn test_create_order_echoes_record() {
        let app = app(Notifier::disabled());
        let (status, _, json) = send(&app.router, post_json("/api/orders", &valid_order())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["message"], "Order submitted successfully");

        let order = &json["order"];
        assert_eq!(order["studentName"], "Asha Patil");
        assert_eq!(order["projectTitle"], "Smart Irrigation");
        assert_eq!(order["orderedFromIdea"], "yes");
        assert_eq!(order["budget"], "5000");
        assert!(order["id"].is_string());
        assert_eq!(order["createdAt"], order["updatedAt"]);
        assert!(order.get("city").is_none());

        assert_eq!(app.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_create_order_requires_fields() {
        let app = app(Notifier::disabled());

        for field in ["studentName", "mobile", "projectTitle"] {
            for replacement in [None, Some(json!("")), Some(json!("   ")), Some(Value::Null)] {
                let mut body = valid_order();
                match &replacement {
                    None => {
                        body.as_object_mut().unwrap().remove(field);
                    }
                    Some(value) => body[field] = value.clone(),
                }

                let (status, _, json) = send(&app.router, post_json("/api/orders", &body)).await;

                assert_eq!(status, StatusCode::BAD_REQUEST, "{} = {:?}", field, replacement);
                assert_eq!(json["ok"], false);
                assert_eq!(
                    json["message"],
                    "studentName, mobile and projectTitle are required"
                );
            }
        }

        assert!(app.orders.is_empty());
    }

    #[tokio::test]
    async fn test_identical_orders_are_not_deduplicated() {
        let app = app(Notifier::disabled());

        let (_, _, first) = send(&app.router, post_json("/api/orders", &valid_order())).await;
        let (_, _, second) = send(&app.router, post_json("/api/orders", &valid_order())).await;

        assert_ne!(first["order"]["id"], second["order"]["id"]);
        assert_eq!(app.orders.len(), 2);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let app = app(Notifier::disabled());

        for i in 0..5 {
            let mut body = valid_order();
            body["projectSerial"] = json!(format!("P-{}", i));
            send(&app.router, post_json("/api/orders", &body)).await;
        }

        let (status, _, json) = send(&app.router, get("/api/orders")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        let orders = json["orders"].as_array().unwrap();
        assert_eq!(orders.len(), 5);
        assert_eq!(orders[0]["projectSerial"], "P-4");

        let created: Vec<DateTime<Utc>> = orders
            .iter()
            .map(|o| o["createdAt"].as_str().unwrap().parse().unwrap())
            .collect();
        assert!(created.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[tokio::test]
    async fn test_create_and_list_messages() {
        let app = app(Notifier::disabled());
        let body = json!({
            "name": "Ravi",
            "mobile": "9123456780",
            "message": "Do you take IoT projects?"
        });

        let (status, _, json) = send(&app.router, post_json("/api/messages", &body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Message received successfully");
        assert_eq!(json["data"]["name"], "Ravi");
        assert_eq!(json["data"]["message"], "Do you take IoT projects?");

        let (status, _, json) = send(&app.router, get("/api/messages")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let app = app(Notifier::disabled());
        let body = json!({ "name": "Ravi", "mobile": "9123456780", "message": "" });

        let (status, _, json) = send(&app.router, post_json("/api/messages", &body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["ok"], false);
        assert_eq!(json["message"], "name, mobile and message are required");
        assert!(app.messages.is_empty());
    }

    #[tokio::test]
    async fn test_order_succeeds_when_mail_fails() {
        let mailer = Arc::new(MockMailer::new().failing("535 authentication failed"));
        let notifier = Notifier::new(mailer.clone(), "desk@example.com").unwrap();
        let app = app(notifier);

        let (status, _, json) = send(&app.router, post_json("/api/orders", &valid_order())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);

        assert!(app.service.notifier().drain(Duration::from_secs(5)).await);
        assert_eq!(mailer.attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_order_sends_confirmation() {
        let mailer = Arc::new(MockMailer::new());
        let notifier = Notifier::new(mailer.clone(), "desk@example.com").unwrap();
        let app = app(notifier);

        send(&app.router, post_json("/api/orders", &valid_order())).await;
        assert!(app.service.notifier().drain(Duration::from_secs(5)).await);

        let attempts = mailer.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].to.email.to_string(), "asha@example.com");
        assert_eq!(attempts[0].subject, "Order received: Smart Irrigation");
    }

    #[tokio::test]
    async fn test_order_response_does_not_wait_for_mail() {
        let mailer = Arc::new(GatedMailer::default());
        let notifier = Notifier::new(mailer.clone(), "desk@example.com").unwrap();
        let app = app(notifier);

        let (status, _, json) = tokio::time::timeout(
            Duration::from_secs(5),
            send(&app.router, post_json("/api/orders", &valid_order())),
        )
        .await
        .expect("order response held back by mail delivery");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(app.service.notifier().pending(), 1);
        assert_eq!(mailer.sent.load(Ordering::SeqCst), 0);

        mailer.gate.notify_one();

        assert!(app.service.notifier().drain(Duration::from_secs(5)).await);
        assert_eq!(mailer.sent.load(Ordering::SeqCst), 1);
        assert_eq!(app.service.notifier().pending(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_returns_generic_500() {
        let service = DeskService::new(
            Arc::new(UnavailableStore),
            Arc::new(UnavailableStore),
            Notifier::disabled(),
        );
        let router = create_router(service);

        let (status, _, json) = send(&router, post_json("/api/orders", &valid_order())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["ok"], false);
        assert_eq!(json["message"], "Server error while saving order");

        let (status, _, json) = send(&router, get("/api/orders")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Server error while fetching orders");

        let body = json!({ "name": "Ravi", "mobile": "9123456780", "message": "Hi" });
        let (status, _, json) = send(&router, post_json("/api/messages", &body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Server error while saving message");

        let (_, _, json) = send(&router, get("/api/messages")).await;
        assert_eq!(json["message"], "Server error while fetching messages");
    }

    #[tokio::test]
    async fn test_malformed_bodies() {
        let app = app(Notifier::disabled());

        let broken = Request::builder()
            .method("POST")
            .uri("/api/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"studentName\": "))
            .unwrap();
        let (status, _, json) = send(&app.router, broken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid JSON body");

        let untyped = Request::builder()
            .method("POST")
            .uri("/api/messages")
            .body(Body::from("name=Ravi"))
            .unwrap();
        let (status, _, json) = send(&app.router, untyped).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["ok"], false);

        let mut structured = valid_order();
        structured["studentName"] = json!(["Asha"]);
        let (status, _, json) = send(&app.router, post_json("/api/orders", &structured)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid JSON body");

        assert!(app.orders.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(Notifier::disabled());
        let (status, _, json) = send(&app.router, get("/api/unknown")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["ok"], false);
        assert_eq!(json["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_unsupported_method_keeps_envelope() {
        let app = app(Notifier::disabled());

        for (method, uri) in [("DELETE", "/api/orders"), ("PUT", "/api/messages"), ("POST", "/")] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, _, json) = send(&app.router, request).await;

            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, uri);
            assert_eq!(json["ok"], false);
            assert_eq!(json["message"], "Method not allowed");
        }

        assert!(app.orders.is_empty());
    }

    #[tokio::test]
    async fn test_allowed_origins_are_echoed() {
        let app = app(Notifier::disabled());

        for origin in ["http://localhost:5173", "null"] {
            let request = Request::builder()
                .method("GET")
                .uri("/api/orders")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap();
            let (status, headers, _) = send(&app.router, request).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
                origin
            );
        }
    }

    #[tokio::test]
    async fn test_denied_origin_still_writes() {
        let app = app(Notifier::disabled());

        let mut request = post_json("/api/orders", &valid_order());
        request
            .headers_mut()
            .insert(header::ORIGIN, "https://evil.example".parse().unwrap());
        let (status, headers, _) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(app.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_absent_origin_served_normally() {
        let app = app(Notifier::disabled());
        let (status, headers, _) = send(&app.router, get("/api/messages")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn test_preflight() {
        let app = app(Notifier::disabled());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/orders")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "3600");
        let methods = headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
    }
}

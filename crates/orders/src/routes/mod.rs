//! HTTP route handlers for the order service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Liveness, never touches storage
//! GET  /health/ready    - Readiness, pings the order store
//!
//! POST /api/order       - Place an order (credential in body or header)
//! GET  /api/my-orders   - Caller's own orders, newest first
//! GET  /api/orders      - Every order with submitter details (admin only)
//! ```

pub mod health;
pub mod orders;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(orders::create_order))
        .route("/my-orders", get(orders::my_orders))
        .route("/orders", get(orders::all_orders))
}

/// Build the complete application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! Router fixtures backed by the in-memory stores.

    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::Duration;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use tech_commerce_core::{Role, Submitter, TokenKeys, UserId};

    use crate::db::{MemoryIdentityDirectory, MemoryOrderStore};
    use crate::state::AppState;

    pub const SECRET: &str = "t3$T-sign1ng!K3y#for@Order&Routes*2026";

    pub struct Fixture {
        pub app: Router,
        pub store: Arc<MemoryOrderStore>,
        pub directory: Arc<MemoryIdentityDirectory>,
        pub keys: TokenKeys,
    }

    impl Fixture {
        pub fn new() -> Self {
            let keys = TokenKeys::new(&SecretString::from(SECRET));
            let store = Arc::new(MemoryOrderStore::new());
            let directory = Arc::new(MemoryIdentityDirectory::new());
            let state = AppState::new(keys.clone(), store.clone(), directory.clone());

            Self {
                app: super::router(state),
                store,
                directory,
                keys,
            }
        }

        /// Register an identity and return a credential for it.
        pub async fn login(&self, id: i32, role: Role) -> String {
            let user_id = UserId::new(id);
            self.directory
                .insert(
                    user_id,
                    Submitter::new(
                        format!("First{id}"),
                        format!("Last{id}"),
                        format!("user{id}@tech.com"),
                        role,
                    ),
                )
                .await;
            self.keys.issue(user_id, role, Duration::hours(24)).unwrap()
        }

        pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut builder = Request::get(uri);
            if let Some(token) = token {
                builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }
}

//! HTTP route handlers for the identity service.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness, pings the account store
//!
//! POST /api/auth/signup         - Register (rate limited)
//! POST /api/auth/signin         - Exchange email/password for a token (rate limited)
//! POST /api/auth/adminsignin    - Same, admin accounts only (rate limited)
//! GET  /api/auth/protected      - Echo the caller's claims
//! GET  /api/auth/users          - List accounts (admin only)
//! GET  /api/auth/users/{id}     - One account (admin only)
//! ```

pub mod auth;
pub mod health;
pub mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, sign_in_rate_limiter};
use crate::state::AppState;

/// Create the `/api/auth` routes router.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let credential_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/adminsignin", post(auth::admin_sign_in))
        .layer(sign_in_rate_limiter(trust_proxy_headers));

    Router::new()
        .merge(credential_routes)
        .route("/protected", get(auth::protected))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
}

/// Build the complete application router with its middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(state.trusts_proxy_headers()))
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
    //! Router fixtures backed by the in-memory account store.

    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode, header},
    };
    use chrono::Duration;
    use secrecy::SecretString;
    use serde_json::Value;
    use tower::ServiceExt;

    use tech_commerce_core::{Email, Role, TokenKeys, UserId};

    use crate::db::{MemoryUserStore, UserStore};
    use crate::models::NewUser;
    use crate::services::auth::hash_password;
    use crate::state::AppState;

    pub const SECRET: &str = "t3$T-sign1ng!K3y#for@Identity&Routes*2026";

    /// Peer address every fixture request arrives from.
    const PEER: [u8; 4] = [203, 0, 113, 7];

    pub struct Fixture {
        pub app: Router,
        pub store: Arc<MemoryUserStore>,
        pub keys: TokenKeys,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_proxy_trust(false)
        }

        /// A fixture whose rate limiter keys on `x-forwarded-for`.
        pub fn behind_proxy() -> Self {
            Self::with_proxy_trust(true)
        }

        fn with_proxy_trust(trust: bool) -> Self {
            let keys = TokenKeys::new(&SecretString::from(SECRET));
            let store = Arc::new(MemoryUserStore::new());
            let state = AppState::new(keys.clone(), store.clone(), Duration::hours(24))
                .behind_trusted_proxy(trust);

            Self {
                app: super::router(state),
                store,
                keys,
            }
        }

        /// Insert an admin account directly and return its id.
        pub async fn seed_admin(&self, email: &str, password: &str) -> i32 {
            self.store
                .create(NewUser {
                    first_name: "admin".to_owned(),
                    last_name: "admin".to_owned(),
                    email: Email::parse(email).unwrap(),
                    password_hash: hash_password(password).unwrap(),
                    role: Role::Admin,
                })
                .await
                .unwrap()
                .id
                .as_i32()
        }

        /// A credential for `id` without touching the store.
        pub fn token(&self, id: i32, role: Role) -> String {
            self.keys
                .issue(UserId::new(id), role, Duration::hours(1))
                .unwrap()
        }

        pub async fn send(&self, mut request: Request<Body>) -> (StatusCode, Value) {
            request
                .extensions_mut()
                .insert(ConnectInfo(SocketAddr::from((PEER, 40000))));
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
            self.send(json_request(uri).body(Body::from(body.to_string())).unwrap())
                .await
        }

        /// POST claiming to come from `client` via `x-forwarded-for`.
        pub async fn post_json_forwarded(
            &self,
            uri: &str,
            body: &Value,
            client: &str,
        ) -> (StatusCode, Value) {
            let request = json_request(uri)
                .header("x-forwarded-for", client)
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn json_request(uri: &str) -> axum::http::request::Builder {
        Request::post(uri).header(header::CONTENT_TYPE, "application/json")
    }
}

//! Request ID middleware.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;

use tech_commerce_core::request_id::{REQUEST_ID_HEADER, request_id};

/// Tag the request with a correlation id, reusing an acceptable upstream one.
///
/// Sits outside the rate limiter, so rejected sign-ins carry an id too.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let upstream = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok());
    let request_id = request_id(upstream);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
        scope.set_tag("service", "identity");
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

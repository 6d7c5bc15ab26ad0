//! Registration and sign-in handlers.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use tech_commerce_core::Claims;

use crate::error::{AppError, Result};
use crate::middleware::BearerAuth;
use crate::services::SignUp;
use crate::state::AppState;

/// Sign-in request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: &'static str,
    pub user: Claims,
}

/// Parse a JSON body, reporting failures in the service's error shape rather
/// than axum's plain-text rejection.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
}

/// `POST /api/auth/signup`
pub async fn sign_up(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SignUpResponse>)> {
    let request: SignUp = parse_body(&body)?;
    state.auth_service().register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            success: true,
            message: "User registered successfully",
        }),
    ))
}

/// `POST /api/auth/signin`
pub async fn sign_in(State(state): State<AppState>, body: Bytes) -> Result<Json<TokenResponse>> {
    let request: SignIn = parse_body(&body)?;
    let (_, token) = state
        .auth_service()
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}

/// `POST /api/auth/adminsignin`
pub async fn admin_sign_in(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenResponse>> {
    let request: SignIn = parse_body(&body)?;
    let (_, token) = state
        .auth_service()
        .admin_sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(TokenResponse {
        success: true,
        token,
    }))
}

/// `GET /api/auth/protected`: echoes the caller's claims.
pub async fn protected(BearerAuth(claims): BearerAuth) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "Protected data",
        user: claims,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::net::SocketAddr;

    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{Request, StatusCode, header},
    };
    use serde_json::json;
    use tower::ServiceExt;

    use tech_commerce_core::Role;

    use crate::routes::testing::Fixture;

    fn grace() -> serde_json::Value {
        json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "email": "grace@tech.com",
            "password": "correct horse"
        })
    }

    #[tokio::test]
    async fn test_signup_then_signin() {
        let fixture = Fixture::new();

        let (status, body) = fixture.post_json("/api/auth/signup", &grace()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"success": true, "message": "User registered successfully"})
        );

        let (status, body) = fixture
            .post_json(
                "/api/auth/signin",
                &json!({"email": "grace@tech.com", "password": "correct horse"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let claims = fixture
            .keys
            .verify(body["token"].as_str())
            .unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_409() {
        let fixture = Fixture::new();
        fixture.post_json("/api/auth/signup", &grace()).await;

        let (status, body) = fixture.post_json("/api/auth/signup", &grace()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email already in use");
    }

    #[tokio::test]
    async fn test_invalid_signup_is_400() {
        let fixture = Fixture::new();

        let mut weak = grace();
        weak["password"] = json!("short");
        let mut bad_email = grace();
        bad_email["email"] = json!("grace");

        for body in [weak, bad_email, json!("not an object")] {
            let (status, response) = fixture.post_json("/api/auth/signup", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(response["success"], false);
        }
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let fixture = Fixture::new();
        fixture.post_json("/api/auth/signup", &grace()).await;

        let (status, body) = fixture
            .post_json(
                "/api/auth/signin",
                &json!({"email": "grace@tech.com", "password": "wrong"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({"success": false, "message": "Invalid email or password"})
        );
    }

    #[tokio::test]
    async fn test_admin_signin_only_matches_admins() {
        let fixture = Fixture::new();
        fixture.seed_admin("admin@tech.com", "admin-password").await;
        fixture.post_json("/api/auth/signup", &grace()).await;

        let (status, _) = fixture
            .post_json(
                "/api/auth/adminsignin",
                &json!({"email": "grace@tech.com", "password": "correct horse"}),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = fixture
            .post_json(
                "/api/auth/adminsignin",
                &json!({"email": "admin@tech.com", "password": "admin-password"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let claims = fixture.keys.verify(body["token"].as_str()).unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_signin_is_rate_limited() {
        let fixture = Fixture::new();
        let attempt = json!({"email": "nobody@tech.com", "password": "whatever1"});

        for _ in 0..5 {
            let (status, _) = fixture.post_json("/api/auth/signin", &attempt).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, _) = fixture.post_json("/api/auth/signin", &attempt).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_forged_forwarded_for_does_not_reset_limit() {
        let fixture = Fixture::new();
        let attempt = json!({"email": "nobody@tech.com", "password": "whatever1"});

        let mut limited = 0;
        for i in 0..20 {
            let client = format!("198.51.100.{i}");
            let (status, _) = fixture
                .post_json_forwarded("/api/auth/adminsignin", &attempt, &client)
                .await;
            if status == StatusCode::TOO_MANY_REQUESTS {
                limited += 1;
            }
        }
        assert_eq!(limited, 15);
    }

    #[tokio::test]
    async fn test_rate_limited_response_carries_request_id() {
        let fixture = Fixture::new();
        let attempt = json!({"email": "nobody@tech.com", "password": "whatever1"});
        for _ in 0..5 {
            fixture.post_json("/api/auth/signin", &attempt).await;
        }

        let request = Request::post("/api/auth/signin")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", "support-ticket-42")
            .extension(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 40000))))
            .body(Body::from(attempt.to_string()))
            .unwrap();
        let response = fixture.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["x-request-id"], "support-ticket-42");
    }

    #[tokio::test]
    async fn test_trusted_proxy_limits_per_forwarded_client() {
        let fixture = Fixture::behind_proxy();
        let attempt = json!({"email": "nobody@tech.com", "password": "whatever1"});

        for _ in 0..5 {
            let (status, _) = fixture
                .post_json_forwarded("/api/auth/signin", &attempt, "198.51.100.1")
                .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
        let (status, _) = fixture
            .post_json_forwarded("/api/auth/signin", &attempt, "198.51.100.1")
            .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _) = fixture
            .post_json_forwarded("/api/auth/signin", &attempt, "198.51.100.2")
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_echoes_claims() {
        let fixture = Fixture::new();
        let token = fixture.token(7, Role::User);

        let (status, body) = fixture.get("/api/auth/protected", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Protected data");
        assert_eq!(body["user"]["userId"], 7);
        assert_eq!(body["user"]["role"], "user");

        let (status, body) = fixture.get("/api/auth/protected", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token provided");

        let (status, _) = fixture.get("/api/auth/protected", Some("garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

//! Account listing for administrators.

use axum::{
    Json,
    extract::{Path, State},
};

use tech_commerce_core::UserId;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::state::AppState;

/// `GET /api/auth/users`
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    Ok(Json(state.auth_service().list_users().await?))
}

/// `GET /api/auth/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<User>> {
    Ok(Json(state.auth_service().get_user(UserId::new(id)).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tech_commerce_core::Role;

    use crate::routes::testing::Fixture;

    #[tokio::test]
    async fn test_users_requires_admin() {
        let fixture = Fixture::new();

        let (status, _) = fixture.get("/api/auth/users", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let user = fixture.token(2, Role::User);
        let (status, body) = fixture.get("/api/auth/users", Some(&user)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_users_listing_excludes_password_hashes() {
        let fixture = Fixture::new();
        let admin_id = fixture.seed_admin("admin@tech.com", "admin-password").await;
        fixture
            .post_json(
                "/api/auth/signup",
                &json!({
                    "firstName": "Grace",
                    "lastName": "Hopper",
                    "email": "grace@tech.com",
                    "password": "correct horse"
                }),
            )
            .await;

        let admin = fixture.token(admin_id, Role::Admin);
        let (status, body) = fixture.get("/api/auth/users", Some(&admin)).await;
        assert_eq!(status, StatusCode::OK);

        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1]["email"], "grace@tech.com");
        assert_eq!(users[1]["firstName"], "Grace");
        assert!(!body.to_string().contains("argon2"));
        assert!(users.iter().all(|u| u.get("password").is_none()));
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let fixture = Fixture::new();
        let admin_id = fixture.seed_admin("admin@tech.com", "admin-password").await;
        let admin = fixture.token(admin_id, Role::Admin);

        let (status, body) = fixture
            .get(&format!("/api/auth/users/{admin_id}"), Some(&admin))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");

        let (status, body) = fixture.get("/api/auth/users/999", Some(&admin)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }
}

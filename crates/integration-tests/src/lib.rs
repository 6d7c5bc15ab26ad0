//! Integration tests for Tech Commerce.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (no services needed)
//! cargo test -p tech-commerce-integration-tests
//!
//! # Black-box tests against running services
//! tc-cli migrate all
//! tc-cli admin create -e admin@tech.com -p "$ADMIN_PASSWORD"
//! cargo test -p tech-commerce-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables (black-box tests)
//!
//! - `ORDERS_URL` - default `http://127.0.0.1:5100`
//! - `IDENTITY_URL` - default `http://127.0.0.1:5000`
//! - `ADMIN_EMAIL`, `ADMIN_PASSWORD` - an account seeded with the CLI

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Handles on the two running services.
pub struct TestContext {
    pub client: Client,
    pub orders_url: String,
    pub identity_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            orders_url: std::env::var("ORDERS_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5100".to_owned()),
            identity_url: std::env::var("IDENTITY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_owned()),
        }
    }

    #[must_use]
    pub fn orders(&self, path: &str) -> String {
        format!("{}{path}", self.orders_url)
    }

    #[must_use]
    pub fn identity(&self, path: &str) -> String {
        format!("{}{path}", self.identity_url)
    }

    /// Register a fresh account and return `(email, token)`.
    ///
    /// # Errors
    ///
    /// Returns the failing status and body if either call is rejected.
    pub async fn new_customer(&self) -> Result<(String, String), String> {
        let email = format!("it-{}@tech.com", uuid::Uuid::new_v4());
        let password = "integration-pass";

        let response = self
            .client
            .post(self.identity("/api/auth/signup"))
            .json(&json!({
                "firstName": "Integration",
                "lastName": "Test",
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if response.status() != StatusCode::CREATED {
            return Err(format!("signup failed: {}", response.status()));
        }

        let token = self.sign_in("/api/auth/signin", &email, password).await?;
        Ok((email, token))
    }

    /// Sign in as the seeded admin account.
    ///
    /// # Errors
    ///
    /// Returns a description if the admin variables are unset or sign-in fails.
    pub async fn admin_token(&self) -> Result<String, String> {
        let email = std::env::var("ADMIN_EMAIL").map_err(|_| "ADMIN_EMAIL not set".to_owned())?;
        let password =
            std::env::var("ADMIN_PASSWORD").map_err(|_| "ADMIN_PASSWORD not set".to_owned())?;
        self.sign_in("/api/auth/adminsignin", &email, &password).await
    }

    async fn sign_in(&self, path: &str, email: &str, password: &str) -> Result<String, String> {
        let body: Value = self
            .client
            .post(self.identity(path))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| e.to_string())?
            .json()
            .await
            .map_err(|e| e.to_string())?;

        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| format!("sign-in failed: {body}"))
    }
}

/// The order used throughout the suites.
#[must_use]
pub fn sample_order() -> Value {
    json!({
        "items": [{"ID": "1", "Name": "Widget", "quantity": 2, "Price": 9.99}],
        "address": {"address": "1 Main St", "city": "Metropolis", "zip": "10001"},
        "total": 19.98
    })
}

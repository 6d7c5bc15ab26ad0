//! Application state shared across handlers.

use std::sync::Arc;

use chrono::Duration;

use tech_commerce_core::TokenKeys;

use crate::db::UserStore;
use crate::services::AuthService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Clone)]
struct AppStateInner {
    tokens: TokenKeys,
    users: Arc<dyn UserStore>,
    token_ttl: Duration,
    trust_proxy_headers: bool,
}

impl AppState {
    #[must_use]
    pub fn new(tokens: TokenKeys, users: Arc<dyn UserStore>, token_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                tokens,
                users,
                token_ttl,
                trust_proxy_headers: false,
            }),
        }
    }

    /// Key rate limits on ingress-provided client address headers.
    ///
    /// Only safe when every request arrives through a proxy that overwrites
    /// `x-forwarded-for`.
    #[must_use]
    pub fn behind_trusted_proxy(self, trust: bool) -> Self {
        let inner = Arc::unwrap_or_clone(self.inner);
        Self {
            inner: Arc::new(AppStateInner {
                trust_proxy_headers: trust,
                ..inner
            }),
        }
    }

    #[must_use]
    pub fn trusts_proxy_headers(&self) -> bool {
        self.inner.trust_proxy_headers
    }

    /// Credential signing and verification keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Authentication operations over this state's store and keys.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.tokens(), self.inner.token_ttl)
    }
}

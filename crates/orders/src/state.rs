//! Application state shared across handlers.

use std::sync::Arc;

use tech_commerce_core::TokenKeys;

use crate::db::{IdentityDirectory, OrderStore};
use crate::services::OrderService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the only process-wide state of the
/// service: the credential keys and the two storage backends.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    tokens: TokenKeys,
    orders: Arc<dyn OrderStore>,
    identities: Arc<dyn IdentityDirectory>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        tokens: TokenKeys,
        orders: Arc<dyn OrderStore>,
        identities: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                tokens,
                orders,
                identities,
            }),
        }
    }

    /// Credential verification keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    /// The order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Order operations over this state's stores.
    #[must_use]
    pub fn order_service(&self) -> OrderService<'_> {
        OrderService::new(self.inner.orders.as_ref(), self.inner.identities.as_ref())
    }
}

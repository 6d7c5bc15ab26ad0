//! In-process stores.
//!
//! These back the router tests and can stand in for Postgres when running the
//! service against fixtures. Both can be switched into a failing mode to
//! exercise outage handling.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use tech_commerce_core::{Order, OrderId, Submitter, UserId};

use super::{IdentityDirectory, OrderStore, RepositoryError};
use crate::models::NewOrder;

/// Order store held in memory.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
    last_id: AtomicI32,
    unavailable: AtomicBool,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "in-memory store switched off".to_owned(),
            ));
        }
        Ok(())
    }

    /// Newest first, ties broken by descending id.
    fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_i32().cmp(&a.id.as_i32()))
        });
        orders
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.check_available()?;

        let id = OrderId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let order = Order {
            id,
            owner: order.owner,
            items: order.items,
            address: order.address,
            total: order.total,
            created_at: Utc::now(),
        };

        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        self.check_available()?;

        let orders = self.orders.read().await;
        Ok(Self::sorted(
            orders.iter().filter(|o| o.owner == owner).cloned().collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_available()?;

        Ok(Self::sorted(self.orders.read().await.clone()))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

/// Identity directory held in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityDirectory {
    identities: RwLock<HashMap<UserId, Submitter>>,
    failing: RwLock<HashSet<UserId>>,
}

impl MemoryIdentityDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an identity.
    pub async fn insert(&self, id: UserId, submitter: Submitter) {
        self.identities.write().await.insert(id, submitter);
    }

    /// Remove an identity, as if the account had been deleted.
    pub async fn remove(&self, id: UserId) {
        self.identities.write().await.remove(&id);
    }

    /// Make lookups of `id` fail with a storage error.
    pub async fn fail_lookups_for(&self, id: UserId) {
        self.failing.write().await.insert(id);
    }
}

#[async_trait]
impl IdentityDirectory for MemoryIdentityDirectory {
    async fn find(&self, id: UserId) -> Result<Option<Submitter>, RepositoryError> {
        if self.failing.read().await.contains(&id) {
            return Err(RepositoryError::Unavailable(format!(
                "lookup of identity {id} failed"
            )));
        }
        Ok(self.identities.read().await.get(&id).cloned())
    }
}

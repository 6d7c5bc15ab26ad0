//! Order placement and retrieval.

use thiserror::Error;

use tech_commerce_core::{Order, Submitter, UserId};

use super::validate::{OrderDraft, ValidationError, validate};
use crate::db::{IdentityDirectory, OrderStore, RepositoryError};
use crate::models::SubmittedOrder;

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted order failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The identity placing the order no longer exists.
    #[error("user {0} not found")]
    OwnerNotFound(UserId),

    /// Storage failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Composes validation, the order store and the identity directory.
pub struct OrderService<'a> {
    store: &'a dyn OrderStore,
    directory: &'a dyn IdentityDirectory,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn OrderStore, directory: &'a dyn IdentityDirectory) -> Self {
        Self { store, directory }
    }

    /// Validate and persist an order on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Invalid` if the draft fails validation,
    /// `OrderError::OwnerNotFound` if the identity no longer exists, and
    /// `OrderError::Repository` if either store fails.
    pub async fn place(&self, owner: UserId, draft: OrderDraft) -> Result<Order, OrderError> {
        let new_order = validate(owner, draft)?;

        if self.directory.find(owner).await?.is_none() {
            return Err(OrderError::OwnerNotFound(owner));
        }

        let order = self.store.create(new_order).await?;
        tracing::info!(
            order_id = %order.id,
            user_id = %owner,
            items = order.items.len(),
            total = %order.total,
            "Order placed"
        );

        Ok(order)
    }

    /// Orders placed by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn orders_of(&self, owner: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list_by_owner(owner).await?)
    }

    /// Every order, newest first, each paired with its submitter.
    ///
    /// Owners are resolved one at a time. An owner that cannot be resolved,
    /// whether missing or because the lookup failed, is shown with
    /// placeholder details instead of failing the listing.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the order store fails.
    pub async fn all_orders(&self) -> Result<Vec<SubmittedOrder>, OrderError> {
        let orders = self.store.list_all().await?;

        let mut listing = Vec::with_capacity(orders.len());
        for order in orders {
            let submitter = match self.directory.find(order.owner).await {
                Ok(Some(submitter)) => submitter,
                Ok(None) => {
                    tracing::warn!(order_id = %order.id, user_id = %order.owner, "Order owner not found");
                    Submitter::unknown()
                }
                Err(e) => {
                    tracing::warn!(
                        order_id = %order.id,
                        user_id = %order.owner,
                        error = %e,
                        "Order owner lookup failed"
                    );
                    Submitter::unknown()
                }
            };
            listing.push(SubmittedOrder::new(order, submitter));
        }

        Ok(listing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use tech_commerce_core::Role;

    use super::*;
    use crate::db::{MemoryIdentityDirectory, MemoryOrderStore};

    fn draft() -> OrderDraft {
        OrderDraft::from_json(json!({
            "items": [{"ID": "7", "Name": "Cable", "quantity": 1, "Price": 4.5}],
            "address": {"address": "2 Side St", "city": "Gotham", "zip": "07001"},
            "total": 4.5
        }))
        .unwrap()
    }

    fn jane() -> Submitter {
        Submitter::new(
            "Jane".to_owned(),
            "Doe".to_owned(),
            "jane@tech.com".to_owned(),
            Role::User,
        )
    }

    #[tokio::test]
    async fn test_place_requires_existing_owner() {
        let store = MemoryOrderStore::new();
        let directory = MemoryIdentityDirectory::new();
        let service = OrderService::new(&store, &directory);

        let result = service.place(UserId::new(1), draft()).await;
        assert!(matches!(result, Err(OrderError::OwnerNotFound(_))));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_validates_before_lookup() {
        let store = MemoryOrderStore::new();
        let directory = MemoryIdentityDirectory::new();
        let service = OrderService::new(&store, &directory);

        let result = service.place(UserId::new(1), OrderDraft::default()).await;
        assert!(matches!(
            result,
            Err(OrderError::Invalid(ValidationError::NoItems))
        ));
    }

    #[tokio::test]
    async fn test_all_orders_falls_back_to_placeholder() {
        let store = MemoryOrderStore::new();
        let directory = MemoryIdentityDirectory::new();
        directory.insert(UserId::new(1), jane()).await;
        directory.insert(UserId::new(2), jane()).await;
        directory.insert(UserId::new(3), jane()).await;

        let service = OrderService::new(&store, &directory);
        service.place(UserId::new(1), draft()).await.unwrap();
        service.place(UserId::new(2), draft()).await.unwrap();
        service.place(UserId::new(3), draft()).await.unwrap();

        directory.remove(UserId::new(2)).await;
        directory.fail_lookups_for(UserId::new(3)).await;

        let listing = service.all_orders().await.unwrap();
        assert_eq!(listing.len(), 3);

        let by_owner = |id: i32| {
            listing
                .iter()
                .find(|o| o.owner == UserId::new(id))
                .unwrap()
                .user
                .clone()
        };
        assert_eq!(by_owner(1), jane());
        assert_eq!(by_owner(2), Submitter::unknown());
        assert_eq!(by_owner(3), Submitter::unknown());
    }

    #[tokio::test]
    async fn test_all_orders_propagates_store_outage() {
        let store = MemoryOrderStore::new();
        let directory = MemoryIdentityDirectory::new();
        store.set_unavailable(true);

        let service = OrderService::new(&store, &directory);
        assert!(matches!(
            service.all_orders().await,
            Err(OrderError::Repository(_))
        ));
    }
}

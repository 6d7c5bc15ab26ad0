//! Order storage.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tech_commerce_core::{LineItem, Order, OrderId, Price, ShippingAddress, UserId};

use super::RepositoryError;
use crate::models::NewOrder;

/// Persists and retrieves orders.
///
/// Orders are written once and never updated or deleted. Listings are ordered
/// newest first, ties broken by descending id.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order, assigning its id and creation timestamp.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders submitted by `owner`, newest first.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    street: String,
    city: String,
    postal_code: String,
    total: Price,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    item_ref: String,
    name: String,
    quantity: i32,
    unit_price: Price,
}

impl TryFrom<OrderItemRow> for LineItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order {} has item quantity {}",
                row.order_id, row.quantity
            ))
        })?;

        Ok(Self {
            item_id: row.item_ref,
            name: row.name,
            quantity,
            price: row.unit_price,
        })
    }
}

/// `PostgreSQL`-backed order store.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the line items of `rows` and assemble full orders, keeping row order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, item_ref, name, quantity, unit_price
            FROM orders.order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
        for row in item_rows {
            let order_id = row.order_id;
            items.entry(order_id).or_default().push(row.try_into()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| Order {
                items: items.remove(&row.id).unwrap_or_default(),
                id: row.id,
                owner: row.user_id,
                address: ShippingAddress {
                    street: row.street,
                    city: row.city,
                    postal_code: row.postal_code,
                },
                total: row.total,
                created_at: row.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (id, created_at): (OrderId, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO orders.orders (user_id, street, city, postal_code, total)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            ",
        )
        .bind(order.owner)
        .bind(&order.address.street)
        .bind(&order.address.city)
        .bind(&order.address.postal_code)
        .bind(order.total)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption("too many line items".to_owned())
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", item.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO orders.order_items (order_id, position, item_ref, name, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(id)
            .bind(position)
            .bind(&item.item_id)
            .bind(&item.name)
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id,
            owner: order.owner,
            items: order.items,
            address: order.address,
            total: order.total,
            created_at,
        })
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, street, city, postal_code, total, created_at
            FROM orders.orders
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, street, city, postal_code, total, created_at
            FROM orders.orders
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

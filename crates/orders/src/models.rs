//! Order service domain types that are not shared with other services.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tech_commerce_core::{LineItem, Order, OrderId, Price, ShippingAddress, Submitter, UserId};

/// A validated order that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub owner: UserId,
    pub items: Vec<LineItem>,
    pub address: ShippingAddress,
    pub total: Price,
}

/// An order as shown in the all-orders listing: the owner reference is
/// replaced by the submitter's identity details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedOrder {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "userId")]
    pub owner: UserId,
    pub user: Submitter,
    pub items: Vec<LineItem>,
    pub address: ShippingAddress,
    pub total: Price,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl SubmittedOrder {
    #[must_use]
    pub fn new(order: Order, user: Submitter) -> Self {
        Self {
            id: order.id,
            owner: order.owner,
            user,
            items: order.items,
            address: order.address,
            total: order.total,
            created_at: order.created_at,
        }
    }
}

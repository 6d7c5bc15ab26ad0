//! Order records as they are stored and returned to clients.
//!
//! Field names on the wire follow the storefront checkout client, which sends
//! line items as `{ID, Name, quantity, Price}` and addresses as
//! `{address, city, zip}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, Price, Role, UserId};

/// One purchased product inside an order. Immutable once embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalogue reference of the purchased item.
    #[serde(rename = "ID")]
    pub item_id: String,
    /// Display name at the time of purchase.
    #[serde(rename = "Name")]
    pub name: String,
    /// Number of units, at least one.
    pub quantity: u32,
    /// Unit price at the time of purchase.
    #[serde(rename = "Price")]
    pub price: Price,
}

impl LineItem {
    /// Quantity times unit price, `None` if it overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        self.price.checked_mul(self.quantity)
    }
}

/// Where an order is shipped. Free-form; no format validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Street line.
    #[serde(rename = "address")]
    pub street: String,
    /// City.
    pub city: String,
    /// Postal code.
    #[serde(rename = "zip")]
    pub postal_code: String,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// The identity that submitted the order.
    #[serde(rename = "user")]
    pub owner: UserId,
    pub items: Vec<LineItem>,
    pub address: ShippingAddress,
    pub total: Price,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the line item subtotals.
    ///
    /// Not guaranteed to equal [`Order::total`]: the total is what the client
    /// submitted.
    #[must_use]
    pub fn items_total(&self) -> Option<Price> {
        items_total(&self.items)
    }
}

/// Sum of the subtotals of `items`, `None` if any step overflows.
#[must_use]
pub fn items_total(items: &[LineItem]) -> Option<Price> {
    items
        .iter()
        .try_fold(Price::ZERO, |total, item| total.checked_add(item.subtotal()?))
}

/// Identity details attached to an order in the all-orders listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitter {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl Submitter {
    /// Build submitter details from a resolved identity.
    #[must_use]
    pub fn new(first_name: String, last_name: String, email: String, role: Role) -> Self {
        Self {
            first_name,
            last_name,
            email,
            role: role.to_string(),
        }
    }

    /// Stand-in used when the owner of an order cannot be resolved.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            first_name: "Unknown".to_owned(),
            last_name: String::new(),
            email: "N/A".to_owned(),
            role: "N/A".to_owned(),
        }
    }
}

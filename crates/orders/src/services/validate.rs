//! Structural validation of submitted orders.

use serde::Deserialize;
use thiserror::Error;

use tech_commerce_core::{LineItem, Price, ShippingAddress, UserId, items_total};

use crate::models::NewOrder;

/// Why a submitted order was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body does not match the order schema.
    #[error("malformed order: {0}")]
    Malformed(String),

    #[error("order must contain at least one item")]
    NoItems,

    #[error("shipping address is required")]
    MissingAddress,

    #[error("order total is required")]
    MissingTotal,

    #[error("order total must be greater than zero")]
    NonPositiveTotal,

    #[error("item {index} must have a quantity of at least 1")]
    ZeroQuantity { index: usize },

    #[error("item {index} has a negative price")]
    NegativePrice { index: usize },

    #[error("item {index} quantity is too large")]
    QuantityTooLarge { index: usize },

    /// More than two decimal places, or beyond the largest storable amount.
    #[error("order total must have at most 2 decimal places and not exceed {max}", max = Price::MAX_STORED)]
    UnstorableTotal,

    #[error("item {index} price must have at most 2 decimal places and not exceed {max}", max = Price::MAX_STORED)]
    UnstorablePrice { index: usize },
}

/// An order as submitted by a client, before validation.
///
/// Every field is optional so that absence is reported as a validation
/// failure rather than a parse failure. Unknown fields (such as a body
/// `token`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    pub items: Option<Vec<LineItem>>,
    pub address: Option<ShippingAddress>,
    pub total: Option<Price>,
}

impl OrderDraft {
    /// Parse a draft from an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] if a present field has the wrong
    /// shape (e.g. an item without a `Name`, or a fractional quantity).
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}

/// Largest quantity storage holds for one line item.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Check a draft and turn it into an order ready for persistence.
///
/// Amounts must be storable exactly, so the order read back later equals the
/// one confirmed now. The submitted total is taken as-is. It is not
/// cross-checked against the line items; a mismatch (including a line item
/// sum too large to compute) is only logged.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(owner: UserId, draft: OrderDraft) -> Result<NewOrder, ValidationError> {
    let items = draft
        .items
        .filter(|items| !items.is_empty())
        .ok_or(ValidationError::NoItems)?;
    let address = draft.address.ok_or(ValidationError::MissingAddress)?;
    let total = draft.total.ok_or(ValidationError::MissingTotal)?;

    if !total.is_positive() {
        return Err(ValidationError::NonPositiveTotal);
    }
    if !total.is_storable() {
        return Err(ValidationError::UnstorableTotal);
    }

    for (index, item) in items.iter().enumerate() {
        if item.quantity == 0 {
            return Err(ValidationError::ZeroQuantity { index });
        }
        if item.quantity > MAX_QUANTITY {
            return Err(ValidationError::QuantityTooLarge { index });
        }
        if item.price.is_negative() {
            return Err(ValidationError::NegativePrice { index });
        }
        if !item.price.is_storable() {
            return Err(ValidationError::UnstorablePrice { index });
        }
    }

    match items_total(&items) {
        Some(items_total) if items_total == total => {}
        Some(items_total) => tracing::warn!(
            user_id = %owner,
            submitted_total = %total,
            items_total = %items_total,
            "Order total does not match line items"
        ),
        None => tracing::warn!(
            user_id = %owner,
            submitted_total = %total,
            "Order line items overflow when summed"
        ),
    }

    Ok(NewOrder {
        owner,
        items,
        address,
        total,
    })
}

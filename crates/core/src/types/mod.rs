//! Core types for Tech Commerce.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use order::{LineItem, Order, ShippingAddress, Submitter, items_total};
pub use price::{Price, PriceError};
pub use role::{Role, RoleParseError};

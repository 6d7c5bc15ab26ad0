//! Tech Commerce Core - Shared types library.
//!
//! This crate provides common types used across all Tech Commerce components:
//! - `orders` - Order placement and retrieval service
//! - `identity` - Account registration and credential issuing service
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no database
//! access, no HTTP clients. Credential signing lives here because both services
//! must agree on the token format and the signing secret is injected by the
//! caller.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles and orders
//! - [`token`] - Signed bearer credentials (issue and verify)
//! - [`secret`] - Strength checks for the signing secret
//! - [`request_id`] - Correlation ids carried across services

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod request_id;
pub mod secret;
pub mod token;
pub mod types;

pub use secret::{WeakSecret, check_signing_secret};
pub use token::{Claims, TokenError, TokenKeys, bearer_token};
pub use types::*;

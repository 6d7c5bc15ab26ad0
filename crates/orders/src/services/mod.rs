//! Business logic for the order service.
//!
//! - `validate` - structural checks on submitted orders
//! - `orders` - placement, owner-scoped listing and the enriched all-orders listing

pub mod orders;
pub mod validate;

pub use orders::{OrderError, OrderService};
pub use validate::{OrderDraft, ValidationError};

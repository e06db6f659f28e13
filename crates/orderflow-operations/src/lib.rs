//! Order fulfillment operations built on `orderflow-saga`.
//!
//! Placing an order is three local actions that must hold together as one:
//! reserve stock, charge the customer, send the confirmation. Each action
//! lives in a saga step paired with its undo (release, refund, cancellation
//! notice), so a failure anywhere rolls the earlier actions back.
//!
//! Service backends sit behind the [`traits`] seam; [`providers`] ships
//! in-memory implementations usable both standalone and as test doubles.

mod error;
pub mod operations;
pub mod providers;
pub mod traits;
pub mod types;

pub use error::{InventoryError, NotificationError, OperationError, PaymentError, Result};

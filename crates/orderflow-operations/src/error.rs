use thiserror::Error;

use crate::types::OrderId;

/// Failures from inventory backends.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The product exists but cannot cover the request. An expected
    /// business outcome, reported by steps as a rejection.
    #[error("insufficient stock for '{product}': requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    #[error("unknown product '{0}'")]
    UnknownProduct(String),

    #[error("unknown reservation '{0}'")]
    UnknownReservation(String),

    #[error("inventory backend unavailable: {0}")]
    Backend(String),
}

/// Failures from payment gateways.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The charge was refused. An expected business outcome, reported by
    /// steps as a rejection.
    #[error("payment declined for '{customer}': {reason}")]
    Declined { customer: String, reason: String },

    #[error("unknown payment '{0}'")]
    UnknownPayment(String),

    #[error("payment gateway unavailable: {0}")]
    Gateway(String),
}

/// Failures from notification channels.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to notify '{customer}': {reason}")]
    Delivery { customer: String, reason: String },
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// A step declined on business grounds; every completed step was given
    /// a rollback attempt before this surfaced.
    #[error("order '{order}' rejected: {reason}")]
    OrderRejected { order: OrderId, reason: String },

    /// A step needed a context value nothing had written. Indicates a
    /// mis-assembled saga, not a runtime condition.
    #[error("missing context value '{0}'")]
    MissingContextValue(&'static str),
}

pub type Result<T> = std::result::Result<T, OperationError>;

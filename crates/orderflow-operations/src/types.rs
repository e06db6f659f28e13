//! Identifier newtypes and the order payloads flowing through the saga.

use std::fmt;

use uuid::Uuid;

/// Caller-assigned identifier of one order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock-keeping identifier of a sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle for stock held back for one order, minted by the inventory
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservationId(Uuid);

impl ReservationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for a settled charge, minted by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentId(Uuid);

impl PaymentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for a delivered notice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationId(Uuid);

impl NotificationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the caller wants fulfilled.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub order_id: OrderId,
    pub customer: String,
    pub product: ProductId,
    pub quantity: u32,
    /// Total charge, in the smallest currency unit.
    pub amount_cents: u64,
}

/// The handles a successfully fulfilled order leaves behind.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub reservation: ReservationId,
    pub payment: PaymentId,
    pub confirmation: NotificationId,
}

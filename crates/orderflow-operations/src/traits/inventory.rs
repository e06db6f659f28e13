use crate::error::InventoryError;
use crate::types::{ProductId, ReservationId};

/// Stock reservation backend.
pub trait InventoryProvider: Send + Sync {
    /// Hold `quantity` units of `product` until the reservation is released
    /// or consumed.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InsufficientStock`] when the product exists
    /// but cannot cover the request, other variants for backend trouble.
    fn reserve(&self, product: &ProductId, quantity: u32) -> Result<ReservationId, InventoryError>;

    /// Return previously held units to stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation is unknown or the backend fails.
    fn release(&self, reservation: &ReservationId) -> Result<(), InventoryError>;
}

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::error::InventoryError;
use crate::traits::InventoryProvider;
use crate::types::{ProductId, ReservationId};

#[derive(Debug, Default)]
struct InventoryState {
    stock: IndexMap<ProductId, u32>,
    reservations: IndexMap<ReservationId, Hold>,
}

#[derive(Debug)]
struct Hold {
    product: ProductId,
    quantity: u32,
}

/// Inventory backed by an in-process table.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    state: Mutex<InventoryState>,
}

impl InMemoryInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stock level for a product, replacing any previous level.
    pub fn put_stock(&self, product: ProductId, quantity: u32) {
        self.lock_state().stock.insert(product, quantity);
    }

    /// Units currently available for a product. Unknown products count as
    /// zero.
    #[must_use]
    pub fn available(&self, product: &ProductId) -> u32 {
        self.lock_state().stock.get(product).copied().unwrap_or(0)
    }

    /// Number of reservations not yet released.
    #[must_use]
    pub fn outstanding_reservations(&self) -> usize {
        self.lock_state().reservations.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, InventoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InventoryProvider for InMemoryInventory {
    fn reserve(&self, product: &ProductId, quantity: u32) -> Result<ReservationId, InventoryError> {
        let mut state = self.lock_state();
        let Some(available) = state.stock.get_mut(product) else {
            return Err(InventoryError::UnknownProduct(product.to_string()));
        };
        if *available < quantity {
            return Err(InventoryError::InsufficientStock {
                product: product.to_string(),
                requested: quantity,
                available: *available,
            });
        }

        *available -= quantity;
        let reservation = ReservationId::new();
        state.reservations.insert(
            reservation.clone(),
            Hold {
                product: product.clone(),
                quantity,
            },
        );
        Ok(reservation)
    }

    fn release(&self, reservation: &ReservationId) -> Result<(), InventoryError> {
        let mut state = self.lock_state();
        let Some(hold) = state.reservations.shift_remove(reservation) else {
            return Err(InventoryError::UnknownReservation(reservation.to_string()));
        };
        if let Some(available) = state.stock.get_mut(&hold.product) {
            *available += hold.quantity;
        }
        Ok(())
    }
}

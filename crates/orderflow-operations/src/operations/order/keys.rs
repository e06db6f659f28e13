//! Context keys shared by the order saga's steps.

use orderflow_saga::ContextKey;

use crate::types::{NotificationId, OrderRequest, PaymentId, ReservationId};

/// The order being fulfilled. Seeded before the run starts.
pub static ORDER: ContextKey<OrderRequest> = ContextKey::new("order.request");

/// Hold created by the reserve step, consumed by its compensation.
pub static RESERVATION: ContextKey<ReservationId> = ContextKey::new("order.reservation");

/// Charge settled by the payment step, consumed by its compensation.
pub static PAYMENT: ContextKey<PaymentId> = ContextKey::new("order.payment");

/// Receipt of the delivered confirmation notice.
pub static CONFIRMATION: ContextKey<NotificationId> = ContextKey::new("order.confirmation");

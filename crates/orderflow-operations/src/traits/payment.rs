use crate::error::PaymentError;
use crate::types::PaymentId;

/// Payment capture backend.
pub trait PaymentGateway: Send + Sync {
    /// Charge the customer for the given amount.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Declined`] when the charge is refused, other
    /// variants when the gateway itself fails.
    fn charge(&self, customer: &str, amount_cents: u64) -> Result<PaymentId, PaymentError>;

    /// Undo a previously settled charge.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is unknown or the gateway fails.
    fn refund(&self, payment: &PaymentId) -> Result<(), PaymentError>;
}

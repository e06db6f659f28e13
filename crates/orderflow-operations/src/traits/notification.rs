use crate::error::NotificationError;
use crate::types::{NotificationId, OrderId};

/// Customer-facing notification channel.
pub trait NotificationSender: Send + Sync {
    /// Tell the customer their order went through.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice cannot be delivered.
    fn order_confirmed(
        &self,
        customer: &str,
        order: &OrderId,
    ) -> Result<NotificationId, NotificationError>;

    /// Tell the customer their order was rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if the notice cannot be delivered.
    fn order_cancelled(&self, customer: &str, order: &OrderId) -> Result<(), NotificationError>;
}

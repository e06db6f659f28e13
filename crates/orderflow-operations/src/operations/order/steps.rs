use std::sync::Arc;

use orderflow_saga::{ExecutionContext, SagaStep, StepOutcome};
use tracing::debug;

use super::keys;
use crate::error::{InventoryError, OperationError, PaymentError};
use crate::traits::{InventoryProvider, NotificationSender, PaymentGateway};

type Ctx = ExecutionContext<OperationError>;

/// Holds stock for the order and parks the reservation id in the context.
pub struct ReserveInventoryStep<I> {
    inventory: Arc<I>,
}

impl<I> ReserveInventoryStep<I> {
    #[must_use]
    pub fn new(inventory: Arc<I>) -> Self {
        Self { inventory }
    }
}

impl<I> SagaStep for ReserveInventoryStep<I>
where
    I: InventoryProvider,
{
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "reserve_inventory"
    }

    fn execute(&self, ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        let Some(order) = ctx.get_keyed(&keys::ORDER).cloned() else {
            return StepOutcome::Fault(OperationError::MissingContextValue(keys::ORDER.name()));
        };

        match self.inventory.reserve(&order.product, order.quantity) {
            Ok(reservation) => {
                debug!(
                    order = %order.order_id,
                    reservation = %reservation,
                    quantity = order.quantity,
                    "reserved stock"
                );
                ctx.set_keyed(&keys::RESERVATION, reservation);
                StepOutcome::Completed
            }
            Err(err @ InventoryError::InsufficientStock { .. }) => {
                StepOutcome::rejected(err.to_string())
            }
            Err(err) => StepOutcome::Fault(err.into()),
        }
    }

    fn compensate(&self, ctx: &mut Ctx) -> Result<(), Self::Error> {
        // No reservation in the context means execute never got that far.
        let Some(reservation) = ctx.get_keyed(&keys::RESERVATION).cloned() else {
            return Ok(());
        };
        debug!(reservation = %reservation, "releasing reservation");
        self.inventory.release(&reservation)?;
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "release the stock reservation".to_string()
    }
}

/// Charges the customer and parks the payment id in the context.
pub struct ChargePaymentStep<P> {
    payments: Arc<P>,
}

impl<P> ChargePaymentStep<P> {
    #[must_use]
    pub fn new(payments: Arc<P>) -> Self {
        Self { payments }
    }
}

impl<P> SagaStep for ChargePaymentStep<P>
where
    P: PaymentGateway,
{
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "charge_payment"
    }

    fn execute(&self, ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        let Some(order) = ctx.get_keyed(&keys::ORDER).cloned() else {
            return StepOutcome::Fault(OperationError::MissingContextValue(keys::ORDER.name()));
        };

        match self.payments.charge(&order.customer, order.amount_cents) {
            Ok(payment) => {
                debug!(
                    order = %order.order_id,
                    payment = %payment,
                    amount_cents = order.amount_cents,
                    "charged customer"
                );
                ctx.set_keyed(&keys::PAYMENT, payment);
                StepOutcome::Completed
            }
            Err(err @ PaymentError::Declined { .. }) => StepOutcome::rejected(err.to_string()),
            Err(err) => StepOutcome::Fault(err.into()),
        }
    }

    fn compensate(&self, ctx: &mut Ctx) -> Result<(), Self::Error> {
        let Some(payment) = ctx.get_keyed(&keys::PAYMENT).cloned() else {
            return Ok(());
        };
        debug!(payment = %payment, "refunding charge");
        self.payments.refund(&payment)?;
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "refund the settled charge".to_string()
    }
}

/// Tells the customer the order went through.
pub struct SendConfirmationStep<N> {
    notifier: Arc<N>,
}

impl<N> SendConfirmationStep<N> {
    #[must_use]
    pub fn new(notifier: Arc<N>) -> Self {
        Self { notifier }
    }
}

impl<N> SagaStep for SendConfirmationStep<N>
where
    N: NotificationSender,
{
    type Error = OperationError;

    fn name(&self) -> &'static str {
        "send_confirmation"
    }

    fn execute(&self, ctx: &mut Ctx) -> StepOutcome<Self::Error> {
        let Some(order) = ctx.get_keyed(&keys::ORDER).cloned() else {
            return StepOutcome::Fault(OperationError::MissingContextValue(keys::ORDER.name()));
        };

        match self
            .notifier
            .order_confirmed(&order.customer, &order.order_id)
        {
            Ok(confirmation) => {
                debug!(order = %order.order_id, "sent confirmation");
                ctx.set_keyed(&keys::CONFIRMATION, confirmation);
                StepOutcome::Completed
            }
            Err(err) => StepOutcome::Fault(err.into()),
        }
    }

    fn compensate(&self, ctx: &mut Ctx) -> Result<(), Self::Error> {
        let Some(order) = ctx.get_keyed(&keys::ORDER).cloned() else {
            return Ok(());
        };
        debug!(order = %order.order_id, "sending cancellation notice");
        self.notifier
            .order_cancelled(&order.customer, &order.order_id)?;
        Ok(())
    }

    fn compensation_description(&self) -> String {
        "send a cancellation notice".to_string()
    }
}

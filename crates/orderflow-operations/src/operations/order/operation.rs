use std::sync::Arc;

use orderflow_saga::{CancelToken, ExecutionContext, SagaBuilder};
use tracing::{debug, info};

use super::keys;
use super::steps::{ChargePaymentStep, ReserveInventoryStep, SendConfirmationStep};
use crate::error::{OperationError, Result};
use crate::traits::{InventoryProvider, NotificationSender, PaymentGateway};
use crate::types::{OrderId, OrderReceipt, OrderRequest};

/// Fulfills one order as a saga: reserve stock, charge the customer, send
/// the confirmation. A failure anywhere rolls back what already happened.
pub struct PlaceOrderOperation<I, P, N> {
    inventory: Arc<I>,
    payments: Arc<P>,
    notifier: Arc<N>,
}

impl<I, P, N> PlaceOrderOperation<I, P, N>
where
    I: InventoryProvider + 'static,
    P: PaymentGateway + 'static,
    N: NotificationSender + 'static,
{
    #[must_use]
    pub fn new(inventory: Arc<I>, payments: Arc<P>, notifier: Arc<N>) -> Self {
        Self {
            inventory,
            payments,
            notifier,
        }
    }

    /// Run the order saga to completion or full rollback.
    ///
    /// # Errors
    ///
    /// Returns the faulting step's error as-is, or
    /// [`OperationError::OrderRejected`] when a step declined on business
    /// grounds. Either way, every completed step was given one rollback
    /// attempt before this returns.
    pub fn execute(&self, order: OrderRequest) -> Result<OrderReceipt> {
        self.execute_inner(order, None)
    }

    /// Like [`PlaceOrderOperation::execute`], with a cancellation token
    /// checked between steps.
    ///
    /// # Errors
    ///
    /// As [`PlaceOrderOperation::execute`]; a cancelled run surfaces as
    /// [`OperationError::OrderRejected`].
    pub fn execute_cancellable(
        &self,
        order: OrderRequest,
        token: CancelToken,
    ) -> Result<OrderReceipt> {
        self.execute_inner(order, Some(token))
    }

    fn execute_inner(&self, order: OrderRequest, token: Option<CancelToken>) -> Result<OrderReceipt> {
        let order_id = order.order_id.clone();
        info!(order = %order_id, customer = %order.customer, "placing order");

        let saga = SagaBuilder::new()
            .step(ReserveInventoryStep::new(Arc::clone(&self.inventory)))
            .step(ChargePaymentStep::new(Arc::clone(&self.payments)))
            .step(SendConfirmationStep::new(Arc::clone(&self.notifier)))
            .build();

        let mut ctx = ExecutionContext::new();
        if let Some(token) = token {
            ctx = ctx.with_cancel_token(token);
        }
        ctx.set_keyed(&keys::ORDER, order);

        if saga.run(&mut ctx) {
            let receipt = Self::receipt_from(&ctx, order_id)?;
            info!(order = %receipt.order_id, payment = %receipt.payment, "order placed");
            return Ok(receipt);
        }

        debug!(
            order = %order_id,
            rolled_back = ctx.compensated_steps().len(),
            "order saga rolled back"
        );
        if let Some(error) = ctx.take_last_error() {
            return Err(error);
        }
        let reason = ctx.failure_reason().unwrap_or("unknown failure").to_string();
        Err(OperationError::OrderRejected {
            order: order_id,
            reason,
        })
    }

    fn receipt_from(ctx: &ExecutionContext<OperationError>, order_id: OrderId) -> Result<OrderReceipt> {
        let reservation = ctx
            .get_keyed(&keys::RESERVATION)
            .cloned()
            .ok_or(OperationError::MissingContextValue(keys::RESERVATION.name()))?;
        let payment = ctx
            .get_keyed(&keys::PAYMENT)
            .cloned()
            .ok_or(OperationError::MissingContextValue(keys::PAYMENT.name()))?;
        let confirmation = ctx
            .get_keyed(&keys::CONFIRMATION)
            .cloned()
            .ok_or(OperationError::MissingContextValue(keys::CONFIRMATION.name()))?;

        Ok(OrderReceipt {
            order_id,
            reservation,
            payment,
            confirmation,
        })
    }
}

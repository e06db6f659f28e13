use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

use crate::error::PaymentError;
use crate::traits::PaymentGateway;
use crate::types::PaymentId;

#[derive(Debug)]
struct Charge {
    customer: String,
    amount_cents: u64,
    refunded: bool,
}

/// Payment gateway backed by an in-process ledger.
///
/// Decline and outage behavior are configurable so callers can exercise
/// both an expected refusal and a backend fault.
#[derive(Debug, Default)]
pub struct InMemoryPaymentGateway {
    charges: Mutex<IndexMap<PaymentId, Charge>>,
    decline_above_cents: Option<u64>,
    offline: bool,
}

impl InMemoryPaymentGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline any charge above `limit_cents`.
    #[must_use]
    pub fn with_decline_above(mut self, limit_cents: u64) -> Self {
        self.decline_above_cents = Some(limit_cents);
        self
    }

    /// Fail every call as if the gateway were unreachable.
    #[must_use]
    pub fn with_outage(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Sum of settled, unrefunded charges.
    #[must_use]
    pub fn captured_total(&self) -> u64 {
        self.lock_charges()
            .values()
            .filter(|charge| !charge.refunded)
            .map(|charge| charge.amount_cents)
            .sum()
    }

    /// Sum of unrefunded charges against one customer.
    #[must_use]
    pub fn captured_for(&self, customer: &str) -> u64 {
        self.lock_charges()
            .values()
            .filter(|charge| !charge.refunded && charge.customer == customer)
            .map(|charge| charge.amount_cents)
            .sum()
    }

    /// Number of charges that have been refunded.
    #[must_use]
    pub fn refunded_count(&self) -> usize {
        self.lock_charges()
            .values()
            .filter(|charge| charge.refunded)
            .count()
    }

    fn lock_charges(&self) -> MutexGuard<'_, IndexMap<PaymentId, Charge>> {
        self.charges.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PaymentGateway for InMemoryPaymentGateway {
    fn charge(&self, customer: &str, amount_cents: u64) -> Result<PaymentId, PaymentError> {
        if self.offline {
            return Err(PaymentError::Gateway("gateway offline".to_string()));
        }
        if self
            .decline_above_cents
            .is_some_and(|limit| amount_cents > limit)
        {
            return Err(PaymentError::Declined {
                customer: customer.to_string(),
                reason: format!("amount {amount_cents} exceeds the card limit"),
            });
        }

        let payment = PaymentId::new();
        self.lock_charges().insert(
            payment.clone(),
            Charge {
                customer: customer.to_string(),
                amount_cents,
                refunded: false,
            },
        );
        Ok(payment)
    }

    fn refund(&self, payment: &PaymentId) -> Result<(), PaymentError> {
        if self.offline {
            return Err(PaymentError::Gateway("gateway offline".to_string()));
        }

        let mut charges = self.lock_charges();
        let Some(charge) = charges.get_mut(payment) else {
            return Err(PaymentError::UnknownPayment(payment.to_string()));
        };
        charge.refunded = true;
        Ok(())
    }
}

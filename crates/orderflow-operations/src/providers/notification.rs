use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::NotificationError;
use crate::traits::NotificationSender;
use crate::types::{NotificationId, OrderId};

/// Kind of notice delivered to a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Confirmation,
    Cancellation,
}

/// One delivered notice.
#[derive(Debug, Clone)]
pub struct Notice {
    pub customer: String,
    pub order: OrderId,
    pub kind: NoticeKind,
}

/// Notification sender that records every notice it delivers.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notice>>,
    fail_confirmations: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every confirmation attempt, for exercising rollback of the
    /// steps before it.
    #[must_use]
    pub fn with_failing_confirmations(mut self) -> Self {
        self.fail_confirmations = true;
        self
    }

    /// Everything delivered so far, in delivery order.
    #[must_use]
    pub fn sent(&self) -> Vec<Notice> {
        self.lock_sent().clone()
    }

    fn lock_sent(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationSender for RecordingNotifier {
    fn order_confirmed(
        &self,
        customer: &str,
        order: &OrderId,
    ) -> Result<NotificationId, NotificationError> {
        if self.fail_confirmations {
            return Err(NotificationError::Delivery {
                customer: customer.to_string(),
                reason: "delivery channel refused the message".to_string(),
            });
        }

        self.lock_sent().push(Notice {
            customer: customer.to_string(),
            order: order.clone(),
            kind: NoticeKind::Confirmation,
        });
        Ok(NotificationId::new())
    }

    fn order_cancelled(&self, customer: &str, order: &OrderId) -> Result<(), NotificationError> {
        self.lock_sent().push(Notice {
            customer: customer.to_string(),
            order: order.clone(),
            kind: NoticeKind::Cancellation,
        });
        Ok(())
    }
}

pub mod keys;
mod operation;
mod steps;

pub use operation::PlaceOrderOperation;
pub use steps::{ChargePaymentStep, ReserveInventoryStep, SendConfirmationStep};

mod order;

pub use order::keys;
pub use order::{
    ChargePaymentStep, PlaceOrderOperation, ReserveInventoryStep, SendConfirmationStep,
};

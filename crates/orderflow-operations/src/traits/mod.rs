mod inventory;
mod notification;
mod payment;

pub use inventory::InventoryProvider;
pub use notification::NotificationSender;
pub use payment::PaymentGateway;

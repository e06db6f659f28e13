//! In-memory provider implementations.
//!
//! Each provider is a single mutex around its tables: state is reached only
//! through a handle, never through process-wide statics, and reserve/release
//! style pairs are atomic with respect to each other.

mod inventory;
mod notification;
mod payment;

pub use inventory::InMemoryInventory;
pub use notification::{Notice, NoticeKind, RecordingNotifier};
pub use payment::InMemoryPaymentGateway;

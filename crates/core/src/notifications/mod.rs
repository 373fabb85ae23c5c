//! Donor receipts sent after an order is confirmed.

mod notifications_model;
mod notifications_traits;

pub use notifications_model::{DonationReceipt, ReceiptLine};
pub use notifications_traits::{NoopReceiptNotifier, ReceiptNotifierTrait};

use async_trait::async_trait;

use crate::errors::Result;
use crate::notifications::notifications_model::DonationReceipt;

/// Delivers a receipt to the donor.
#[async_trait]
pub trait ReceiptNotifierTrait: Send + Sync {
    async fn send_receipt(&self, receipt: &DonationReceipt) -> Result<()>;
}

/// Notifier used when no delivery channel is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReceiptNotifier;

#[async_trait]
impl ReceiptNotifierTrait for NoopReceiptNotifier {
    async fn send_receipt(&self, receipt: &DonationReceipt) -> Result<()> {
        log::debug!(
            "No receipt channel configured, skipping receipt for {}",
            receipt.order_number
        );
        Ok(())
    }
}

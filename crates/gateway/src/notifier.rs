//! Receipt delivery over an HTTP webhook.

use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use donatio_core::errors::{Error, Result};
use donatio_core::notifications::{DonationReceipt, ReceiptNotifierTrait};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Posts each receipt as JSON to a notification service, which owns the
/// email templates and delivery.
#[derive(Debug, Clone)]
pub struct WebhookReceiptNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookReceiptNotifier {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ReceiptNotifierTrait for WebhookReceiptNotifier {
    async fn send_receipt(&self, receipt: &DonationReceipt) -> Result<()> {
        debug!("[Receipts] POST {} for {}", self.url, receipt.order_number);
        let response = self
            .client
            .post(&self.url)
            .json(receipt)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("Receipt request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "[Receipts] Notification service answered {} for {}",
                status, receipt.order_number
            );
            return Err(Error::Notification(format!(
                "Notification service answered {}",
                status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donatio_core::checkout::PaymentMode;

    #[tokio::test]
    async fn test_unreachable_service_is_a_notification_error() {
        let notifier = WebhookReceiptNotifier::new("http://127.0.0.1:9/receipts").unwrap();
        let receipt = DonationReceipt {
            order_number: "ORD-100001".to_string(),
            donor_email: "fatima@example.org".to_string(),
            donor_name: "Fatima Begum".to_string(),
            mode: PaymentMode::Payment,
            currency: "gbp".to_string(),
            total_pence: 2500,
            fees_pence: 0,
            gift_aid: true,
            lines: Vec::new(),
        };

        let err = notifier.send_receipt(&receipt).await.unwrap_err();
        assert!(matches!(err, Error::Notification(_)));
    }
}

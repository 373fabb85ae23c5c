use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checkout::{Frequency, PaymentMode};

/// One line of a receipt: a donation or a recurring commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub number: String,
    pub campaign: String,
    pub donation_type: String,
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub scheduled_for: Option<NaiveDate>,
}

/// Payload handed to the receipt notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub order_number: String,
    pub donor_email: String,
    pub donor_name: String,
    pub mode: PaymentMode,
    pub currency: String,
    pub total_pence: i64,
    pub fees_pence: i64,
    pub gift_aid: bool,
    pub lines: Vec<ReceiptLine>,
}

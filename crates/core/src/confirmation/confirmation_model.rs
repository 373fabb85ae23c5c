use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::checkout::{Order, OrderStatus, PaymentMode};
use crate::donations::{Donation, NewDonation, NewRecurringDonation, RecurringDonation};

/// Callback from the payment UI once the gateway flow finished.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    pub order_number: String,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub setup_intent_id: Option<String>,
}

/// Records to insert when an order is confirmed. Numbers are assigned by the
/// store inside the confirming transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderMaterialization {
    pub donations: Vec<NewDonation>,
    pub recurring: Vec<NewRecurringDonation>,
}

/// Result of `OrderRepositoryTrait::confirm_order`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedOrder {
    pub order: Order,
    pub donations: Vec<Donation>,
    pub recurring: Vec<RecurringDonation>,
    /// False when the order had already left PENDING before this call.
    pub newly_confirmed: bool,
}

/// Stable acknowledgement; repeated confirmations return the same value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationAck {
    pub order_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub mode: PaymentMode,
    pub donation_numbers: Vec<String>,
    pub recurring_numbers: Vec<String>,
    pub confirmed_at: Option<NaiveDateTime>,
}

impl ConfirmationAck {
    pub fn from_records(
        order: &Order,
        donations: &[Donation],
        recurring: &[RecurringDonation],
    ) -> Self {
        Self {
            order_id: order.id.clone(),
            order_number: order.order_number.clone(),
            status: order.status,
            mode: order.mode,
            donation_numbers: donations.iter().map(|d| d.donation_number.clone()).collect(),
            recurring_numbers: recurring.iter().map(|r| r.donation_number.clone()).collect(),
            confirmed_at: order.confirmed_at,
        }
    }
}

/// What happened to the donor receipt for this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptStatus {
    Sent,
    /// The order is confirmed but the receipt could not be delivered.
    Failed(String),
    /// Nothing to send: a replay, or an order that did not confirm.
    NotSent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationOutcome {
    pub ack: ConfirmationAck,
    pub receipt: ReceiptStatus,
}

impl ConfirmationOutcome {
    pub fn receipt_warning(&self) -> Option<String> {
        match &self.receipt {
            ReceiptStatus::Failed(reason) => Some(format!("Receipt could not be sent: {}", reason)),
            _ => None,
        }
    }
}

//! Payment gateway models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metadata key every gateway object is tagged with.
pub const ORDER_NUMBER_METADATA_KEY: &str = "order_number";

/// Coarse result of a gateway interaction, as far as an order is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Completed,
    Pending,
    Failed,
}

impl GatewayOutcome {
    /// Failed dominates Pending, which dominates Completed.
    pub fn combine(self, other: GatewayOutcome) -> GatewayOutcome {
        use GatewayOutcome::*;
        match (self, other) {
            (Failed, _) | (_, Failed) => Failed,
            (Pending, _) | (_, Pending) => Pending,
            _ => Completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    RequiresCapture,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    pub fn outcome(&self) -> GatewayOutcome {
        match self {
            IntentStatus::Succeeded | IntentStatus::Processing | IntentStatus::RequiresCapture => {
                GatewayOutcome::Completed
            }
            IntentStatus::Canceled => GatewayOutcome::Failed,
            _ => GatewayOutcome::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Unpaid,
    Canceled,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    pub fn outcome(&self) -> GatewayOutcome {
        match self {
            SubscriptionStatus::Active | SubscriptionStatus::Trialing => GatewayOutcome::Completed,
            SubscriptionStatus::IncompleteExpired | SubscriptionStatus::Canceled => {
                GatewayOutcome::Failed
            }
            _ => GatewayOutcome::Pending,
        }
    }
}

/// Recurring cadence understood by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Day,
    Month,
    Year,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Day => "day",
            BillingInterval::Month => "month",
            BillingInterval::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRequest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub donor_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentRequest {
    pub order_number: String,
    pub amount_pence: i64,
    pub currency: String,
    pub customer_id: Option<String>,
    pub receipt_email: Option<String>,
    pub description: String,
    /// Keep the payment method for later off-session charges.
    pub save_payment_method: bool,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    pub order_number: String,
    pub customer_id: String,
    pub amount_pence: i64,
    pub currency: String,
    pub interval: BillingInterval,
    pub product_name: String,
    /// First billing date when it lies in the future.
    pub start_date: Option<NaiveDate>,
    /// Last day a charge may fall on.
    pub end_date: Option<NaiveDate>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupIntentRequest {
    pub order_number: String,
    pub customer_id: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    pub amount_pence: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// Secret of the first invoice's payment intent, or of the pending
    /// setup intent when billing starts later.
    pub client_secret: Option<String>,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: IntentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_combination_prefers_failure_then_pending() {
        use GatewayOutcome::*;
        assert_eq!(Completed.combine(Completed), Completed);
        assert_eq!(Completed.combine(Pending), Pending);
        assert_eq!(Pending.combine(Failed), Failed);
    }

    #[test]
    fn test_unknown_statuses_deserialize_as_pending() {
        let status: IntentStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status.outcome(), GatewayOutcome::Pending);
        let status: SubscriptionStatus = serde_json::from_str("\"incomplete_expired\"").unwrap();
        assert_eq!(status.outcome(), GatewayOutcome::Failed);
    }
}

//! Checkout domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::daily_giving::DailyGivingMode;
use crate::donors::DonorProfile;
use crate::errors::{Error, Result, ValidationError};
use crate::gateway::BillingInterval;

/// How often a cart item is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    OneOff,
    Monthly,
    Yearly,
    Daily,
}

impl Frequency {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::OneOff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::OneOff => "ONE_OFF",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
            Frequency::Daily => "DAILY",
        }
    }

    pub fn billing_interval(&self) -> Option<BillingInterval> {
        match self {
            Frequency::OneOff => None,
            Frequency::Monthly => Some(BillingInterval::Month),
            Frequency::Yearly => Some(BillingInterval::Year),
            Frequency::Daily => Some(BillingInterval::Day),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ONE_OFF" => Ok(Frequency::OneOff),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            "DAILY" => Ok(Frequency::Daily),
            other => Err(ValidationError::InvalidInput(format!("Unknown frequency '{}'", other)).into()),
        }
    }
}

/// A single donation line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub campaign: String,
    pub frequency: Frequency,
    pub donation_type: String,
    pub amount_pence: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odd_nights_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_mode: Option<DailyGivingMode>,
    /// First charge date. `None` means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl CartItem {
    /// True when the item's first charge falls after `today`.
    pub fn is_deferred(&self, today: NaiveDate) -> bool {
        self.start_date.is_some_and(|start| start > today)
    }

    /// A daily item the scheduler has not yet turned into concrete dates.
    pub fn is_unscheduled_daily(&self) -> bool {
        self.frequency == Frequency::Daily && self.start_date.is_none()
    }

    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if self.campaign.trim().is_empty() {
            return Err(ValidationError::MissingField("campaign".to_string()).into());
        }
        if self.donation_type.trim().is_empty() {
            return Err(ValidationError::MissingField("donationType".to_string()).into());
        }
        if self.amount_pence <= 0 {
            return Err(ValidationError::out_of_range("amountPence", "must be greater than zero").into());
        }
        if self.daily_end_date.is_some() && self.frequency != Frequency::Daily {
            return Err(ValidationError::InvalidInput(format!(
                "dailyEndDate is only allowed on DAILY items, not {}",
                self.frequency
            ))
            .into());
        }
        if let Some(start) = self.start_date {
            if start < today {
                return Err(ValidationError::out_of_range(
                    "startDate",
                    format!("{} is in the past", start),
                )
                .into());
            }
            if let Some(end) = self.daily_end_date {
                if end < start {
                    return Err(ValidationError::out_of_range(
                        "dailyEndDate",
                        format!("{} is before startDate {}", end, start),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// How the gateway is asked to collect money for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Single immediate charge.
    Payment,
    /// A recurring subscription only.
    Subscription,
    /// Immediate charge plus a subscription.
    Mixed,
    /// Save a payment method for later charges.
    Setup,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Payment => "payment",
            PaymentMode::Subscription => "subscription",
            PaymentMode::Mixed => "mixed",
            PaymentMode::Setup => "setup",
        }
    }

    pub fn charges_now(&self) -> bool {
        matches!(self, PaymentMode::Payment | PaymentMode::Mixed)
    }

    pub fn has_subscription(&self) -> bool {
        matches!(self, PaymentMode::Subscription | PaymentMode::Mixed)
    }
}

impl FromStr for PaymentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "payment" => Ok(PaymentMode::Payment),
            "subscription" => Ok(PaymentMode::Subscription),
            "mixed" => Ok(PaymentMode::Mixed),
            "setup" => Ok(PaymentMode::Setup),
            other => Err(Error::Unexpected(format!("Unknown payment mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(Error::Unexpected(format!("Unknown order status '{}'", other))),
        }
    }
}

/// Checkout submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub donor: DonorProfile,
    pub subtotal_pence: i64,
    #[serde(default)]
    pub fees_pence: i64,
    pub total_pence: i64,
    #[serde(default)]
    pub gift_aid: bool,
    /// Order number from an earlier attempt, to resume instead of starting over.
    #[serde(default)]
    pub order_number: Option<String>,
}

impl CheckoutRequest {
    /// Structural checks that need no clock or store.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(ValidationError::InvalidInput("Cart is empty".to_string()).into());
        }
        if self.subtotal_pence < 0 {
            return Err(ValidationError::out_of_range("subtotalPence", "must not be negative").into());
        }
        if self.fees_pence < 0 {
            return Err(ValidationError::out_of_range("feesPence", "must not be negative").into());
        }
        let expected = self.subtotal_pence.checked_add(self.fees_pence).ok_or_else(|| {
            Error::from(ValidationError::out_of_range("totalPence", "overflows"))
        })?;
        if self.total_pence != expected {
            return Err(ValidationError::out_of_range(
                "totalPence",
                format!(
                    "must equal subtotal plus fees ({} + {} = {}), got {}",
                    self.subtotal_pence, self.fees_pence, expected, self.total_pence
                ),
            )
            .into());
        }
        Ok(())
    }
}

/// What the client needs to finish collecting payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub order_number: String,
    pub mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_intent_client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_intent_id: Option<String>,
}

/// Domain model representing a persisted order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub donor_id: String,
    pub mode: PaymentMode,
    pub status: OrderStatus,
    pub currency: String,
    pub subtotal_pence: i64,
    pub fees_pence: i64,
    pub total_pence: i64,
    pub gift_aid: bool,
    pub items: Vec<CartItem>,
    pub payment_intent_id: Option<String>,
    pub subscription_id: Option<String>,
    pub setup_intent_id: Option<String>,
    #[serde(skip_serializing)]
    pub payment_client_secret: Option<String>,
    #[serde(skip_serializing)]
    pub subscription_client_secret: Option<String>,
    #[serde(skip_serializing)]
    pub setup_client_secret: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn to_checkout_response(&self) -> CheckoutResponse {
        CheckoutResponse {
            order_id: self.id.clone(),
            order_number: self.order_number.clone(),
            mode: self.mode,
            payment_client_secret: self.payment_client_secret.clone(),
            subscription_client_secret: self.subscription_client_secret.clone(),
            setup_intent_client_secret: self.setup_client_secret.clone(),
            payment_intent_id: self.payment_intent_id.clone(),
            subscription_id: self.subscription_id.clone(),
            setup_intent_id: self.setup_intent_id.clone(),
        }
    }

    /// The day the order was placed; deferral decisions are relative to it.
    pub fn placed_on(&self) -> NaiveDate {
        self.created_at.date()
    }
}

/// Input model for persisting a new order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub donor_id: String,
    pub mode: PaymentMode,
    pub currency: String,
    pub subtotal_pence: i64,
    pub fees_pence: i64,
    pub total_pence: i64,
    pub gift_aid: bool,
    pub items: Vec<CartItem>,
    pub payment_intent_id: Option<String>,
    pub subscription_id: Option<String>,
    pub setup_intent_id: Option<String>,
    pub payment_client_secret: Option<String>,
    pub subscription_client_secret: Option<String>,
    pub setup_client_secret: Option<String>,
}

//! Donation domain models.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::checkout::Frequency;
use crate::donors::DonorProfile;
use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationStatus {
    Pending,
    Scheduled,
    Completed,
    Failed,
    Refunded,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "PENDING",
            DonationStatus::Scheduled => "SCHEDULED",
            DonationStatus::Completed => "COMPLETED",
            DonationStatus::Failed => "FAILED",
            DonationStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for DonationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(DonationStatus::Pending),
            "SCHEDULED" => Ok(DonationStatus::Scheduled),
            "COMPLETED" => Ok(DonationStatus::Completed),
            "FAILED" => Ok(DonationStatus::Failed),
            "REFUNDED" => Ok(DonationStatus::Refunded),
            other => Err(Error::Unexpected(format!("Unknown donation status '{}'", other))),
        }
    }
}

/// Where a donation record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DonationSource {
    Checkout,
    Manual,
    Recurring,
}

impl DonationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationSource::Checkout => "CHECKOUT",
            DonationSource::Manual => "MANUAL",
            DonationSource::Recurring => "RECURRING",
        }
    }
}

impl FromStr for DonationSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CHECKOUT" => Ok(DonationSource::Checkout),
            "MANUAL" => Ok(DonationSource::Manual),
            "RECURRING" => Ok(DonationSource::Recurring),
            other => Err(Error::Unexpected(format!("Unknown donation source '{}'", other))),
        }
    }
}

/// Domain model representing a donation
///
/// `gift_aid_claimed` implies `gift_aid`; the store never sets the first
/// without the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub donation_number: String,
    pub donor_id: String,
    pub order_id: Option<String>,
    pub recurring_donation_id: Option<String>,
    pub campaign: Option<String>,
    pub donation_type: String,
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub currency: String,
    pub status: DonationStatus,
    pub gift_aid: bool,
    pub gift_aid_claimed: bool,
    pub source: DonationSource,
    pub gateway_reference: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a donation. The number is assigned by the store
/// or passed alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_id: String,
    pub order_id: Option<String>,
    pub recurring_donation_id: Option<String>,
    pub campaign: Option<String>,
    pub donation_type: String,
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub currency: String,
    pub status: DonationStatus,
    pub gift_aid: bool,
    pub source: DonationSource,
    pub gateway_reference: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurringStatus {
    Active,
    Scheduled,
    Cancelled,
    Ended,
}

impl RecurringStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringStatus::Active => "ACTIVE",
            RecurringStatus::Scheduled => "SCHEDULED",
            RecurringStatus::Cancelled => "CANCELLED",
            RecurringStatus::Ended => "ENDED",
        }
    }
}

impl FromStr for RecurringStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(RecurringStatus::Active),
            "SCHEDULED" => Ok(RecurringStatus::Scheduled),
            "CANCELLED" => Ok(RecurringStatus::Cancelled),
            "ENDED" => Ok(RecurringStatus::Ended),
            other => Err(Error::Unexpected(format!("Unknown recurring status '{}'", other))),
        }
    }
}

/// A recurring commitment backed by a gateway subscription or a saved
/// payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringDonation {
    pub id: String,
    pub donation_number: String,
    pub donor_id: String,
    pub order_id: String,
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub currency: String,
    pub campaign: String,
    pub donation_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub subscription_id: Option<String>,
    pub status: RecurringStatus,
    pub gift_aid: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringDonation {
    pub donor_id: String,
    pub order_id: String,
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub currency: String,
    pub campaign: String,
    pub donation_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub subscription_id: Option<String>,
    pub status: RecurringStatus,
    pub gift_aid: bool,
}

/// An offline gift entered by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualDonationRequest {
    pub donor: DonorProfile,
    pub amount_pence: i64,
    pub donation_type: String,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub gift_aid: bool,
    #[serde(default)]
    pub received_at: Option<NaiveDateTime>,
}

impl ManualDonationRequest {
    pub fn validate(&self, now: NaiveDateTime) -> Result<()> {
        if self.amount_pence <= 0 {
            return Err(ValidationError::out_of_range("amountPence", "must be greater than zero").into());
        }
        if self.donation_type.trim().is_empty() {
            return Err(ValidationError::MissingField("donationType".to_string()).into());
        }
        if let Some(received_at) = self.received_at {
            if received_at > now {
                return Err(ValidationError::out_of_range("receivedAt", "must not be in the future").into());
            }
        }
        Ok(())
    }
}

/// A paid subscription invoice reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringCharge {
    pub subscription_id: String,
    pub invoice_id: String,
    pub amount_paid_pence: i64,
    pub currency: String,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecurringChargeOutcome {
    Recorded(Donation),
    /// The invoice was already recorded.
    Duplicate,
    /// Nothing was collected, as with the invoice opening a trial period.
    ZeroAmount,
    /// No recurring donation is linked to the subscription.
    UnknownSubscription,
}

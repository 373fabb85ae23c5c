//! Daily giving domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checkout::{CartItem, Frequency};

/// How the giving days are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DailyGivingMode {
    /// Every day from today until the end of the period.
    #[default]
    #[serde(rename = "daily")]
    Daily,
    /// The ten nights immediately before the end of the period.
    #[serde(rename = "last10")]
    LastTenNights,
}

/// Input for a daily giving schedule preview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGivingRequest {
    pub amount_per_day_pence: i64,
    #[serde(default)]
    pub mode: DailyGivingMode,
    #[serde(default)]
    pub odd_nights_only: bool,
    pub period_end_date: Option<NaiveDate>,
    pub campaign: String,
    pub donation_type: String,
}

/// A computed schedule of charge dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySchedule {
    pub mode: DailyGivingMode,
    pub odd_nights_only: bool,
    pub period_end_date: NaiveDate,
    /// Charge dates, ascending.
    pub dates: Vec<NaiveDate>,
    pub day_count: i64,
    pub amount_per_day_pence: i64,
    pub total_pence: i64,
}

impl DailySchedule {
    /// True when the dates form an unbroken run that a single fixed-interval
    /// subscription can express.
    pub fn is_contiguous(&self) -> bool {
        !self.odd_nights_only
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Cart items for this schedule: one recurring daily item with explicit
    /// start and end dates when contiguous, otherwise one dated one-off item
    /// per charge date.
    pub fn to_cart_items(&self, campaign: &str, donation_type: &str) -> Vec<CartItem> {
        if self.is_contiguous() {
            return vec![CartItem {
                campaign: campaign.to_string(),
                frequency: Frequency::Daily,
                donation_type: donation_type.to_string(),
                amount_pence: self.amount_per_day_pence,
                daily_end_date: self.last_date(),
                odd_nights_only: None,
                daily_mode: Some(self.mode),
                start_date: self.first_date(),
            }];
        }
        self.dates
            .iter()
            .map(|date| CartItem {
                campaign: campaign.to_string(),
                frequency: Frequency::OneOff,
                donation_type: donation_type.to_string(),
                amount_pence: self.amount_per_day_pence,
                daily_end_date: None,
                odd_nights_only: Some(true),
                daily_mode: Some(self.mode),
                start_date: Some(*date),
            })
            .collect()
    }
}

/// A schedule together with the cart items to submit at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGivingPlan {
    pub schedule: DailySchedule,
    pub items: Vec<CartItem>,
}

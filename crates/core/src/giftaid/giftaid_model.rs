//! Gift Aid domain models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::donations::Donation;
use crate::donors::Donor;
use crate::errors::{Error, Result, ValidationError};
use crate::utils::DateRange;

/// A completed donation joined with its donor.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftAidRecord {
    pub donation: Donation,
    pub donor: Donor,
}

/// One HMRC schedule line, already normalized for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftAidScheduleRow {
    pub item: usize,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub house_name_or_number: String,
    pub postcode: String,
    pub aggregated_donations: String,
    pub sponsored_event: String,
    pub donation_date: String,
    pub amount: String,
    pub amount_pence: i64,
    pub donation_id: String,
    pub donation_number: String,
    pub donor_id: String,
    pub claimed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftAidSummary {
    pub total_amount_pence: i64,
    pub total_count: usize,
    pub claimable_pence: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftAidBucket {
    pub rows: Vec<GiftAidScheduleRow>,
    pub summary: GiftAidSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftAidSchedule {
    pub range: DateRange,
    pub eligible: GiftAidBucket,
    pub ineligible: GiftAidBucket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftAidBucketKind {
    #[default]
    Eligible,
    Ineligible,
}

impl GiftAidBucketKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftAidBucketKind::Eligible => "eligible",
            GiftAidBucketKind::Ineligible => "ineligible",
        }
    }
}

impl FromStr for GiftAidBucketKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eligible" => Ok(GiftAidBucketKind::Eligible),
            "ineligible" => Ok(GiftAidBucketKind::Ineligible),
            other => Err(ValidationError::InvalidInput(format!(
                "bucket must be 'eligible' or 'ineligible', got '{}'",
                other
            ))
            .into()),
        }
    }
}

/// A rendered export ready to be served as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftAidExport {
    pub file_name: String,
    pub content: String,
    pub row_count: usize,
}

//! Donation number domain models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// The kind of record a number is issued for. All kinds share one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberKind {
    Order,
    Donation,
    Recurring,
}

impl NumberKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            NumberKind::Order => "ORD",
            NumberKind::Donation => "DON",
            NumberKind::Recurring => "REC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Order => "ORDER",
            NumberKind::Donation => "DONATION",
            NumberKind::Recurring => "RECURRING",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ORD" => Some(NumberKind::Order),
            "DON" => Some(NumberKind::Donation),
            "REC" => Some(NumberKind::Recurring),
            _ => None,
        }
    }
}

impl FromStr for NumberKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ORDER" => Ok(NumberKind::Order),
            "DONATION" => Ok(NumberKind::Donation),
            "RECURRING" => Ok(NumberKind::Recurring),
            other => Err(ValidationError::InvalidInput(format!("Unknown number kind '{}'", other)).into()),
        }
    }
}

/// A durable reference such as `DON-100042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonationNumber(String);

impl DonationNumber {
    pub fn from_sequence(kind: NumberKind, value: i64) -> Self {
        DonationNumber(format!("{}-{:06}", kind.prefix(), value))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let invalid = || -> Error {
            ValidationError::InvalidInput(format!("'{}' is not a valid donation number", raw))
                .into()
        };
        let (prefix, digits) = raw.split_once('-').ok_or_else(invalid)?;
        NumberKind::from_prefix(prefix).ok_or_else(invalid)?;
        if digits.len() < 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        Ok(DonationNumber(raw.to_string()))
    }

    pub fn kind(&self) -> NumberKind {
        self.0
            .split_once('-')
            .and_then(|(prefix, _)| NumberKind::from_prefix(prefix))
            .unwrap_or(NumberKind::Donation)
    }

    pub fn sequence(&self) -> i64 {
        self.0
            .split_once('-')
            .and_then(|(_, digits)| digits.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DonationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Donor domain models.

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid");
}

/// Domain model representing a donor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: String,
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub gateway_customer_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Donor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Donor details as submitted at checkout or by an administrator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DonorProfile {
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

/// Validated input for creating or refreshing a donor
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonor {
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl DonorProfile {
    /// Validates required fields and returns the normalized donor input.
    pub fn validate(&self) -> Result<NewDonor> {
        let email = normalize_email(&self.email);
        if email.is_empty() {
            return Err(ValidationError::MissingField("donor.email".to_string()).into());
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidInput(format!(
                "'{}' is not a valid email address",
                self.email
            ))
            .into());
        }
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::MissingField("donor.firstName".to_string()).into());
        }
        let last_name = self.last_name.trim().to_string();
        if last_name.is_empty() {
            return Err(ValidationError::MissingField("donor.lastName".to_string()).into());
        }

        Ok(NewDonor {
            email,
            title: clean(self.title.clone()),
            first_name,
            last_name,
            phone: clean(self.phone.clone()),
            address_line1: clean(self.address_line1.clone()),
            house_name_or_number: clean(self.house_name_or_number.clone()),
            city: clean(self.city.clone()),
            postcode: clean(self.postcode.clone()),
            country: clean(self.country.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> DonorProfile {
        DonorProfile {
            email: "  Amina.Khan@Example.org ".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Khan".to_string(),
            postcode: Some("  ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_normalizes_email_and_drops_blank_fields() {
        let donor = profile().validate().unwrap();
        assert_eq!(donor.email, "amina.khan@example.org");
        assert_eq!(donor.postcode, None);
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut p = profile();
        p.email = "not-an-email".to_string();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_requires_names() {
        let mut p = profile();
        p.last_name = " ".to_string();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("donor.lastName"));
    }
}

//! Donation number generator - unique, human-readable references for every
//! financial record.

mod donation_numbers_model;
mod donation_numbers_service;
mod donation_numbers_traits;


pub use donation_numbers_model::{DonationNumber, NumberKind};
pub use donation_numbers_service::{persist_with_number, DonationNumberService};
pub use donation_numbers_traits::{DonationNumberRepositoryTrait, DonationNumberServiceTrait};

//! Donatio Core - Domain entities, services, and traits.
//!
//! This crate contains the donation intake and Gift Aid reconciliation
//! logic. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` and `gateway` crates.

pub mod checkout;
pub mod confirmation;
pub mod constants;
pub mod daily_giving;
pub mod donation_numbers;
pub mod donations;
pub mod donors;
pub mod errors;
pub mod gateway;
pub mod giftaid;
pub mod notifications;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

//! Donors module - identity keyed by normalized email.

mod donors_model;
mod donors_traits;

pub use donors_model::{normalize_email, Donor, DonorProfile, NewDonor};
pub use donors_traits::DonorRepositoryTrait;

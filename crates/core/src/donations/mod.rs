//! Donations module - individual gifts and recurring commitments.

mod donations_model;
mod donations_service;
mod donations_traits;


pub use donations_model::{
    Donation, DonationSource, DonationStatus, ManualDonationRequest, NewDonation,
    NewRecurringDonation, RecurringCharge, RecurringChargeOutcome, RecurringDonation,
    RecurringStatus,
};
pub use donations_service::DonationService;
pub use donations_traits::{DonationRepositoryTrait, DonationServiceTrait};

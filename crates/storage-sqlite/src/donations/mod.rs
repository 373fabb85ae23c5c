//! SQLite storage implementation for donations and recurring commitments.

mod model;
mod repository;

pub use model::{DonationDB, RecurringDonationDB};
pub use repository::DonationRepository;
pub(crate) use repository::{
    insert_donation, insert_recurring, load_donations_by_order, load_recurring_by_order,
};

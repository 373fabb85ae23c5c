//! SQLite storage implementation for the donation number sequence.

mod repository;

pub use repository::{allocate_number, DonationNumberRepository};

//! SQLite storage implementation for donors.

mod model;
mod repository;

pub use model::{DonorDB, NewDonorDB};
pub use repository::DonorRepository;

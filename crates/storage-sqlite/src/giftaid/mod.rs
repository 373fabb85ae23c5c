//! SQLite queries backing the Gift Aid schedule.

mod repository;

pub use repository::GiftAidRepository;

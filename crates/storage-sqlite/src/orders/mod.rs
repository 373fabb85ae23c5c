//! SQLite storage implementation for checkout orders.

mod model;
mod repository;

pub use model::OrderDB;
pub use repository::OrderRepository;

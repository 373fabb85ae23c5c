//! SQLite storage implementation for Donatio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `donatio-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for donors, orders, donations and the
//!   donation number sequence
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` and `gateway` are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)        gateway (Stripe)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```
//!
//! Every write goes through [`WriteHandle::exec`], so number allocation and
//! order confirmation are serialized and run in one `IMMEDIATE` transaction.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod donation_numbers;
pub mod donations;
pub mod donors;
pub mod giftaid;
pub mod orders;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, ping, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

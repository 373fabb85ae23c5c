//! Stripe-compatible payment gateway client.

mod client;
mod form;
mod models;

pub use client::{StripeGateway, DEFAULT_GATEWAY_API_URL};

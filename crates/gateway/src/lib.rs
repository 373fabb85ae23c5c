//! Donatio gateway - HTTP collaborators of the donation engine.
//!
//! This crate talks to the outside world on behalf of `donatio-core`:
//! - [`StripeGateway`] implements `PaymentGatewayTrait` against a
//!   Stripe-compatible REST API
//! - [`WebhookReceiptNotifier`] posts donor receipts to a notification service
//! - [`webhook`] authenticates and decodes events pushed by the gateway

pub mod notifier;
pub mod stripe;
pub mod webhook;

pub use notifier::WebhookReceiptNotifier;
pub use stripe::{StripeGateway, DEFAULT_GATEWAY_API_URL};
pub use webhook::{parse_event, verify_signature, GatewayEvent, WebhookError};

//! Authentication and decoding of events pushed by the payment gateway.
//!
//! Each delivery carries a `t=<unix ts>,v1=<hex hmac>` header. The HMAC is
//! SHA-256 over `"{t}.{raw body}"` keyed with the endpoint secret.

use chrono::DateTime;
use hmac::{Hmac, Mac};
use log::debug;
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use donatio_core::donations::RecurringCharge;

type HmacSha256 = Hmac<Sha256>;

/// Deliveries older (or newer) than this many seconds are rejected.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Signature header is missing a timestamp or signature")]
    MalformedHeader,

    #[error("Signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("No signature matches the payload")]
    SignatureMismatch,

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),
}

/// Checks `header` against `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::TimestampOutOfTolerance);
    }

    for signature in signatures {
        let Ok(expected) = hex::decode(signature) else {
            continue;
        };
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| WebhookError::SignatureMismatch)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }
    Err(WebhookError::SignatureMismatch)
}

/// Gateway events the engine acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// A subscription invoice was paid.
    InvoicePaid(RecurringCharge),
    /// Any other event type, acknowledged and dropped.
    Ignored(String),
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: ApiEventData,
}

#[derive(Debug, Deserialize)]
struct ApiEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiInvoice {
    id: String,
    #[serde(default)]
    subscription: Option<String>,
    #[serde(default)]
    parent: Option<ApiInvoiceParent>,
    amount_paid: i64,
    currency: String,
    #[serde(default)]
    status_transitions: Option<ApiStatusTransitions>,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct ApiInvoiceParent {
    #[serde(default)]
    subscription_details: Option<ApiSubscriptionDetails>,
}

#[derive(Debug, Deserialize)]
struct ApiSubscriptionDetails {
    #[serde(default)]
    subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatusTransitions {
    #[serde(default)]
    paid_at: Option<i64>,
}

/// Decodes a verified payload.
pub fn parse_event(payload: &[u8]) -> Result<GatewayEvent, WebhookError> {
    let event: ApiEvent = serde_json::from_slice(payload)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    if event.event_type != "invoice.paid" {
        debug!("Ignoring gateway event {}", event.event_type);
        return Ok(GatewayEvent::Ignored(event.event_type));
    }

    let invoice: ApiInvoice = serde_json::from_value(event.data.object)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let nested = invoice
        .parent
        .and_then(|p| p.subscription_details)
        .and_then(|d| d.subscription);
    let Some(subscription_id) = invoice.subscription.or(nested) else {
        // One-off invoices are not part of a recurring commitment.
        return Ok(GatewayEvent::Ignored("invoice.paid".to_string()));
    };

    let paid_ts = invoice
        .status_transitions
        .and_then(|s| s.paid_at)
        .unwrap_or(invoice.created);
    let paid_at = DateTime::from_timestamp(paid_ts, 0)
        .ok_or_else(|| WebhookError::InvalidPayload(format!("bad timestamp {}", paid_ts)))?
        .naive_utc();

    Ok(GatewayEvent::InvoicePaid(RecurringCharge {
        subscription_id,
        invoice_id: invoice.id,
        amount_paid_pence: invoice.amount_paid,
        currency: invoice.currency,
        paid_at,
    }))
}

//! Wire types of the gateway API (internal, for parsing responses).

use serde::Deserialize;

use donatio_core::gateway::{IntentStatus, PaymentIntent, SetupIntent, Subscription, SubscriptionStatus};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCustomer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPrice {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    #[serde(default)]
    pub amount: i64,
}

impl From<ApiPaymentIntent> for PaymentIntent {
    fn from(api: ApiPaymentIntent) -> Self {
        Self {
            id: api.id,
            client_secret: api.client_secret,
            status: api.status,
            amount_pence: api.amount,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSetupIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: IntentStatus,
    #[serde(default)]
    pub metadata: std::collections::HashMap<String, String>,
}

impl From<ApiSetupIntent> for SetupIntent {
    fn from(api: ApiSetupIntent) -> Self {
        Self {
            id: api.id,
            client_secret: api.client_secret,
            status: api.status,
        }
    }
}

/// Expandable references arrive either as a bare id or as the full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Expandable<T> {
    Object(T),
    #[allow(dead_code)]
    Id(String),
}

impl<T> Expandable<T> {
    fn object(self) -> Option<T> {
        match self {
            Expandable::Object(o) => Some(o),
            Expandable::Id(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiClientSecret {
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiInvoice {
    #[serde(default)]
    pub payment_intent: Option<Expandable<ApiClientSecret>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSubscription {
    pub id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub latest_invoice: Option<Expandable<ApiInvoice>>,
    #[serde(default)]
    pub pending_setup_intent: Option<Expandable<ApiClientSecret>>,
}

impl From<ApiSubscription> for Subscription {
    /// The first invoice's payment secret when a charge is due now, otherwise
    /// the setup secret of a subscription that starts later.
    fn from(api: ApiSubscription) -> Self {
        let invoice_secret = api
            .latest_invoice
            .and_then(Expandable::object)
            .and_then(|invoice| invoice.payment_intent)
            .and_then(Expandable::object)
            .and_then(|pi| pi.client_secret);
        let setup_secret = api
            .pending_setup_intent
            .and_then(Expandable::object)
            .and_then(|si| si.client_secret);
        Self {
            id: api.id,
            client_secret: invoice_secret.or(setup_secret),
            status: api.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

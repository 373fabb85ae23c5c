//! HTTP client for a Stripe-compatible payment API.
//!
//! Requests are form-encoded and authenticated with a bearer secret key.
//! Every create call sends an `Idempotency-Key` derived from the order
//! number, so a retried checkout never produces a second charge.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;

use donatio_core::errors::{Error, GatewayError, Result};
use donatio_core::gateway::{
    CustomerRequest, PaymentGatewayTrait, PaymentIntent, PaymentIntentRequest, SetupIntent,
    SetupIntentRequest, Subscription, SubscriptionRequest, ORDER_NUMBER_METADATA_KEY,
};

use super::form::{metadata_query, Form};
use super::models::{
    ApiCustomer, ApiErrorResponse, ApiList, ApiPaymentIntent, ApiPrice, ApiSetupIntent,
    ApiSubscription,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default base URL of the payment API.
pub const DEFAULT_GATEWAY_API_URL: &str = "https://api.stripe.com";

const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Payment gateway client.
///
/// Built without a secret key it still constructs, but every call fails
/// with a `GatewayError`; this keeps the server bootable in development.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    base_url: String,
    auth_header: Option<HeaderValue>,
}

impl StripeGateway {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the API (e.g., "https://api.stripe.com")
    /// * `secret_key` - The account's secret key, if configured
    pub fn new(base_url: &str, secret_key: Option<&str>) -> Result<Self> {
        let auth_header = secret_key
            .map(|key| {
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| Error::Unexpected(format!("Invalid gateway key format: {}", e)))
            })
            .transpose()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    fn headers(&self, idempotency_key: Option<&str>) -> Result<HeaderMap> {
        let auth = self.auth_header.clone().ok_or_else(|| {
            Error::Gateway(GatewayError::new("Payment gateway is not configured"))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        if let Some(key) = idempotency_key {
            let value = HeaderValue::from_str(key).map_err(|e| {
                Error::Unexpected(format!("Invalid idempotency key '{}': {}", key, e))
            })?;
            headers.insert(IDEMPOTENCY_KEY, value);
        }
        Ok(headers)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Gateway] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(None)?)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        parse_response(response).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &Form,
        idempotency_key: Option<&str>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Gateway] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(idempotency_key)?)
            .form(form.pairs())
            .send()
            .await
            .map_err(transport_error)?;

        parse_response(response).await
    }

    /// First object of `kind` tagged with the order number, via the search API.
    async fn search_by_order<T: DeserializeOwned>(
        &self,
        kind: &str,
        order_number: &str,
    ) -> Result<Option<T>> {
        let query = metadata_query(ORDER_NUMBER_METADATA_KEY, order_number);
        let path = format!("/v1/{}/search", kind);
        let list: ApiList<T> = self.get(&path, &[("query", query.as_str())]).await?;
        Ok(list.data.into_iter().next())
    }

    /// Creates the recurring price a subscription bills against.
    async fn create_price(&self, request: &SubscriptionRequest) -> Result<String> {
        let form = Form::new()
            .field("currency", &request.currency)
            .field("unit_amount", request.amount_pence)
            .field("recurring[interval]", request.interval.as_str())
            .field("product_data[name]", &request.product_name)
            .metadata(&request.metadata);
        let key = format!("{}-price", request.order_number);
        let price: ApiPrice = self.post("/v1/prices", &form, Some(&key)).await?;
        Ok(price.id)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Gateway(GatewayError {
        status: e.status().map(|s| s.as_u16()),
        code: None,
        message: format!("Payment gateway request failed: {}", e),
    })
}

/// Parse an HTTP response. Gateway errors keep the processor's own message.
async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::Unexpected(format!("Failed to read gateway response: {}", e)))?;

    if !status.is_success() {
        let (message, code) = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(err) => (
                err.error
                    .message
                    .unwrap_or_else(|| format!("HTTP {}", status)),
                err.error.code,
            ),
            Err(_) => (
                format!(
                    "Gateway error {}: {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
                None,
            ),
        };
        warn!("[Gateway] {} {}", status, message);
        return Err(Error::Gateway(GatewayError {
            status: Some(status.as_u16()),
            code,
            message,
        }));
    }

    serde_json::from_str(&body).map_err(|e| {
        Error::Unexpected(format!("Failed to parse gateway response: {}", e))
    })
}

/// Unix timestamp of midnight UTC on `date`.
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Form for creating a subscription against `price_id`.
///
/// Billing is deferred to `start_date` with a trial. The subscription is
/// cancelled at the midnight after `end_date` so a charge on the last day
/// still goes through.
fn subscription_form(request: &SubscriptionRequest, price_id: &str) -> Form {
    let mut form = Form::new()
        .field("customer", &request.customer_id)
        .field("items[0][price]", price_id)
        .field("payment_behavior", "default_incomplete")
        .field("payment_settings[save_default_payment_method]", "on_subscription")
        .field("expand[0]", "latest_invoice.payment_intent")
        .field("expand[1]", "pending_setup_intent")
        .metadata(&request.metadata);
    if let Some(start) = request.start_date {
        form = form.field("trial_end", unix_midnight(start));
    }
    if let Some(end) = request.end_date {
        let cancel_day = end.succ_opt().unwrap_or(end);
        form = form.field("cancel_at", unix_midnight(cancel_day));
    }
    form
}

fn path_id(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

#[async_trait]
impl PaymentGatewayTrait for StripeGateway {
    async fn create_customer(&self, request: CustomerRequest) -> Result<String> {
        let form = Form::new()
            .field("email", &request.email)
            .field("name", &request.name)
            .optional("phone", request.phone.as_ref())
            .field("metadata[donor_id]", &request.donor_id);
        let key = format!("customer-{}", request.donor_id);
        let customer: ApiCustomer = self.post("/v1/customers", &form, Some(&key)).await?;
        info!("[Gateway] Created customer {} for donor {}", customer.id, request.donor_id);
        Ok(customer.id)
    }

    async fn find_payment_intent(&self, order_number: &str) -> Result<Option<PaymentIntent>> {
        let found: Option<ApiPaymentIntent> =
            self.search_by_order("payment_intents", order_number).await?;
        Ok(found.map(PaymentIntent::from))
    }

    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent> {
        let mut form = Form::new()
            .field("amount", request.amount_pence)
            .field("currency", &request.currency)
            .field("description", &request.description)
            .field("automatic_payment_methods[enabled]", "true")
            .optional("customer", request.customer_id.as_ref())
            .optional("receipt_email", request.receipt_email.as_ref())
            .metadata(&request.metadata);
        if request.save_payment_method {
            form = form.field("setup_future_usage", "off_session");
        }
        let key = format!("{}-payment", request.order_number);
        let intent: ApiPaymentIntent = self.post("/v1/payment_intents", &form, Some(&key)).await?;
        info!(
            "[Gateway] Created payment intent {} for {}",
            intent.id, request.order_number
        );
        Ok(intent.into())
    }

    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let path = format!("/v1/payment_intents/{}", path_id(payment_intent_id));
        let intent: ApiPaymentIntent = self.get(&path, &[]).await?;
        Ok(intent.into())
    }

    async fn find_subscription(&self, order_number: &str) -> Result<Option<Subscription>> {
        let found: Option<ApiSubscription> =
            self.search_by_order("subscriptions", order_number).await?;
        match found {
            // Search results are not expanded; fetch again for the client secret.
            Some(sub) => self.retrieve_subscription(&sub.id).await.map(Some),
            None => Ok(None),
        }
    }

    async fn create_subscription(&self, request: SubscriptionRequest) -> Result<Subscription> {
        let price_id = self.create_price(&request).await?;

        let form = subscription_form(&request, &price_id);
        let key = format!("{}-subscription", request.order_number);
        let subscription: ApiSubscription =
            self.post("/v1/subscriptions", &form, Some(&key)).await?;
        info!(
            "[Gateway] Created subscription {} for {}",
            subscription.id, request.order_number
        );
        Ok(subscription.into())
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let path = format!("/v1/subscriptions/{}", path_id(subscription_id));
        let subscription: ApiSubscription = self
            .get(
                &path,
                &[
                    ("expand[]", "latest_invoice.payment_intent"),
                    ("expand[]", "pending_setup_intent"),
                ],
            )
            .await?;
        Ok(subscription.into())
    }

    async fn find_setup_intent(
        &self,
        customer_id: &str,
        order_number: &str,
    ) -> Result<Option<SetupIntent>> {
        // Setup intents have no search endpoint; list the customer's and match.
        let list: ApiList<ApiSetupIntent> = self
            .get("/v1/setup_intents", &[("customer", customer_id), ("limit", "100")])
            .await?;
        Ok(list
            .data
            .into_iter()
            .find(|si| {
                si.metadata.get(ORDER_NUMBER_METADATA_KEY).map(String::as_str) == Some(order_number)
            })
            .map(SetupIntent::from))
    }

    async fn create_setup_intent(&self, request: SetupIntentRequest) -> Result<SetupIntent> {
        let form = Form::new()
            .field("customer", &request.customer_id)
            .field("usage", "off_session")
            .field("automatic_payment_methods[enabled]", "true")
            .metadata(&request.metadata);
        let key = format!("{}-setup", request.order_number);
        let intent: ApiSetupIntent = self.post("/v1/setup_intents", &form, Some(&key)).await?;
        info!(
            "[Gateway] Created setup intent {} for {}",
            intent.id, request.order_number
        );
        Ok(intent.into())
    }

    async fn retrieve_setup_intent(&self, setup_intent_id: &str) -> Result<SetupIntent> {
        let path = format!("/v1/setup_intents/{}", path_id(setup_intent_id));
        let intent: ApiSetupIntent = self.get(&path, &[]).await?;
        Ok(intent.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donatio_core::gateway::BillingInterval;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_unconfigured_gateway_fails_with_gateway_error() {
        let gateway = StripeGateway::new(DEFAULT_GATEWAY_API_URL, None).unwrap();
        let err = gateway
            .create_subscription(SubscriptionRequest {
                order_number: "ORD-100001".to_string(),
                customer_id: "cus_1".to_string(),
                amount_pence: 1000,
                currency: "gbp".to_string(),
                interval: BillingInterval::Month,
                product_name: "ramadan monthly donation".to_string(),
                start_date: None,
                end_date: None,
                metadata: BTreeMap::new(),
            })
            .await
            .unwrap_err();

        match err {
            Error::Gateway(e) => assert_eq!(e.message, "Payment gateway is not configured"),
            other => panic!("expected gateway error, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let gateway = StripeGateway::new("https://api.example.test/", Some("sk_test")).unwrap();
        assert_eq!(gateway.base_url, "https://api.example.test");
    }

    fn field<'a>(form: &'a Form, key: &str) -> Option<&'a str> {
        form.pairs()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_subscription_form_cancels_after_last_charge_day() {
        let request = SubscriptionRequest {
            order_number: "ORD-100002".to_string(),
            customer_id: "cus_1".to_string(),
            amount_pence: 500,
            currency: "gbp".to_string(),
            interval: BillingInterval::Day,
            product_name: "last ten nights".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 21),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 30),
            metadata: BTreeMap::new(),
        };

        let form = subscription_form(&request, "price_1");

        // 2025-03-21T00:00:00Z
        assert_eq!(field(&form, "trial_end"), Some("1742515200"));
        // 2025-03-31T00:00:00Z, so the 2025-03-30 charge still happens
        assert_eq!(field(&form, "cancel_at"), Some("1743379200"));
        assert_eq!(field(&form, "items[0][price]"), Some("price_1"));
    }

    #[test]
    fn test_subscription_form_without_dates_is_open_ended() {
        let request = SubscriptionRequest {
            order_number: "ORD-100003".to_string(),
            customer_id: "cus_1".to_string(),
            amount_pence: 1000,
            currency: "gbp".to_string(),
            interval: BillingInterval::Month,
            product_name: "monthly donation".to_string(),
            start_date: None,
            end_date: None,
            metadata: BTreeMap::new(),
        };

        let form = subscription_form(&request, "price_2");

        assert_eq!(field(&form, "trial_end"), None);
        assert_eq!(field(&form, "cancel_at"), None);
    }

    #[test]
    fn test_unix_midnight() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(unix_midnight(date), 1_738_368_000);
    }
}

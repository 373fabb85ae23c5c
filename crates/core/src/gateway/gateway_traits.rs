use crate::errors::Result;
use crate::gateway::gateway_model::{
    CustomerRequest, PaymentIntent, PaymentIntentRequest, SetupIntent, SetupIntentRequest,
    Subscription, SubscriptionRequest,
};
use async_trait::async_trait;

/// Operations the checkout and confirmation flows need from a payment processor.
///
/// Every `create_*` call carries the order number; implementations tag the
/// created object with it and use it to derive an idempotency key. The
/// `find_*` lookups let callers check for an existing object before creating.
#[async_trait]
pub trait PaymentGatewayTrait: Send + Sync {
    async fn create_customer(&self, request: CustomerRequest) -> Result<String>;

    async fn find_payment_intent(&self, order_number: &str) -> Result<Option<PaymentIntent>>;
    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent>;
    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent>;

    async fn find_subscription(&self, order_number: &str) -> Result<Option<Subscription>>;
    async fn create_subscription(&self, request: SubscriptionRequest) -> Result<Subscription>;
    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<Subscription>;

    async fn find_setup_intent(
        &self,
        customer_id: &str,
        order_number: &str,
    ) -> Result<Option<SetupIntent>>;
    async fn create_setup_intent(&self, request: SetupIntentRequest) -> Result<SetupIntent>;
    async fn retrieve_setup_intent(&self, setup_intent_id: &str) -> Result<SetupIntent>;
}

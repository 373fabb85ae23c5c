//! Payment gateway boundary - request/response models and the trait the
//! HTTP client in `donatio-gateway` implements.

mod gateway_model;
mod gateway_traits;

pub use gateway_model::{
    BillingInterval, CustomerRequest, GatewayOutcome, IntentStatus, PaymentIntent,
    PaymentIntentRequest, SetupIntent, SetupIntentRequest, Subscription, SubscriptionRequest,
    SubscriptionStatus, ORDER_NUMBER_METADATA_KEY,
};
pub use gateway_traits::PaymentGatewayTrait;

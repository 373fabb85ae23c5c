use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};

use super::checkout_model::{CheckoutRequest, CheckoutResponse, NewOrder, Order, PaymentMode};
use super::checkout_plan::{expand_cart, plan_checkout, CheckoutPlan, RecurringPlan};
use super::checkout_traits::{CheckoutServiceTrait, OrderRepositoryTrait};
use crate::donation_numbers::{DonationNumber, DonationNumberServiceTrait, NumberKind};
use crate::donors::{Donor, DonorRepositoryTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::gateway::{
    CustomerRequest, PaymentGatewayTrait, PaymentIntent, PaymentIntentRequest, SetupIntent,
    SetupIntentRequest, Subscription, SubscriptionRequest, ORDER_NUMBER_METADATA_KEY,
};
use crate::utils::time_utils::today_utc;

enum ResumedOrder {
    Existing(Order),
    Reuse(DonationNumber),
}

/// Gateway objects created (or found) for one order.
#[derive(Default)]
struct GatewayObjects {
    payment_intent: Option<PaymentIntent>,
    subscription: Option<Subscription>,
    setup_intent: Option<SetupIntent>,
}

/// Service orchestrating checkout: validation, donor upsert, numbering,
/// gateway object creation and order persistence.
pub struct CheckoutService {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    donor_repository: Arc<dyn DonorRepositoryTrait>,
    number_service: Arc<dyn DonationNumberServiceTrait>,
    gateway: Arc<dyn PaymentGatewayTrait>,
    currency: String,
}

impl CheckoutService {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        donor_repository: Arc<dyn DonorRepositoryTrait>,
        number_service: Arc<dyn DonationNumberServiceTrait>,
        gateway: Arc<dyn PaymentGatewayTrait>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            order_repository,
            donor_repository,
            number_service,
            gateway,
            currency: currency.into(),
        }
    }

    /// Runs a checkout as of `today`.
    pub async fn checkout_on(
        &self,
        request: CheckoutRequest,
        today: NaiveDate,
    ) -> Result<CheckoutResponse> {
        request.validate()?;
        let new_donor = request.donor.validate()?;
        let items = expand_cart(&request.items, today)?;
        for item in &items {
            item.validate(today)?;
        }
        let plan = plan_checkout(&items, today)?;
        debug!(
            "Checkout plan: mode={} immediate={} deferred={} recurring={}",
            plan.mode.as_str(),
            plan.immediate.len(),
            plan.deferred.len(),
            plan.recurring.is_some()
        );

        let reused_number = match request.order_number.as_deref() {
            Some(raw) => match self.resume(raw)? {
                ResumedOrder::Existing(order) => {
                    info!("Returning existing order {}", order.order_number);
                    return Ok(order.to_checkout_response());
                }
                ResumedOrder::Reuse(number) => Some(number),
            },
            None => None,
        };

        let donor = self.donor_repository.find_or_create_donor(new_donor).await?;
        let order_number = match reused_number {
            Some(number) => number,
            None => self.number_service.allocate(NumberKind::Order).await?,
        };

        let customer_id = if plan.mode != PaymentMode::Payment || !plan.deferred.is_empty() {
            Some(self.ensure_customer(&donor).await?)
        } else {
            donor.gateway_customer_id.clone()
        };

        let objects = self
            .create_gateway_objects(&plan, &request, &donor, customer_id, &order_number, today)
            .await?;

        let new_order = NewOrder {
            order_number: order_number.as_str().to_string(),
            donor_id: donor.id.clone(),
            mode: plan.mode,
            currency: self.currency.clone(),
            subtotal_pence: request.subtotal_pence,
            fees_pence: request.fees_pence,
            total_pence: request.total_pence,
            gift_aid: request.gift_aid,
            items,
            payment_intent_id: objects.payment_intent.as_ref().map(|pi| pi.id.clone()),
            subscription_id: objects.subscription.as_ref().map(|s| s.id.clone()),
            setup_intent_id: objects.setup_intent.as_ref().map(|si| si.id.clone()),
            payment_client_secret: objects
                .payment_intent
                .and_then(|pi| pi.client_secret),
            subscription_client_secret: objects.subscription.and_then(|s| s.client_secret),
            setup_client_secret: objects.setup_intent.and_then(|si| si.client_secret),
        };

        let order = self.order_repository.create_order(new_order).await?;
        info!(
            "Created {} order {} for donor {} ({}p)",
            order.mode.as_str(),
            order.order_number,
            order.donor_id,
            order.total_pence
        );
        Ok(order.to_checkout_response())
    }

    fn resume(&self, raw: &str) -> Result<ResumedOrder> {
        let number = DonationNumber::parse(raw)?;
        if number.kind() != NumberKind::Order {
            return Err(ValidationError::InvalidInput(format!(
                "{} is not an order number",
                number
            ))
            .into());
        }
        if let Some(order) = self.order_repository.find_by_number(number.as_str())? {
            return Ok(ResumedOrder::Existing(order));
        }
        if !self.number_service.is_issued(&number)? {
            return Err(ValidationError::InvalidInput(format!(
                "Unknown order number {}",
                number
            ))
            .into());
        }
        debug!("Reusing issued order number {}", number);
        Ok(ResumedOrder::Reuse(number))
    }

    async fn ensure_customer(&self, donor: &Donor) -> Result<String> {
        if let Some(customer_id) = &donor.gateway_customer_id {
            return Ok(customer_id.clone());
        }
        let customer_id = self
            .gateway
            .create_customer(CustomerRequest {
                email: donor.email.clone(),
                name: donor.full_name(),
                phone: donor.phone.clone(),
                donor_id: donor.id.clone(),
            })
            .await?;
        self.donor_repository
            .set_gateway_customer_id(&donor.id, &customer_id)
            .await?;
        debug!("Linked donor {} to gateway customer {}", donor.id, customer_id);
        Ok(customer_id)
    }

    async fn create_gateway_objects(
        &self,
        plan: &CheckoutPlan,
        request: &CheckoutRequest,
        donor: &Donor,
        customer_id: Option<String>,
        order_number: &DonationNumber,
        today: NaiveDate,
    ) -> Result<GatewayObjects> {
        let metadata = order_metadata(order_number, donor, plan.mode, request.gift_aid);
        let mut objects = GatewayObjects::default();

        if plan.mode.charges_now() {
            let amount_pence = plan
                .immediate_total_pence()?
                .checked_add(request.fees_pence)
                .ok_or_else(|| Error::from(ValidationError::out_of_range("feesPence", "total overflows")))?;
            let intent_request = PaymentIntentRequest {
                order_number: order_number.as_str().to_string(),
                amount_pence,
                currency: self.currency.clone(),
                customer_id: customer_id.clone(),
                receipt_email: Some(donor.email.clone()),
                description: format!("Donation {}", order_number),
                save_payment_method: !plan.deferred.is_empty(),
                metadata: metadata.clone(),
            };
            objects.payment_intent = Some(self.ensure_payment_intent(intent_request).await?);
        }

        if plan.mode.has_subscription() {
            let recurring = plan.recurring.as_ref().ok_or_else(|| {
                Error::Unexpected(format!("{} order without a recurring plan", plan.mode.as_str()))
            })?;
            let fees = if plan.mode == PaymentMode::Subscription {
                request.fees_pence
            } else {
                0
            };
            let subscription_request = self.subscription_request(
                recurring,
                fees,
                require_customer(&customer_id)?,
                order_number,
                today,
                metadata.clone(),
            )?;
            objects.subscription = Some(self.ensure_subscription(subscription_request).await?);
        }

        if plan.mode == PaymentMode::Setup {
            let setup_request = SetupIntentRequest {
                order_number: order_number.as_str().to_string(),
                customer_id: require_customer(&customer_id)?,
                metadata,
            };
            objects.setup_intent = Some(self.ensure_setup_intent(setup_request).await?);
        }

        Ok(objects)
    }

    fn subscription_request(
        &self,
        recurring: &RecurringPlan,
        fees_pence: i64,
        customer_id: String,
        order_number: &DonationNumber,
        today: NaiveDate,
        metadata: BTreeMap<String, String>,
    ) -> Result<SubscriptionRequest> {
        let interval = recurring.frequency.billing_interval().ok_or_else(|| {
            Error::Unexpected(format!("{} is not a recurring frequency", recurring.frequency))
        })?;
        let amount_pence = recurring
            .amount_pence
            .checked_add(fees_pence)
            .ok_or_else(|| Error::from(ValidationError::out_of_range("feesPence", "total overflows")))?;
        Ok(SubscriptionRequest {
            order_number: order_number.as_str().to_string(),
            customer_id,
            amount_pence,
            currency: self.currency.clone(),
            interval,
            product_name: format!(
                "{} {} donation",
                recurring.campaign_label(),
                recurring.frequency.as_str().to_lowercase()
            ),
            start_date: recurring.start_date.filter(|start| *start > today),
            end_date: recurring.end_date,
            metadata,
        })
    }

    async fn ensure_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent> {
        if let Some(existing) = self.gateway.find_payment_intent(&request.order_number).await? {
            debug!("Found payment intent {} for {}", existing.id, request.order_number);
            return Ok(existing);
        }
        self.gateway.create_payment_intent(request).await
    }

    async fn ensure_subscription(&self, request: SubscriptionRequest) -> Result<Subscription> {
        if let Some(existing) = self.gateway.find_subscription(&request.order_number).await? {
            debug!("Found subscription {} for {}", existing.id, request.order_number);
            return Ok(existing);
        }
        self.gateway.create_subscription(request).await
    }

    async fn ensure_setup_intent(&self, request: SetupIntentRequest) -> Result<SetupIntent> {
        if let Some(existing) = self
            .gateway
            .find_setup_intent(&request.customer_id, &request.order_number)
            .await?
        {
            debug!("Found setup intent {} for {}", existing.id, request.order_number);
            return Ok(existing);
        }
        self.gateway.create_setup_intent(request).await
    }
}

fn require_customer(customer_id: &Option<String>) -> Result<String> {
    customer_id
        .clone()
        .ok_or_else(|| Error::Unexpected("gateway customer is required for this order".to_string()))
}

fn order_metadata(
    order_number: &DonationNumber,
    donor: &Donor,
    mode: PaymentMode,
    gift_aid: bool,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        (ORDER_NUMBER_METADATA_KEY.to_string(), order_number.as_str().to_string()),
        ("donor_id".to_string(), donor.id.clone()),
        ("mode".to_string(), mode.as_str().to_string()),
        ("gift_aid".to_string(), gift_aid.to_string()),
    ])
}

#[async_trait]
impl CheckoutServiceTrait for CheckoutService {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse> {
        self.checkout_on(request, today_utc()).await
    }

    fn get_order(&self, order_number: &str) -> Result<Order> {
        self.order_repository
            .find_by_number(order_number)?
            .ok_or_else(|| Error::NotFound(format!("Order {} not found", order_number)))
    }
}

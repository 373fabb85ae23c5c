//! In-memory stand-ins for the store, the payment gateway and the receipt
//! notifier, shared by the service tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::checkout::{CartItem, Frequency, NewOrder, Order, OrderRepositoryTrait, OrderStatus};
use crate::confirmation::{ConfirmedOrder, OrderMaterialization};
use crate::constants::DONATION_NUMBER_START;
use crate::donation_numbers::{
    DonationNumber, DonationNumberRepositoryTrait, DonationNumberService, NumberKind,
};
use crate::donations::{
    Donation, DonationRepositoryTrait, DonationStatus, NewDonation, RecurringDonation,
    RecurringStatus,
};
use crate::donors::{normalize_email, Donor, DonorProfile, DonorRepositoryTrait, NewDonor};
use crate::errors::{DatabaseError, Error, GatewayError, Result};
use crate::gateway::{
    CustomerRequest, IntentStatus, PaymentGatewayTrait, PaymentIntent, PaymentIntentRequest,
    SetupIntent, SetupIntentRequest, Subscription, SubscriptionRequest, SubscriptionStatus,
};
use crate::giftaid::{GiftAidRecord, GiftAidRepositoryTrait};
use crate::notifications::{DonationReceipt, ReceiptNotifierTrait};
use crate::utils::DateRange;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(hour, 0, 0).unwrap()
}

pub fn cart_item(frequency: Frequency, amount_pence: i64) -> CartItem {
    CartItem {
        campaign: "general".to_string(),
        frequency,
        donation_type: "sadaqah".to_string(),
        amount_pence,
        daily_end_date: None,
        odd_nights_only: None,
        daily_mode: None,
        start_date: None,
    }
}

pub fn donor_profile(email: &str) -> DonorProfile {
    DonorProfile {
        email: email.to_string(),
        title: Some("Mrs".to_string()),
        first_name: "Fatima".to_string(),
        last_name: "Begum".to_string(),
        address_line1: Some("42 Brick Lane".to_string()),
        postcode: Some("e1 6ra".to_string()),
        ..Default::default()
    }
}

#[derive(Default)]
struct StoreState {
    donors: Vec<Donor>,
    orders: Vec<Order>,
    donations: Vec<Donation>,
    recurring: Vec<RecurringDonation>,
    issued: HashSet<String>,
    counter: i64,
    next_id: u64,
}

impl StoreState {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn allocate(&mut self, kind: NumberKind) -> DonationNumber {
        loop {
            let value = DONATION_NUMBER_START + self.counter;
            self.counter += 1;
            let number = DonationNumber::from_sequence(kind, value);
            if self.issued.insert(number.as_str().to_string()) {
                return number;
            }
        }
    }

    fn insert_donation(&mut self, number: DonationNumber, new: NewDonation, now: NaiveDateTime) -> Result<Donation> {
        if self
            .donations
            .iter()
            .any(|d| d.donation_number == number.as_str())
        {
            return Err(DatabaseError::UniqueViolation(number.to_string()).into());
        }
        if let Some(reference) = &new.gateway_reference {
            if self
                .donations
                .iter()
                .any(|d| d.gateway_reference.as_ref() == Some(reference))
            {
                return Err(DatabaseError::UniqueViolation(reference.clone()).into());
            }
        }
        let donation = Donation {
            id: self.id("don"),
            donation_number: number.into_string(),
            donor_id: new.donor_id,
            order_id: new.order_id,
            recurring_donation_id: new.recurring_donation_id,
            campaign: new.campaign,
            donation_type: new.donation_type,
            frequency: new.frequency,
            amount_pence: new.amount_pence,
            currency: new.currency,
            status: new.status,
            gift_aid: new.gift_aid,
            gift_aid_claimed: false,
            source: new.source,
            gateway_reference: new.gateway_reference,
            scheduled_for: new.scheduled_for,
            completed_at: new.completed_at,
            created_at: now,
            updated_at: now,
        };
        self.donations.push(donation.clone());
        Ok(donation)
    }
}

/// One lock around everything, standing in for the single-writer store.
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    now: NaiveDateTime,
}

impl InMemoryStore {
    pub fn at(now: NaiveDateTime) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(StoreState::default()),
            now,
        })
    }

    pub fn number_service(self: &Arc<Self>) -> Arc<DonationNumberService> {
        Arc::new(DonationNumberService::new(self.clone()))
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn donations(&self) -> Vec<Donation> {
        self.state.lock().unwrap().donations.clone()
    }

    pub fn recurring(&self) -> Vec<RecurringDonation> {
        self.state.lock().unwrap().recurring.clone()
    }

    pub fn donors(&self) -> Vec<Donor> {
        self.state.lock().unwrap().donors.clone()
    }

    /// Adds a donor directly, bypassing checkout.
    pub fn seed_donor(&self, email: &str) -> Donor {
        let new_donor = donor_profile(email).validate().unwrap();
        self.upsert_donor(new_donor)
    }

    /// Adds a COMPLETED donation directly.
    pub fn seed_completed(&self, donor_id: &str, amount_pence: i64, gift_aid: bool, completed_at: NaiveDateTime) -> Donation {
        let mut state = self.state.lock().unwrap();
        let number = state.allocate(NumberKind::Donation);
        state
            .insert_donation(
                number,
                NewDonation {
                    donor_id: donor_id.to_string(),
                    order_id: None,
                    recurring_donation_id: None,
                    campaign: Some("general".to_string()),
                    donation_type: "sadaqah".to_string(),
                    frequency: Frequency::OneOff,
                    amount_pence,
                    currency: "gbp".to_string(),
                    status: DonationStatus::Completed,
                    gift_aid,
                    source: crate::donations::DonationSource::Manual,
                    gateway_reference: None,
                    scheduled_for: None,
                    completed_at: Some(completed_at),
                },
                self.now,
            )
            .unwrap()
    }

    fn upsert_donor(&self, new_donor: NewDonor) -> Donor {
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.donors.iter_mut().find(|d| d.email == new_donor.email) {
            existing.first_name = new_donor.first_name;
            existing.last_name = new_donor.last_name;
            return existing.clone();
        }
        let donor = Donor {
            id: state.id("donor"),
            email: new_donor.email,
            title: new_donor.title,
            first_name: new_donor.first_name,
            last_name: new_donor.last_name,
            phone: new_donor.phone,
            address_line1: new_donor.address_line1,
            house_name_or_number: new_donor.house_name_or_number,
            city: new_donor.city,
            postcode: new_donor.postcode,
            country: new_donor.country,
            gateway_customer_id: None,
            created_at: self.now,
            updated_at: self.now,
        };
        state.donors.push(donor.clone());
        donor
    }
}

#[async_trait]
impl DonorRepositoryTrait for InMemoryStore {
    fn get_donor(&self, donor_id: &str) -> Result<Donor> {
        self.state
            .lock()
            .unwrap()
            .donors
            .iter()
            .find(|d| d.id == donor_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Donor {} not found", donor_id)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Donor>> {
        let email = normalize_email(email);
        Ok(self
            .state
            .lock()
            .unwrap()
            .donors
            .iter()
            .find(|d| d.email == email)
            .cloned())
    }

    async fn find_or_create_donor(&self, new_donor: NewDonor) -> Result<Donor> {
        Ok(self.upsert_donor(new_donor))
    }

    async fn set_gateway_customer_id(&self, donor_id: &str, customer_id: &str) -> Result<Donor> {
        let mut state = self.state.lock().unwrap();
        let donor = state
            .donors
            .iter_mut()
            .find(|d| d.id == donor_id)
            .ok_or_else(|| Error::NotFound(donor_id.to_string()))?;
        donor.gateway_customer_id = Some(customer_id.to_string());
        Ok(donor.clone())
    }
}

#[async_trait]
impl DonationNumberRepositoryTrait for InMemoryStore {
    async fn allocate(&self, kind: NumberKind) -> Result<DonationNumber> {
        Ok(self.state.lock().unwrap().allocate(kind))
    }

    fn is_issued(&self, number: &DonationNumber) -> Result<bool> {
        Ok(self.state.lock().unwrap().issued.contains(number.as_str()))
    }
}

#[async_trait]
impl OrderRepositoryTrait for InMemoryStore {
    fn get_order(&self, order_id: &str) -> Result<Order> {
        self.state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(order_id.to_string()))
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .orders
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        let mut state = self.state.lock().unwrap();
        if state.orders.iter().any(|o| o.order_number == new_order.order_number) {
            return Err(DatabaseError::UniqueViolation(new_order.order_number).into());
        }
        let order = Order {
            id: state.id("order"),
            order_number: new_order.order_number,
            donor_id: new_order.donor_id,
            mode: new_order.mode,
            status: OrderStatus::Pending,
            currency: new_order.currency,
            subtotal_pence: new_order.subtotal_pence,
            fees_pence: new_order.fees_pence,
            total_pence: new_order.total_pence,
            gift_aid: new_order.gift_aid,
            items: new_order.items,
            payment_intent_id: new_order.payment_intent_id,
            subscription_id: new_order.subscription_id,
            setup_intent_id: new_order.setup_intent_id,
            payment_client_secret: new_order.payment_client_secret,
            subscription_client_secret: new_order.subscription_client_secret,
            setup_client_secret: new_order.setup_client_secret,
            created_at: self.now,
            updated_at: self.now,
            confirmed_at: None,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn confirm_order(
        &self,
        order_number: &str,
        materialization: OrderMaterialization,
    ) -> Result<ConfirmedOrder> {
        let mut state = self.state.lock().unwrap();
        let index = state
            .orders
            .iter()
            .position(|o| o.order_number == order_number)
            .ok_or_else(|| Error::NotFound(order_number.to_string()))?;

        if state.orders[index].status != OrderStatus::Pending {
            let order = state.orders[index].clone();
            let donations = state.donations.iter().filter(|d| d.order_id.as_ref() == Some(&order.id)).cloned().collect();
            let recurring = state.recurring.iter().filter(|r| r.order_id == order.id).cloned().collect();
            return Ok(ConfirmedOrder {
                order,
                donations,
                recurring,
                newly_confirmed: false,
            });
        }

        let mut donations = Vec::new();
        for new in materialization.donations {
            let number = state.allocate(NumberKind::Donation);
            donations.push(state.insert_donation(number, new, self.now)?);
        }
        let mut recurring = Vec::new();
        for new in materialization.recurring {
            let number = state.allocate(NumberKind::Recurring);
            let record = RecurringDonation {
                id: state.id("rec"),
                donation_number: number.into_string(),
                donor_id: new.donor_id,
                order_id: new.order_id,
                frequency: new.frequency,
                amount_pence: new.amount_pence,
                currency: new.currency,
                campaign: new.campaign,
                donation_type: new.donation_type,
                start_date: new.start_date,
                end_date: new.end_date,
                subscription_id: new.subscription_id,
                status: new.status,
                gift_aid: new.gift_aid,
                created_at: self.now,
                updated_at: self.now,
            };
            state.recurring.push(record.clone());
            recurring.push(record);
        }

        let order = &mut state.orders[index];
        order.status = OrderStatus::Confirmed;
        order.confirmed_at = Some(self.now);
        Ok(ConfirmedOrder {
            order: order.clone(),
            donations,
            recurring,
            newly_confirmed: true,
        })
    }

    async fn mark_failed(&self, order_number: &str) -> Result<Order> {
        let mut state = self.state.lock().unwrap();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.order_number == order_number)
            .ok_or_else(|| Error::NotFound(order_number.to_string()))?;
        if order.status == OrderStatus::Pending {
            order.status = OrderStatus::Failed;
        }
        Ok(order.clone())
    }
}

#[async_trait]
impl DonationRepositoryTrait for InMemoryStore {
    fn get_donation(&self, donation_id: &str) -> Result<Donation> {
        self.state
            .lock()
            .unwrap()
            .donations
            .iter()
            .find(|d| d.id == donation_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(donation_id.to_string()))
    }

    fn list_by_order(&self, order_id: &str) -> Result<Vec<Donation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .donations
            .iter()
            .filter(|d| d.order_id.as_deref() == Some(order_id))
            .cloned()
            .collect())
    }

    fn list_recurring_by_order(&self, order_id: &str) -> Result<Vec<RecurringDonation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .recurring
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }

    fn find_by_gateway_reference(&self, reference: &str) -> Result<Option<Donation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .donations
            .iter()
            .find(|d| d.gateway_reference.as_deref() == Some(reference))
            .cloned())
    }

    fn find_recurring_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<RecurringDonation>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .recurring
            .iter()
            .find(|r| r.subscription_id.as_deref() == Some(subscription_id))
            .cloned())
    }

    async fn create_donation(
        &self,
        number: DonationNumber,
        new_donation: NewDonation,
    ) -> Result<Donation> {
        self.state
            .lock()
            .unwrap()
            .insert_donation(number, new_donation, self.now)
    }

    async fn record_recurring_charge(
        &self,
        recurring_id: &str,
        new_donation: NewDonation,
    ) -> Result<Donation> {
        let mut state = self.state.lock().unwrap();
        let number = state.allocate(NumberKind::Donation);
        let donation = state.insert_donation(number, new_donation, self.now)?;
        if let Some(recurring) = state.recurring.iter_mut().find(|r| r.id == recurring_id) {
            if recurring.status == RecurringStatus::Scheduled {
                recurring.status = RecurringStatus::Active;
            }
        }
        Ok(donation)
    }
}

#[async_trait]
impl GiftAidRepositoryTrait for InMemoryStore {
    fn list_completed(&self, range: &DateRange) -> Result<Vec<GiftAidRecord>> {
        let state = self.state.lock().unwrap();
        let mut records: Vec<GiftAidRecord> = state
            .donations
            .iter()
            .filter(|d| d.status == DonationStatus::Completed)
            .filter(|d| d.completed_at.is_some_and(|c| range.contains(c)))
            .filter_map(|d| {
                state
                    .donors
                    .iter()
                    .find(|p| p.id == d.donor_id)
                    .map(|donor| GiftAidRecord {
                        donation: d.clone(),
                        donor: donor.clone(),
                    })
            })
            .collect();
        records.sort_by_key(|r| (r.donation.completed_at, r.donation.donation_number.clone()));
        Ok(records)
    }

    async fn mark_claimed(&self, range: DateRange) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for d in state.donations.iter_mut() {
            if d.status == DonationStatus::Completed
                && d.gift_aid
                && !d.gift_aid_claimed
                && d.completed_at.is_some_and(|c| range.contains(c))
            {
                d.gift_aid_claimed = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_eligible(&self, donor_id: &str, range: DateRange) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for d in state.donations.iter_mut() {
            if d.donor_id == donor_id
                && d.status == DonationStatus::Completed
                && !d.gift_aid
                && d.completed_at.is_some_and(|c| range.contains(c))
            {
                d.gift_aid = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[derive(Default)]
struct GatewayState {
    customers: Vec<CustomerRequest>,
    payment_intents: Vec<(PaymentIntentRequest, PaymentIntent)>,
    subscriptions: Vec<(SubscriptionRequest, Subscription)>,
    setup_intents: Vec<(SetupIntentRequest, SetupIntent)>,
    failure: Option<String>,
    intent_status: Option<IntentStatus>,
    subscription_status: Option<SubscriptionStatus>,
    status_lookups: usize,
}

/// Records every request; objects are looked up by order number.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<GatewayState>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every create call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().failure = Some(message.to_string());
    }

    pub fn set_intent_status(&self, status: IntentStatus) {
        self.state.lock().unwrap().intent_status = Some(status);
    }

    pub fn set_subscription_status(&self, status: SubscriptionStatus) {
        self.state.lock().unwrap().subscription_status = Some(status);
    }

    pub fn customers(&self) -> Vec<CustomerRequest> {
        self.state.lock().unwrap().customers.clone()
    }

    pub fn payment_intent_requests(&self) -> Vec<PaymentIntentRequest> {
        self.state.lock().unwrap().payment_intents.iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn subscription_requests(&self) -> Vec<SubscriptionRequest> {
        self.state.lock().unwrap().subscriptions.iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn setup_intent_requests(&self) -> Vec<SetupIntentRequest> {
        self.state.lock().unwrap().setup_intents.iter().map(|(r, _)| r.clone()).collect()
    }

    pub fn status_lookups(&self) -> usize {
        self.state.lock().unwrap().status_lookups
    }

    fn check_failure(state: &GatewayState) -> Result<()> {
        match &state.failure {
            Some(message) => Err(GatewayError::new(message.clone()).into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGatewayTrait for MockGateway {
    async fn create_customer(&self, request: CustomerRequest) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        state.customers.push(request);
        Ok(format!("cus_{}", state.customers.len()))
    }

    async fn find_payment_intent(&self, order_number: &str) -> Result<Option<PaymentIntent>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .payment_intents
            .iter()
            .find(|(r, _)| r.order_number == order_number)
            .map(|(_, pi)| pi.clone()))
    }

    async fn create_payment_intent(&self, request: PaymentIntentRequest) -> Result<PaymentIntent> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        let n = state.payment_intents.len() + 1;
        let intent = PaymentIntent {
            id: format!("pi_{}", n),
            client_secret: Some(format!("pi_{}_secret", n)),
            status: IntentStatus::RequiresPaymentMethod,
            amount_pence: request.amount_pence,
        };
        state.payment_intents.push((request, intent.clone()));
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, payment_intent_id: &str) -> Result<PaymentIntent> {
        let mut state = self.state.lock().unwrap();
        state.status_lookups += 1;
        let status = state.intent_status.clone().unwrap_or(IntentStatus::Succeeded);
        state
            .payment_intents
            .iter()
            .find(|(_, pi)| pi.id == payment_intent_id)
            .map(|(_, pi)| PaymentIntent {
                status: status.clone(),
                ..pi.clone()
            })
            .ok_or_else(|| GatewayError::new(format!("No such payment_intent: '{}'", payment_intent_id)).into())
    }

    async fn find_subscription(&self, order_number: &str) -> Result<Option<Subscription>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .subscriptions
            .iter()
            .find(|(r, _)| r.order_number == order_number)
            .map(|(_, s)| s.clone()))
    }

    async fn create_subscription(&self, request: SubscriptionRequest) -> Result<Subscription> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        let n = state.subscriptions.len() + 1;
        let subscription = Subscription {
            id: format!("sub_{}", n),
            client_secret: Some(format!("sub_{}_secret", n)),
            status: SubscriptionStatus::Incomplete,
        };
        state.subscriptions.push((request, subscription.clone()));
        Ok(subscription)
    }

    async fn retrieve_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let mut state = self.state.lock().unwrap();
        state.status_lookups += 1;
        let status = state
            .subscription_status
            .clone()
            .unwrap_or(SubscriptionStatus::Active);
        state
            .subscriptions
            .iter()
            .find(|(_, s)| s.id == subscription_id)
            .map(|(_, s)| Subscription {
                status: status.clone(),
                ..s.clone()
            })
            .ok_or_else(|| GatewayError::new(format!("No such subscription: '{}'", subscription_id)).into())
    }

    async fn find_setup_intent(
        &self,
        _customer_id: &str,
        order_number: &str,
    ) -> Result<Option<SetupIntent>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .setup_intents
            .iter()
            .find(|(r, _)| r.order_number == order_number)
            .map(|(_, s)| s.clone()))
    }

    async fn create_setup_intent(&self, request: SetupIntentRequest) -> Result<SetupIntent> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        let n = state.setup_intents.len() + 1;
        let setup = SetupIntent {
            id: format!("seti_{}", n),
            client_secret: Some(format!("seti_{}_secret", n)),
            status: IntentStatus::RequiresPaymentMethod,
        };
        state.setup_intents.push((request, setup.clone()));
        Ok(setup)
    }

    async fn retrieve_setup_intent(&self, setup_intent_id: &str) -> Result<SetupIntent> {
        let mut state = self.state.lock().unwrap();
        state.status_lookups += 1;
        let status = state.intent_status.clone().unwrap_or(IntentStatus::Succeeded);
        state
            .setup_intents
            .iter()
            .find(|(_, s)| s.id == setup_intent_id)
            .map(|(_, s)| SetupIntent {
                status: status.clone(),
                ..s.clone()
            })
            .ok_or_else(|| GatewayError::new(format!("No such setup_intent: '{}'", setup_intent_id)).into())
    }
}

/// Keeps every receipt; optionally fails delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<DonationReceipt>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            failing: true,
        })
    }

    pub fn sent(&self) -> Vec<DonationReceipt> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReceiptNotifierTrait for RecordingNotifier {
    async fn send_receipt(&self, receipt: &DonationReceipt) -> Result<()> {
        if self.failing {
            return Err(Error::Notification("mail relay unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(receipt.clone());
        Ok(())
    }
}

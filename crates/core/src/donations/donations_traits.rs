use crate::donation_numbers::DonationNumber;
use crate::donations::donations_model::{
    Donation, ManualDonationRequest, NewDonation, RecurringCharge, RecurringChargeOutcome,
    RecurringDonation,
};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for donation repository operations
#[async_trait]
pub trait DonationRepositoryTrait: Send + Sync {
    fn get_donation(&self, donation_id: &str) -> Result<Donation>;
    fn list_by_order(&self, order_id: &str) -> Result<Vec<Donation>>;
    fn list_recurring_by_order(&self, order_id: &str) -> Result<Vec<RecurringDonation>>;
    fn find_by_gateway_reference(&self, reference: &str) -> Result<Option<Donation>>;
    fn find_recurring_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<RecurringDonation>>;

    /// Inserts a donation under a number the caller already allocated.
    async fn create_donation(&self, number: DonationNumber, new_donation: NewDonation)
        -> Result<Donation>;

    /// Inserts a charge of a recurring commitment and activates the commitment
    /// if it was still waiting for its first charge. The number is allocated
    /// inside the same transaction.
    async fn record_recurring_charge(
        &self,
        recurring_id: &str,
        new_donation: NewDonation,
    ) -> Result<Donation>;
}

/// Trait for donation service operations
#[async_trait]
pub trait DonationServiceTrait: Send + Sync {
    fn get_donation(&self, donation_id: &str) -> Result<Donation>;
    async fn record_manual_donation(&self, request: ManualDonationRequest) -> Result<Donation>;
    async fn record_recurring_charge(&self, charge: RecurringCharge)
        -> Result<RecurringChargeOutcome>;
}

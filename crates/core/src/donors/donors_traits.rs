use crate::donors::donors_model::{Donor, NewDonor};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for donor repository operations
#[async_trait]
pub trait DonorRepositoryTrait: Send + Sync {
    fn get_donor(&self, donor_id: &str) -> Result<Donor>;
    fn find_by_email(&self, email: &str) -> Result<Option<Donor>>;
    /// Looks the donor up by normalized email and creates it when absent.
    /// Profile fields present on `new_donor` overwrite the stored ones.
    /// Runs as a single transaction so concurrent first-time checkouts
    /// for the same email resolve to one donor.
    async fn find_or_create_donor(&self, new_donor: NewDonor) -> Result<Donor>;
    async fn set_gateway_customer_id(&self, donor_id: &str, customer_id: &str) -> Result<Donor>;
}

use crate::donation_numbers::donation_numbers_model::{DonationNumber, NumberKind};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for the durable number sequence.
#[async_trait]
pub trait DonationNumberRepositoryTrait: Send + Sync {
    /// Atomically advances the shared counter and records the issued number.
    /// Reports `DatabaseError::UniqueViolation` if the number already exists.
    async fn allocate(&self, kind: NumberKind) -> Result<DonationNumber>;
    fn is_issued(&self, number: &DonationNumber) -> Result<bool>;
}

/// Trait for donation number service operations
#[async_trait]
pub trait DonationNumberServiceTrait: Send + Sync {
    async fn allocate(&self, kind: NumberKind) -> Result<DonationNumber>;
    fn is_issued(&self, number: &DonationNumber) -> Result<bool>;
}

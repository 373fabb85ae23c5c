use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use super::donation_numbers_model::{DonationNumber, NumberKind};
use super::donation_numbers_traits::{DonationNumberRepositoryTrait, DonationNumberServiceTrait};
use crate::constants::MAX_NUMBER_ALLOCATION_ATTEMPTS;
use crate::errors::{Error, Result};

pub struct DonationNumberService {
    repository: Arc<dyn DonationNumberRepositoryTrait>,
    max_attempts: u32,
}

impl DonationNumberService {
    pub fn new(repository: Arc<dyn DonationNumberRepositoryTrait>) -> Self {
        Self {
            repository,
            max_attempts: MAX_NUMBER_ALLOCATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[async_trait]
impl DonationNumberServiceTrait for DonationNumberService {
    async fn allocate(&self, kind: NumberKind) -> Result<DonationNumber> {
        for attempt in 1..=self.max_attempts {
            match self.repository.allocate(kind).await {
                Ok(number) => {
                    debug!("Allocated {} on attempt {}", number, attempt);
                    return Ok(number);
                }
                Err(e) if e.is_unique_violation() => {
                    warn!(
                        "Donation number collision on attempt {}/{}: {}",
                        attempt, self.max_attempts, e
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::NumberAllocation(format!(
            "no free {} number after {} attempts",
            kind.prefix(),
            self.max_attempts
        )))
    }

    fn is_issued(&self, number: &DonationNumber) -> Result<bool> {
        self.repository.is_issued(number)
    }
}

/// Allocates a number and hands it to `persist`, retrying with a fresh number
/// when the write reports a uniqueness conflict on it.
pub async fn persist_with_number<T, F, Fut>(
    numbers: &dyn DonationNumberServiceTrait,
    kind: NumberKind,
    mut persist: F,
) -> Result<T>
where
    F: FnMut(DonationNumber) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 1..=MAX_NUMBER_ALLOCATION_ATTEMPTS {
        let number = numbers.allocate(kind).await?;
        match persist(number.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_unique_violation() => {
                warn!(
                    "Record with number {} already exists (attempt {}), retrying",
                    number, attempt
                );
            }
            Err(e) => return Err(e),
        }
    }
    Err(Error::NumberAllocation(format!(
        "could not persist a {} record after {} attempts",
        kind.prefix(),
        MAX_NUMBER_ALLOCATION_ATTEMPTS
    )))
}

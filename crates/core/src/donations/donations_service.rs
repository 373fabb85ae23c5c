use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info, warn};

use super::donations_model::{
    Donation, DonationSource, DonationStatus, ManualDonationRequest, NewDonation,
    RecurringCharge, RecurringChargeOutcome,
};
use super::donations_traits::{DonationRepositoryTrait, DonationServiceTrait};
use crate::checkout::Frequency;
use crate::donation_numbers::{persist_with_number, DonationNumberServiceTrait, NumberKind};
use crate::donors::DonorRepositoryTrait;
use crate::errors::Result;
use crate::utils::time_utils::now_utc;

/// Service for donations recorded outside the checkout flow
pub struct DonationService {
    repository: Arc<dyn DonationRepositoryTrait>,
    donor_repository: Arc<dyn DonorRepositoryTrait>,
    number_service: Arc<dyn DonationNumberServiceTrait>,
    currency: String,
}

impl DonationService {
    pub fn new(
        repository: Arc<dyn DonationRepositoryTrait>,
        donor_repository: Arc<dyn DonorRepositoryTrait>,
        number_service: Arc<dyn DonationNumberServiceTrait>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            donor_repository,
            number_service,
            currency: currency.into(),
        }
    }

    pub async fn record_manual_donation_at(
        &self,
        request: ManualDonationRequest,
        now: NaiveDateTime,
    ) -> Result<Donation> {
        request.validate(now)?;
        let new_donor = request.donor.validate()?;
        let donor = self.donor_repository.find_or_create_donor(new_donor).await?;

        let new_donation = NewDonation {
            donor_id: donor.id.clone(),
            order_id: None,
            recurring_donation_id: None,
            campaign: request
                .campaign
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            donation_type: request.donation_type.trim().to_string(),
            frequency: Frequency::OneOff,
            amount_pence: request.amount_pence,
            currency: self.currency.clone(),
            status: DonationStatus::Completed,
            gift_aid: request.gift_aid,
            source: DonationSource::Manual,
            gateway_reference: None,
            scheduled_for: None,
            completed_at: Some(request.received_at.unwrap_or(now)),
        };

        let repository = self.repository.clone();
        let donation = persist_with_number(
            self.number_service.as_ref(),
            NumberKind::Donation,
            |number| {
                let repository = repository.clone();
                let new_donation = new_donation.clone();
                async move { repository.create_donation(number, new_donation).await }
            },
        )
        .await?;

        info!(
            "Recorded manual donation {} of {}p for donor {}",
            donation.donation_number, donation.amount_pence, donor.id
        );
        Ok(donation)
    }
}

/// Portion of a paid invoice that counts as the donation. Anything above the
/// commitment is the donor's fee contribution; `None` when nothing was paid.
fn received_donation_pence(charge: &RecurringCharge, commitment_pence: i64) -> Option<i64> {
    (charge.amount_paid_pence > 0).then(|| charge.amount_paid_pence.min(commitment_pence))
}

#[async_trait]
impl DonationServiceTrait for DonationService {
    fn get_donation(&self, donation_id: &str) -> Result<Donation> {
        self.repository.get_donation(donation_id)
    }

    async fn record_manual_donation(&self, request: ManualDonationRequest) -> Result<Donation> {
        self.record_manual_donation_at(request, now_utc()).await
    }

    async fn record_recurring_charge(
        &self,
        charge: RecurringCharge,
    ) -> Result<RecurringChargeOutcome> {
        if self
            .repository
            .find_by_gateway_reference(&charge.invoice_id)?
            .is_some()
        {
            debug!("Invoice {} already recorded", charge.invoice_id);
            return Ok(RecurringChargeOutcome::Duplicate);
        }

        let Some(recurring) = self
            .repository
            .find_recurring_by_subscription(&charge.subscription_id)?
        else {
            warn!(
                "Ignoring invoice {} for unknown subscription {}",
                charge.invoice_id, charge.subscription_id
            );
            return Ok(RecurringChargeOutcome::UnknownSubscription);
        };

        let Some(amount_pence) = received_donation_pence(&charge, recurring.amount_pence) else {
            debug!(
                "Ignoring zero-amount invoice {} for {}",
                charge.invoice_id, recurring.donation_number
            );
            return Ok(RecurringChargeOutcome::ZeroAmount);
        };
        if amount_pence < recurring.amount_pence {
            warn!(
                "Invoice {} paid {}p against a {}p commitment {}",
                charge.invoice_id, charge.amount_paid_pence, recurring.amount_pence,
                recurring.donation_number
            );
        }

        let new_donation = NewDonation {
            donor_id: recurring.donor_id.clone(),
            order_id: Some(recurring.order_id.clone()),
            recurring_donation_id: Some(recurring.id.clone()),
            campaign: Some(recurring.campaign.clone()),
            donation_type: recurring.donation_type.clone(),
            frequency: recurring.frequency,
            amount_pence,
            currency: recurring.currency.clone(),
            status: DonationStatus::Completed,
            gift_aid: recurring.gift_aid,
            source: DonationSource::Recurring,
            gateway_reference: Some(charge.invoice_id.clone()),
            scheduled_for: None,
            completed_at: Some(charge.paid_at),
        };

        match self
            .repository
            .record_recurring_charge(&recurring.id, new_donation)
            .await
        {
            Ok(donation) => {
                info!(
                    "Recorded recurring charge {} for {} ({})",
                    donation.donation_number, recurring.donation_number, charge.invoice_id
                );
                Ok(RecurringChargeOutcome::Recorded(donation))
            }
            // A concurrent delivery of the same invoice won the insert.
            Err(e) if e.is_unique_violation() => {
                debug!("Invoice {} recorded concurrently: {}", charge.invoice_id, e);
                Ok(RecurringChargeOutcome::Duplicate)
            }
            Err(e) => Err(e),
        }
    }
}

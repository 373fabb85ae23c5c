use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info, warn};

use super::confirmation_model::{
    ConfirmOrderRequest, ConfirmationAck, ConfirmationOutcome, ConfirmedOrder, ReceiptStatus,
};
use super::confirmation_traits::ConfirmationServiceTrait;
use super::materialize::materialize_order;
use crate::checkout::{Order, OrderRepositoryTrait, OrderStatus};
use crate::donations::DonationRepositoryTrait;
use crate::donors::DonorRepositoryTrait;
use crate::errors::{Error, Result, ValidationError};
use crate::gateway::{GatewayOutcome, PaymentGatewayTrait};
use crate::notifications::{DonationReceipt, ReceiptLine, ReceiptNotifierTrait};
use crate::utils::time_utils::now_utc;

pub struct ConfirmationService {
    order_repository: Arc<dyn OrderRepositoryTrait>,
    donation_repository: Arc<dyn DonationRepositoryTrait>,
    donor_repository: Arc<dyn DonorRepositoryTrait>,
    gateway: Arc<dyn PaymentGatewayTrait>,
    notifier: Arc<dyn ReceiptNotifierTrait>,
}

impl ConfirmationService {
    pub fn new(
        order_repository: Arc<dyn OrderRepositoryTrait>,
        donation_repository: Arc<dyn DonationRepositoryTrait>,
        donor_repository: Arc<dyn DonorRepositoryTrait>,
        gateway: Arc<dyn PaymentGatewayTrait>,
        notifier: Arc<dyn ReceiptNotifierTrait>,
    ) -> Self {
        Self {
            order_repository,
            donation_repository,
            donor_repository,
            gateway,
            notifier,
        }
    }

    pub async fn confirm_at(
        &self,
        request: ConfirmOrderRequest,
        now: NaiveDateTime,
    ) -> Result<ConfirmationOutcome> {
        let order = self
            .order_repository
            .find_by_number(request.order_number.trim())?
            .ok_or_else(|| Error::NotFound(format!("Order {} not found", request.order_number)))?;

        check_identifier("paymentIntentId", &request.payment_intent_id, &order.payment_intent_id)?;
        check_identifier("subscriptionId", &request.subscription_id, &order.subscription_id)?;
        check_identifier("setupIntentId", &request.setup_intent_id, &order.setup_intent_id)?;

        if order.status != OrderStatus::Pending {
            debug!(
                "Order {} already {}, replaying acknowledgement",
                order.order_number,
                order.status.as_str()
            );
            return Ok(ConfirmationOutcome {
                ack: self.existing_ack(&order)?,
                receipt: ReceiptStatus::NotSent,
            });
        }

        match self.gateway_outcome(&order).await? {
            GatewayOutcome::Pending => Err(ValidationError::InvalidInput(format!(
                "Payment for order {} is not complete yet",
                order.order_number
            ))
            .into()),
            GatewayOutcome::Failed => {
                let failed = self.order_repository.mark_failed(&order.order_number).await?;
                warn!("Order {} failed at the gateway", failed.order_number);
                Ok(ConfirmationOutcome {
                    ack: self.existing_ack(&failed)?,
                    receipt: ReceiptStatus::NotSent,
                })
            }
            GatewayOutcome::Completed => {
                let materialization = materialize_order(&order, now)?;
                let confirmed = self
                    .order_repository
                    .confirm_order(&order.order_number, materialization)
                    .await?;
                let ack = ConfirmationAck::from_records(
                    &confirmed.order,
                    &confirmed.donations,
                    &confirmed.recurring,
                );
                if !confirmed.newly_confirmed {
                    return Ok(ConfirmationOutcome {
                        ack,
                        receipt: ReceiptStatus::NotSent,
                    });
                }
                info!(
                    "Confirmed order {}: {} donation(s), {} recurring",
                    ack.order_number,
                    ack.donation_numbers.len(),
                    ack.recurring_numbers.len()
                );
                let receipt = self.send_receipt(&confirmed).await;
                Ok(ConfirmationOutcome { ack, receipt })
            }
        }
    }

    fn existing_ack(&self, order: &Order) -> Result<ConfirmationAck> {
        let donations = self.donation_repository.list_by_order(&order.id)?;
        let recurring = self.donation_repository.list_recurring_by_order(&order.id)?;
        Ok(ConfirmationAck::from_records(order, &donations, &recurring))
    }

    /// Status of every gateway object the order relies on.
    async fn gateway_outcome(&self, order: &Order) -> Result<GatewayOutcome> {
        if order.payment_intent_id.is_none()
            && order.subscription_id.is_none()
            && order.setup_intent_id.is_none()
        {
            return Err(Error::Unexpected(format!(
                "Order {} has no gateway objects",
                order.order_number
            )));
        }
        let mut outcome = GatewayOutcome::Completed;
        if let Some(id) = &order.payment_intent_id {
            let intent = self.gateway.retrieve_payment_intent(id).await?;
            debug!("Payment intent {} is {:?}", id, intent.status);
            outcome = outcome.combine(intent.status.outcome());
        }
        if let Some(id) = &order.subscription_id {
            let subscription = self.gateway.retrieve_subscription(id).await?;
            debug!("Subscription {} is {:?}", id, subscription.status);
            outcome = outcome.combine(subscription.status.outcome());
        }
        if let Some(id) = &order.setup_intent_id {
            let setup = self.gateway.retrieve_setup_intent(id).await?;
            debug!("Setup intent {} is {:?}", id, setup.status);
            outcome = outcome.combine(setup.status.outcome());
        }
        Ok(outcome)
    }

    /// Runs after the transition is committed; failures only downgrade the
    /// receipt status.
    async fn send_receipt(&self, confirmed: &ConfirmedOrder) -> ReceiptStatus {
        let receipt = match self.build_receipt(confirmed) {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(
                    "Could not build receipt for {}: {}",
                    confirmed.order.order_number, e
                );
                return ReceiptStatus::Failed(e.to_string());
            }
        };
        match self.notifier.send_receipt(&receipt).await {
            Ok(()) => ReceiptStatus::Sent,
            Err(e) => {
                warn!(
                    "Receipt for {} was not delivered: {}",
                    confirmed.order.order_number, e
                );
                ReceiptStatus::Failed(e.to_string())
            }
        }
    }

    fn build_receipt(&self, confirmed: &ConfirmedOrder) -> Result<DonationReceipt> {
        let order = &confirmed.order;
        let donor = self.donor_repository.get_donor(&order.donor_id)?;
        let mut lines: Vec<ReceiptLine> = confirmed
            .donations
            .iter()
            .map(|d| ReceiptLine {
                number: d.donation_number.clone(),
                campaign: d.campaign.clone().unwrap_or_default(),
                donation_type: d.donation_type.clone(),
                frequency: d.frequency,
                amount_pence: d.amount_pence,
                scheduled_for: d.scheduled_for,
            })
            .collect();
        lines.extend(confirmed.recurring.iter().map(|r| ReceiptLine {
            number: r.donation_number.clone(),
            campaign: r.campaign.clone(),
            donation_type: r.donation_type.clone(),
            frequency: r.frequency,
            amount_pence: r.amount_pence,
            scheduled_for: Some(r.start_date),
        }));
        Ok(DonationReceipt {
            order_number: order.order_number.clone(),
            donor_email: donor.email.clone(),
            donor_name: donor.full_name(),
            mode: order.mode,
            currency: order.currency.clone(),
            total_pence: order.total_pence,
            fees_pence: order.fees_pence,
            gift_aid: order.gift_aid,
            lines,
        })
    }
}

fn check_identifier(field: &str, supplied: &Option<String>, stored: &Option<String>) -> Result<()> {
    match (supplied.as_deref().map(str::trim), stored.as_deref()) {
        (None, _) | (Some(""), _) => Ok(()),
        (Some(given), Some(expected)) if given == expected => Ok(()),
        (Some(given), _) => Err(ValidationError::InvalidInput(format!(
            "{} {} does not belong to this order",
            field, given
        ))
        .into()),
    }
}

#[async_trait]
impl ConfirmationServiceTrait for ConfirmationService {
    async fn confirm_order(&self, request: ConfirmOrderRequest) -> Result<ConfirmationOutcome> {
        self.confirm_at(request, now_utc()).await
    }
}

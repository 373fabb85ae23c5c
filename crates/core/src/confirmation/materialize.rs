//! Turns a confirmed order's cart into donation and recurring records.

use chrono::NaiveDateTime;

use crate::checkout::{plan_checkout, CartItem, Order};
use crate::confirmation::confirmation_model::OrderMaterialization;
use crate::donations::{
    DonationSource, DonationStatus, NewDonation, NewRecurringDonation, RecurringStatus,
};
use crate::errors::Result;

/// Immediate one-offs become COMPLETED donations, deferred one-offs SCHEDULED
/// ones, and the recurring plan a single commitment. Deferral is judged
/// against the day the order was placed so confirmation reproduces the plan
/// the gateway objects were created from.
pub fn materialize_order(order: &Order, now: NaiveDateTime) -> Result<OrderMaterialization> {
    let placed_on = order.placed_on();
    let plan = plan_checkout(&order.items, placed_on)?;

    let one_off = |item: &CartItem, status: DonationStatus| NewDonation {
        donor_id: order.donor_id.clone(),
        order_id: Some(order.id.clone()),
        recurring_donation_id: None,
        campaign: Some(item.campaign.clone()),
        donation_type: item.donation_type.clone(),
        frequency: item.frequency,
        amount_pence: item.amount_pence,
        currency: order.currency.clone(),
        status,
        gift_aid: order.gift_aid,
        source: DonationSource::Checkout,
        gateway_reference: None,
        scheduled_for: match status {
            DonationStatus::Scheduled => item.start_date,
            _ => None,
        },
        completed_at: match status {
            DonationStatus::Completed => Some(now),
            _ => None,
        },
    };

    let mut donations: Vec<NewDonation> = plan
        .immediate
        .iter()
        .map(|item| one_off(item, DonationStatus::Completed))
        .collect();
    donations.extend(
        plan.deferred
            .iter()
            .map(|item| one_off(item, DonationStatus::Scheduled)),
    );

    let recurring = plan
        .recurring
        .as_ref()
        .map(|recurring| NewRecurringDonation {
            donor_id: order.donor_id.clone(),
            order_id: order.id.clone(),
            frequency: recurring.frequency,
            amount_pence: recurring.amount_pence,
            currency: order.currency.clone(),
            campaign: recurring.campaign_label(),
            donation_type: recurring.donation_type_label(),
            start_date: recurring.start_date.unwrap_or(placed_on),
            end_date: recurring.end_date,
            subscription_id: order.subscription_id.clone(),
            status: if recurring.is_deferred(placed_on) {
                RecurringStatus::Scheduled
            } else {
                RecurringStatus::Active
            },
            gift_aid: order.gift_aid,
        })
        .into_iter()
        .collect();

    Ok(OrderMaterialization {
        donations,
        recurring,
    })
}

//! Splits a validated cart into what is charged now, later, and on a cadence,
//! and picks the payment mode that follows from that split.

use chrono::NaiveDate;

use crate::checkout::checkout_model::{CartItem, Frequency, PaymentMode};
use crate::daily_giving::{compute_schedule, DailyGivingMode};
use crate::errors::{Error, Result, ValidationError};

/// All recurring items of a cart, collapsed into one cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringPlan {
    pub frequency: Frequency,
    pub amount_pence: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub items: Vec<CartItem>,
}

impl RecurringPlan {
    pub fn is_deferred(&self, today: NaiveDate) -> bool {
        self.start_date.is_some_and(|start| start > today)
    }

    /// Campaigns covered by the plan, in cart order without repeats.
    pub fn campaign_label(&self) -> String {
        distinct_join(self.items.iter().map(|item| item.campaign.as_str()))
    }

    pub fn donation_type_label(&self) -> String {
        distinct_join(self.items.iter().map(|item| item.donation_type.as_str()))
    }
}

fn distinct_join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.join(", ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPlan {
    pub mode: PaymentMode,
    /// One-off items charged at checkout.
    pub immediate: Vec<CartItem>,
    /// One-off items with a future start date.
    pub deferred: Vec<CartItem>,
    pub recurring: Option<RecurringPlan>,
}

impl CheckoutPlan {
    pub fn immediate_total_pence(&self) -> Result<i64> {
        sum_amounts(&self.immediate)
    }

    pub fn has_deferred_charges(&self, today: NaiveDate) -> bool {
        !self.deferred.is_empty()
            || self
                .recurring
                .as_ref()
                .is_some_and(|plan| plan.is_deferred(today))
    }
}

fn sum_amounts(items: &[CartItem]) -> Result<i64> {
    items.iter().try_fold(0i64, |acc, item| {
        acc.checked_add(item.amount_pence)
            .ok_or_else(|| Error::from(ValidationError::out_of_range("amountPence", "total overflows")))
    })
}

/// Replaces each daily item that has no concrete dates yet with the items the
/// daily giving scheduler produces for it. Other items pass through unchanged.
pub fn expand_cart(items: &[CartItem], today: NaiveDate) -> Result<Vec<CartItem>> {
    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_unscheduled_daily() {
            expanded.push(item.clone());
            continue;
        }
        let schedule = compute_schedule(
            item.amount_pence,
            item.daily_mode.unwrap_or(DailyGivingMode::Daily),
            item.odd_nights_only.unwrap_or(false),
            item.daily_end_date,
            today,
        )?;
        expanded.extend(schedule.to_cart_items(&item.campaign, &item.donation_type));
    }
    Ok(expanded)
}

/// Groups the recurring items. They must all agree on cadence and dates.
fn collapse_recurring(items: Vec<CartItem>) -> Result<Option<RecurringPlan>> {
    let Some(first) = items.first() else {
        return Ok(None);
    };
    let key = (first.frequency, first.start_date, first.daily_end_date);
    if let Some(other) = items
        .iter()
        .find(|item| (item.frequency, item.start_date, item.daily_end_date) != key)
    {
        return Err(ValidationError::InvalidInput(format!(
            "Recurring items must share one frequency and date range ({} vs {})",
            first.frequency, other.frequency
        ))
        .into());
    }
    let amount_pence = sum_amounts(&items)?;
    Ok(Some(RecurringPlan {
        frequency: key.0,
        amount_pence,
        start_date: key.1,
        end_date: key.2,
        items,
    }))
}

/// Builds the plan for an already expanded and validated cart.
pub fn plan_checkout(items: &[CartItem], today: NaiveDate) -> Result<CheckoutPlan> {
    let mut immediate = Vec::new();
    let mut deferred = Vec::new();
    let mut recurring_items = Vec::new();

    for item in items {
        if item.frequency.is_recurring() {
            recurring_items.push(item.clone());
        } else if item.is_deferred(today) {
            deferred.push(item.clone());
        } else {
            immediate.push(item.clone());
        }
    }

    let recurring = collapse_recurring(recurring_items)?;
    let mode = match (&recurring, immediate.is_empty()) {
        (None, false) => PaymentMode::Payment,
        (None, true) => PaymentMode::Setup,
        (Some(_), false) => PaymentMode::Mixed,
        (Some(plan), true) if !plan.is_deferred(today) => PaymentMode::Subscription,
        (Some(_), true) => PaymentMode::Setup,
    };

    Ok(CheckoutPlan {
        mode,
        immediate,
        deferred,
        recurring,
    })
}

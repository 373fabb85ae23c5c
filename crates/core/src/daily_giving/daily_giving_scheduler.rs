use chrono::{Datelike, Duration, NaiveDate};

use super::daily_giving_model::{DailyGivingMode, DailyGivingPlan, DailyGivingRequest, DailySchedule};
use crate::constants::{DAILY_GIVING_DEFAULT_END_DAY, DAILY_GIVING_DEFAULT_END_MONTH, LAST_NIGHTS_WINDOW};
use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::get_days_between;

/// 20 March of this year if it has not passed yet, otherwise 20 March of next year.
pub fn default_period_end(today: NaiveDate) -> NaiveDate {
    let this_year = period_end_in(today.year());
    if today <= this_year {
        this_year
    } else {
        period_end_in(today.year() + 1)
    }
}

fn period_end_in(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, DAILY_GIVING_DEFAULT_END_MONTH, DAILY_GIVING_DEFAULT_END_DAY)
        .unwrap_or(NaiveDate::MAX)
}

/// Computes the charge dates for a daily giving pledge.
///
/// `today` and `period_end_date` are UTC calendar days. A last-ten pledge
/// covers the whole window or nothing: once its first night lies before
/// `today` the request is rejected rather than silently shortened.
pub fn compute_schedule(
    amount_per_day_pence: i64,
    mode: DailyGivingMode,
    odd_nights_only: bool,
    period_end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<DailySchedule> {
    if amount_per_day_pence <= 0 {
        return Err(
            ValidationError::out_of_range("amountPerDayPence", "must be greater than zero").into(),
        );
    }
    let end_date = period_end_date.unwrap_or_else(|| default_period_end(today));

    let dates = match mode {
        DailyGivingMode::Daily => {
            if odd_nights_only {
                return Err(ValidationError::InvalidInput(
                    "oddNightsOnly is only available for the last10 mode".to_string(),
                )
                .into());
            }
            if end_date < today {
                return Err(ValidationError::PeriodAlreadyPassed { end_date, today }.into());
            }
            get_days_between(today, end_date)
        }
        DailyGivingMode::LastTenNights => {
            if end_date <= today {
                return Err(ValidationError::PeriodAlreadyPassed { end_date, today }.into());
            }
            let window: Vec<NaiveDate> = (1..=LAST_NIGHTS_WINDOW)
                .rev()
                .map(|offset| end_date - Duration::days(offset))
                .collect();
            if window.first().is_some_and(|first_night| *first_night < today) {
                return Err(ValidationError::out_of_range(
                    "periodEndDate",
                    "the last ten nights have already started",
                )
                .into());
            }
            if odd_nights_only {
                // Every other night counting back from the last one, so with a
                // 20 March end the nights fall on the 11th, 13th ... 19th.
                window.iter().skip(1).step_by(2).copied().collect()
            } else {
                window
            }
        }
    };

    let day_count = dates.len() as i64;
    if day_count < 1 {
        return Err(ValidationError::out_of_range("dayCount", "must be at least one day").into());
    }

    let total_pence = amount_per_day_pence.checked_mul(day_count).ok_or_else(|| {
        ValidationError::out_of_range("amountPerDayPence", "is too large for the giving period")
    })?;

    Ok(DailySchedule {
        mode,
        odd_nights_only,
        period_end_date: end_date,
        dates,
        day_count,
        amount_per_day_pence,
        total_pence,
    })
}

/// Validates a preview request and returns the schedule with its cart items.
pub fn build_plan(request: &DailyGivingRequest, today: NaiveDate) -> Result<DailyGivingPlan> {
    if request.campaign.trim().is_empty() {
        return Err(ValidationError::MissingField("campaign".to_string()).into());
    }
    if request.donation_type.trim().is_empty() {
        return Err(ValidationError::MissingField("donationType".to_string()).into());
    }
    let schedule = compute_schedule(
        request.amount_per_day_pence,
        request.mode,
        request.odd_nights_only,
        request.period_end_date,
        today,
    )?;
    let items = schedule.to_cart_items(request.campaign.trim(), request.donation_type.trim());
    Ok(DailyGivingPlan { schedule, items })
}

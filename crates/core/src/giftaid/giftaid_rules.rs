//! Field normalization for the HMRC Gift Aid schedule.

use rust_decimal::Decimal;

use crate::constants::{
    GIFT_AID_DATE_FORMAT, GIFT_AID_NAME_MAX_CHARS, GIFT_AID_RATE_PERCENT,
    GIFT_AID_TITLE_MAX_CHARS,
};
use crate::giftaid::giftaid_model::{GiftAidRecord, GiftAidScheduleRow};

/// Gift Aid reclaimable on `total_pence`, rounded half up to the penny.
pub fn claimable_pence(total_pence: i64) -> i64 {
    (total_pence * GIFT_AID_RATE_PERCENT + 50).div_euclid(100)
}

pub fn amount_decimal(pence: i64) -> Decimal {
    Decimal::new(pence, 2)
}

/// Pence as a plain decimal string, e.g. `2500` -> `25.00`.
pub fn format_amount(pence: i64) -> String {
    amount_decimal(pence).to_string()
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.trim().chars().take(max).collect::<String>().trim_end().to_string()
}

/// Explicit house name/number, else the first token of the address line.
fn house_name_or_number(record: &GiftAidRecord) -> String {
    if let Some(house) = record.donor.house_name_or_number.as_deref() {
        let house = house.trim();
        if !house.is_empty() {
            return house.to_string();
        }
    }
    record
        .donor
        .address_line1
        .as_deref()
        .and_then(|line| line.split_whitespace().next())
        .map(|token| token.trim_end_matches(',').to_string())
        .unwrap_or_default()
}

pub fn schedule_row(record: &GiftAidRecord, item: usize) -> GiftAidScheduleRow {
    let donation = &record.donation;
    let donor = &record.donor;
    let donation_date = donation
        .completed_at
        .unwrap_or(donation.created_at)
        .date()
        .format(GIFT_AID_DATE_FORMAT)
        .to_string();

    GiftAidScheduleRow {
        item,
        title: truncate_chars(donor.title.as_deref().unwrap_or_default(), GIFT_AID_TITLE_MAX_CHARS),
        first_name: truncate_chars(&donor.first_name, GIFT_AID_NAME_MAX_CHARS),
        last_name: truncate_chars(&donor.last_name, GIFT_AID_NAME_MAX_CHARS),
        house_name_or_number: house_name_or_number(record),
        postcode: donor
            .postcode
            .as_deref()
            .map(|p| p.trim().to_uppercase())
            .unwrap_or_default(),
        aggregated_donations: String::new(),
        sponsored_event: String::new(),
        donation_date,
        amount: format_amount(donation.amount_pence),
        amount_pence: donation.amount_pence,
        donation_id: donation.id.clone(),
        donation_number: donation.donation_number.clone(),
        donor_id: donor.id.clone(),
        claimed: donation.gift_aid_claimed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_claimable_rounds_half_up() {
        assert_eq!(claimable_pence(10000), 2500);
        assert_eq!(claimable_pence(333), 83);
        assert_eq!(claimable_pence(2), 1);
        assert_eq!(claimable_pence(1), 0);
        assert_eq!(claimable_pence(0), 0);
    }

    #[test]
    fn test_amount_decimal_keeps_pence_scale() {
        assert_eq!(amount_decimal(2500), dec!(25.00));
        assert_eq!(amount_decimal(-150), dec!(-1.50));
        assert_eq!(amount_decimal(2500).scale(), 2);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2500), "25.00");
        assert_eq!(format_amount(333), "3.33");
        assert_eq!(format_amount(5), "0.05");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("Professor", 4), "Prof");
        assert_eq!(truncate_chars(" Dr ", 4), "Dr");
        assert_eq!(truncate_chars("Zoë", 2), "Zo");
    }
}

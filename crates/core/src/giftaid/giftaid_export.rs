//! CSV rendering of the HMRC schedule.

use csv::{QuoteStyle, WriterBuilder};

use crate::errors::{Error, Result};
use crate::giftaid::giftaid_model::GiftAidScheduleRow;

pub const GIFT_AID_CSV_HEADER: [&str; 10] = [
    "Item",
    "Title",
    "First name or initial",
    "Last name",
    "House name or number",
    "Postcode",
    "Aggregated donations",
    "Sponsored event",
    "Donation date",
    "Amount",
];

/// Writes the header and one record per row, quoting only where needed.
pub fn write_schedule_csv(rows: &[GiftAidScheduleRow]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer
        .write_record(GIFT_AID_CSV_HEADER)
        .map_err(|e| Error::Unexpected(format!("Failed to write CSV header: {}", e)))?;

    for row in rows {
        let item = row.item.to_string();
        writer
            .write_record([
                item.as_str(),
                row.title.as_str(),
                row.first_name.as_str(),
                row.last_name.as_str(),
                row.house_name_or_number.as_str(),
                row.postcode.as_str(),
                row.aggregated_donations.as_str(),
                row.sponsored_event.as_str(),
                row.donation_date.as_str(),
                row.amount.as_str(),
            ])
            .map_err(|e| Error::Unexpected(format!("Failed to write CSV row {}: {}", row.item, e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Unexpected(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Unexpected(format!("CSV is not UTF-8: {}", e)))
}

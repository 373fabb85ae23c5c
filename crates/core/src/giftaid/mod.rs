//! Gift Aid reconciliation - eligibility partitioning, HMRC schedule
//! export, and claim tracking.

mod giftaid_export;
mod giftaid_model;
mod giftaid_rules;
mod giftaid_service;
mod giftaid_traits;

#[cfg(test)]
mod giftaid_service_tests;

pub use giftaid_export::{write_schedule_csv, GIFT_AID_CSV_HEADER};
pub use giftaid_model::{
    GiftAidBucket, GiftAidBucketKind, GiftAidExport, GiftAidRecord, GiftAidSchedule,
    GiftAidScheduleRow, GiftAidSummary,
};
pub use giftaid_rules::{amount_decimal, claimable_pence, format_amount, schedule_row};
pub use giftaid_service::GiftAidService;
pub use giftaid_traits::{GiftAidRepositoryTrait, GiftAidServiceTrait};

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::giftaid_export::write_schedule_csv;
use super::giftaid_model::{
    GiftAidBucket, GiftAidBucketKind, GiftAidExport, GiftAidRecord, GiftAidSchedule,
    GiftAidSummary,
};
use super::giftaid_rules::{claimable_pence, schedule_row};
use super::giftaid_traits::{GiftAidRepositoryTrait, GiftAidServiceTrait};
use crate::donors::DonorRepositoryTrait;
use crate::errors::Result;
use crate::utils::DateRange;

pub struct GiftAidService {
    repository: Arc<dyn GiftAidRepositoryTrait>,
    donor_repository: Arc<dyn DonorRepositoryTrait>,
}

impl GiftAidService {
    pub fn new(
        repository: Arc<dyn GiftAidRepositoryTrait>,
        donor_repository: Arc<dyn DonorRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            donor_repository,
        }
    }

    fn bucket<'a>(records: impl Iterator<Item = &'a GiftAidRecord>) -> GiftAidBucket {
        let rows: Vec<_> = records
            .enumerate()
            .map(|(index, record)| schedule_row(record, index + 1))
            .collect();
        let total_amount_pence: i64 = rows.iter().map(|row| row.amount_pence).sum();
        GiftAidBucket {
            summary: GiftAidSummary {
                total_amount_pence,
                total_count: rows.len(),
                claimable_pence: claimable_pence(total_amount_pence),
            },
            rows,
        }
    }
}

fn export_file_name(range: &DateRange, bucket: GiftAidBucketKind) -> String {
    let bound = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| "all".to_string())
    };
    format!(
        "gift-aid-{}-{}-{}.csv",
        bucket.as_str(),
        bound(range.start),
        bound(range.end)
    )
}

#[async_trait]
impl GiftAidServiceTrait for GiftAidService {
    fn get_schedule(&self, range: DateRange) -> Result<GiftAidSchedule> {
        range.validate()?;
        let records = self.repository.list_completed(&range)?;
        let eligible = Self::bucket(records.iter().filter(|r| r.donation.gift_aid));
        let ineligible = Self::bucket(records.iter().filter(|r| !r.donation.gift_aid));
        debug!(
            "Gift Aid schedule: {} eligible, {} ineligible",
            eligible.summary.total_count, ineligible.summary.total_count
        );
        Ok(GiftAidSchedule {
            range,
            eligible,
            ineligible,
        })
    }

    fn export_csv(
        &self,
        range: DateRange,
        bucket: GiftAidBucketKind,
        include_claimed: bool,
    ) -> Result<GiftAidExport> {
        range.validate()?;
        let records = self.repository.list_completed(&range)?;
        let selected = Self::bucket(records.iter().filter(|r| match bucket {
            GiftAidBucketKind::Eligible => {
                r.donation.gift_aid && (include_claimed || !r.donation.gift_aid_claimed)
            }
            GiftAidBucketKind::Ineligible => !r.donation.gift_aid,
        }));
        let content = write_schedule_csv(&selected.rows)?;
        Ok(GiftAidExport {
            file_name: export_file_name(&range, bucket),
            content,
            row_count: selected.rows.len(),
        })
    }

    async fn mark_claimed(&self, range: DateRange) -> Result<usize> {
        range.validate()?;
        let updated = self.repository.mark_claimed(range).await?;
        info!("Marked {} donation(s) as Gift Aid claimed", updated);
        Ok(updated)
    }

    async fn mark_eligible(&self, donor_id: &str, range: DateRange) -> Result<usize> {
        range.validate()?;
        let donor = self.donor_repository.get_donor(donor_id)?;
        let updated = self.repository.mark_eligible(&donor.id, range).await?;
        info!(
            "Marked {} donation(s) of donor {} as Gift Aid eligible",
            updated, donor.id
        );
        Ok(updated)
    }
}

use crate::errors::Result;
use crate::giftaid::giftaid_model::{GiftAidBucketKind, GiftAidExport, GiftAidRecord, GiftAidSchedule};
use crate::utils::DateRange;
use async_trait::async_trait;

/// Trait for Gift Aid repository operations
#[async_trait]
pub trait GiftAidRepositoryTrait: Send + Sync {
    /// COMPLETED donations whose completion falls in `range`, oldest first.
    fn list_completed(&self, range: &DateRange) -> Result<Vec<GiftAidRecord>>;

    /// Flags every eligible, unclaimed, completed donation in `range` as
    /// claimed in one transaction. Returns the number of rows changed.
    async fn mark_claimed(&self, range: DateRange) -> Result<usize>;

    /// Makes the donor's completed donations in `range` eligible. Returns the
    /// number of rows changed.
    async fn mark_eligible(&self, donor_id: &str, range: DateRange) -> Result<usize>;
}

/// Trait for Gift Aid service operations
#[async_trait]
pub trait GiftAidServiceTrait: Send + Sync {
    fn get_schedule(&self, range: DateRange) -> Result<GiftAidSchedule>;
    fn export_csv(
        &self,
        range: DateRange,
        bucket: GiftAidBucketKind,
        include_claimed: bool,
    ) -> Result<GiftAidExport>;
    async fn mark_claimed(&self, range: DateRange) -> Result<usize>;
    async fn mark_eligible(&self, donor_id: &str, range: DateRange) -> Result<usize>;
}

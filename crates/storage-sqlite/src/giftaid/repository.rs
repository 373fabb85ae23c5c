use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use log::info;

use donatio_core::donations::{Donation, DonationStatus};
use donatio_core::donors::Donor;
use donatio_core::errors::Result;
use donatio_core::giftaid::{GiftAidRecord, GiftAidRepositoryTrait};
use donatio_core::utils::DateRange;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::donations::DonationDB;
use crate::donors::DonorDB;
use crate::errors::IntoCore;
use crate::schema::{donations, donors};

pub struct GiftAidRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl GiftAidRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GiftAidRepository { pool, writer }
    }
}

/// Ids of COMPLETED donations whose completion time falls in `range`.
fn completed_in<'a>(range: &DateRange) -> donations::BoxedQuery<'a, Sqlite, diesel::sql_types::Text> {
    let mut query = donations::table
        .select(donations::id)
        .filter(donations::status.eq(DonationStatus::Completed.as_str()))
        .into_boxed();
    if let Some(lower) = range.lower_bound() {
        query = query.filter(donations::completed_at.ge(lower));
    }
    if let Some(upper) = range.upper_bound_exclusive() {
        query = query.filter(donations::completed_at.lt(upper));
    }
    query
}

#[async_trait]
impl GiftAidRepositoryTrait for GiftAidRepository {
    fn list_completed(&self, range: &DateRange) -> Result<Vec<GiftAidRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = donations::table
            .inner_join(donors::table)
            .filter(donations::status.eq(DonationStatus::Completed.as_str()))
            .filter(donations::completed_at.is_not_null())
            .select((DonationDB::as_select(), DonorDB::as_select()))
            .into_boxed();
        if let Some(lower) = range.lower_bound() {
            query = query.filter(donations::completed_at.ge(lower));
        }
        if let Some(upper) = range.upper_bound_exclusive() {
            query = query.filter(donations::completed_at.lt(upper));
        }

        let rows: Vec<(DonationDB, DonorDB)> = query
            .order((donations::completed_at.asc(), donations::donation_number.asc()))
            .load(&mut conn)
            .into_core()?;

        rows.into_iter()
            .map(|(donation, donor)| {
                Ok(GiftAidRecord {
                    donation: Donation::try_from(donation)?,
                    donor: Donor::from(donor),
                })
            })
            .collect()
    }

    async fn mark_claimed(&self, range: DateRange) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let updated = diesel::update(
                    donations::table
                        .filter(donations::id.eq_any(completed_in(&range)))
                        .filter(donations::gift_aid.eq(true))
                        .filter(donations::gift_aid_claimed.eq(false)),
                )
                .set((
                    donations::gift_aid_claimed.eq(true),
                    donations::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                info!("Marked {} donation(s) as claimed for Gift Aid", updated);
                Ok(updated)
            })
            .await
    }

    async fn mark_eligible(&self, donor_id: &str, range: DateRange) -> Result<usize> {
        let donor_id = donor_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let updated = diesel::update(
                    donations::table
                        .filter(donations::id.eq_any(completed_in(&range)))
                        .filter(donations::donor_id.eq(&donor_id))
                        .filter(donations::gift_aid.eq(false)),
                )
                .set((
                    donations::gift_aid.eq(true),
                    donations::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                info!(
                    "Made {} donation(s) from donor {} eligible for Gift Aid",
                    updated, donor_id
                );
                Ok(updated)
            })
            .await
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use uuid::Uuid;

use donatio_core::donation_numbers::{DonationNumber, NumberKind};
use donatio_core::donations::{
    Donation, DonationRepositoryTrait, NewDonation, NewRecurringDonation, RecurringDonation,
    RecurringStatus,
};
use donatio_core::errors::{Error, Result};

use super::model::{DonationDB, RecurringDonationDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::donation_numbers::allocate_number;
use crate::errors::IntoCore;
use crate::schema::{donations, recurring_donations};

pub struct DonationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DonationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DonationRepository { pool, writer }
    }
}

pub(crate) fn insert_donation(
    conn: &mut SqliteConnection,
    number: DonationNumber,
    new: NewDonation,
) -> Result<Donation> {
    let now = Utc::now().naive_utc();
    let row = DonationDB {
        id: Uuid::new_v4().to_string(),
        donation_number: number.into_string(),
        donor_id: new.donor_id,
        order_id: new.order_id,
        recurring_donation_id: new.recurring_donation_id,
        campaign: new.campaign,
        donation_type: new.donation_type,
        frequency: new.frequency.as_str().to_string(),
        amount_pence: new.amount_pence,
        currency: new.currency,
        status: new.status.as_str().to_string(),
        gift_aid: new.gift_aid,
        gift_aid_claimed: false,
        source: new.source.as_str().to_string(),
        gateway_reference: new.gateway_reference,
        scheduled_for: new.scheduled_for,
        completed_at: new.completed_at,
        created_at: now,
        updated_at: now,
    };
    let inserted = diesel::insert_into(donations::table)
        .values(&row)
        .returning(DonationDB::as_returning())
        .get_result(conn)
        .into_core()?;
    debug!("Inserted donation {}", inserted.donation_number);
    Donation::try_from(inserted)
}

pub(crate) fn insert_recurring(
    conn: &mut SqliteConnection,
    number: DonationNumber,
    new: NewRecurringDonation,
) -> Result<RecurringDonation> {
    let now = Utc::now().naive_utc();
    let row = RecurringDonationDB {
        id: Uuid::new_v4().to_string(),
        donation_number: number.into_string(),
        donor_id: new.donor_id,
        order_id: new.order_id,
        frequency: new.frequency.as_str().to_string(),
        amount_pence: new.amount_pence,
        currency: new.currency,
        campaign: new.campaign,
        donation_type: new.donation_type,
        start_date: new.start_date,
        end_date: new.end_date,
        subscription_id: new.subscription_id,
        status: new.status.as_str().to_string(),
        gift_aid: new.gift_aid,
        created_at: now,
        updated_at: now,
    };
    let inserted = diesel::insert_into(recurring_donations::table)
        .values(&row)
        .returning(RecurringDonationDB::as_returning())
        .get_result(conn)
        .into_core()?;
    RecurringDonation::try_from(inserted)
}

pub(crate) fn load_donations_by_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> Result<Vec<Donation>> {
    donations::table
        .filter(donations::order_id.eq(order_id))
        .order(donations::donation_number.asc())
        .select(DonationDB::as_select())
        .load(conn)
        .into_core()?
        .into_iter()
        .map(Donation::try_from)
        .collect()
}

pub(crate) fn load_recurring_by_order(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> Result<Vec<RecurringDonation>> {
    recurring_donations::table
        .filter(recurring_donations::order_id.eq(order_id))
        .order(recurring_donations::donation_number.asc())
        .select(RecurringDonationDB::as_select())
        .load(conn)
        .into_core()?
        .into_iter()
        .map(RecurringDonation::try_from)
        .collect()
}

#[async_trait]
impl DonationRepositoryTrait for DonationRepository {
    fn get_donation(&self, donation_id: &str) -> Result<Donation> {
        let mut conn = get_connection(&self.pool)?;
        donations::table
            .find(donation_id)
            .select(DonationDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Donation {} not found", donation_id)))
            .and_then(Donation::try_from)
    }

    fn list_by_order(&self, order_id: &str) -> Result<Vec<Donation>> {
        let mut conn = get_connection(&self.pool)?;
        load_donations_by_order(&mut conn, order_id)
    }

    fn list_recurring_by_order(&self, order_id: &str) -> Result<Vec<RecurringDonation>> {
        let mut conn = get_connection(&self.pool)?;
        load_recurring_by_order(&mut conn, order_id)
    }

    fn find_by_gateway_reference(&self, reference: &str) -> Result<Option<Donation>> {
        let mut conn = get_connection(&self.pool)?;
        donations::table
            .filter(donations::gateway_reference.eq(reference))
            .select(DonationDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(Donation::try_from)
            .transpose()
    }

    fn find_recurring_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<RecurringDonation>> {
        let mut conn = get_connection(&self.pool)?;
        recurring_donations::table
            .filter(recurring_donations::subscription_id.eq(subscription_id))
            .select(RecurringDonationDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(RecurringDonation::try_from)
            .transpose()
    }

    async fn create_donation(
        &self,
        number: DonationNumber,
        new_donation: NewDonation,
    ) -> Result<Donation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| insert_donation(conn, number, new_donation))
            .await
    }

    async fn record_recurring_charge(
        &self,
        recurring_id: &str,
        new_donation: NewDonation,
    ) -> Result<Donation> {
        let recurring_id = recurring_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Donation> {
                let number = allocate_number(conn, NumberKind::Donation)?;
                let donation = insert_donation(conn, number, new_donation)?;

                diesel::update(
                    recurring_donations::table
                        .find(&recurring_id)
                        .filter(recurring_donations::status.eq(RecurringStatus::Scheduled.as_str())),
                )
                .set((
                    recurring_donations::status.eq(RecurringStatus::Active.as_str()),
                    recurring_donations::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .into_core()?;

                Ok(donation)
            })
            .await
    }
}

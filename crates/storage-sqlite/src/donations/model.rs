//! Database models for donations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use donatio_core::donations::{Donation, RecurringDonation};
use donatio_core::errors::Error;

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonationDB {
    pub id: String,
    pub donation_number: String,
    pub donor_id: String,
    pub order_id: Option<String>,
    pub recurring_donation_id: Option<String>,
    pub campaign: Option<String>,
    pub donation_type: String,
    pub frequency: String,
    pub amount_pence: i64,
    pub currency: String,
    pub status: String,
    pub gift_aid: bool,
    pub gift_aid_claimed: bool,
    pub source: String,
    pub gateway_reference: Option<String>,
    pub scheduled_for: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<DonationDB> for Donation {
    type Error = Error;

    fn try_from(db: DonationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            frequency: db.frequency.parse()?,
            status: db.status.parse()?,
            source: db.source.parse()?,
            id: db.id,
            donation_number: db.donation_number,
            donor_id: db.donor_id,
            order_id: db.order_id,
            recurring_donation_id: db.recurring_donation_id,
            campaign: db.campaign,
            donation_type: db.donation_type,
            amount_pence: db.amount_pence,
            currency: db.currency,
            gift_aid: db.gift_aid,
            gift_aid_claimed: db.gift_aid_claimed,
            gateway_reference: db.gateway_reference,
            scheduled_for: db.scheduled_for,
            completed_at: db.completed_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::recurring_donations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecurringDonationDB {
    pub id: String,
    pub donation_number: String,
    pub donor_id: String,
    pub order_id: String,
    pub frequency: String,
    pub amount_pence: i64,
    pub currency: String,
    pub campaign: String,
    pub donation_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub subscription_id: Option<String>,
    pub status: String,
    pub gift_aid: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<RecurringDonationDB> for RecurringDonation {
    type Error = Error;

    fn try_from(db: RecurringDonationDB) -> Result<Self, Self::Error> {
        Ok(Self {
            frequency: db.frequency.parse()?,
            status: db.status.parse()?,
            id: db.id,
            donation_number: db.donation_number,
            donor_id: db.donor_id,
            order_id: db.order_id,
            amount_pence: db.amount_pence,
            currency: db.currency,
            campaign: db.campaign,
            donation_type: db.donation_type,
            start_date: db.start_date,
            end_date: db.end_date,
            subscription_id: db.subscription_id,
            gift_aid: db.gift_aid,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

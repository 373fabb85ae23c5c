//! Database models for donors.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use donatio_core::donors::Donor;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::donors)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DonorDB {
    pub id: String,
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub gateway_customer_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::donors)]
pub struct NewDonorDB {
    pub id: String,
    pub email: String,
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Profile fields refreshed when a known donor checks out again. `None`
/// leaves the stored value alone.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::donors)]
pub struct DonorProfileChangeset {
    pub title: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub house_name_or_number: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<DonorDB> for Donor {
    fn from(db: DonorDB) -> Self {
        Self {
            id: db.id,
            email: db.email,
            title: db.title,
            first_name: db.first_name,
            last_name: db.last_name,
            phone: db.phone,
            address_line1: db.address_line1,
            house_name_or_number: db.house_name_or_number,
            city: db.city,
            postcode: db.postcode,
            country: db.country,
            gateway_customer_id: db.gateway_customer_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

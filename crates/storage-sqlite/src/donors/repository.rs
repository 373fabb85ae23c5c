use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use uuid::Uuid;

use donatio_core::donors::{normalize_email, Donor, DonorRepositoryTrait, NewDonor};
use donatio_core::errors::{Error, Result};

use super::model::{DonorDB, DonorProfileChangeset, NewDonorDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::donors;

pub struct DonorRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DonorRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DonorRepository { pool, writer }
    }
}

/// Loads a donor or reports `Error::NotFound`.
pub(crate) fn load_donor(conn: &mut SqliteConnection, donor_id: &str) -> Result<Donor> {
    donors::table
        .find(donor_id)
        .select(DonorDB::as_select())
        .first(conn)
        .optional()
        .into_core()?
        .map(Donor::from)
        .ok_or_else(|| Error::NotFound(format!("Donor {} not found", donor_id)))
}

#[async_trait]
impl DonorRepositoryTrait for DonorRepository {
    fn get_donor(&self, donor_id: &str) -> Result<Donor> {
        let mut conn = get_connection(&self.pool)?;
        load_donor(&mut conn, donor_id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Donor>> {
        let mut conn = get_connection(&self.pool)?;
        let found = donors::table
            .filter(donors::email.eq(normalize_email(email)))
            .select(DonorDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(found.map(Donor::from))
    }

    async fn find_or_create_donor(&self, new_donor: NewDonor) -> Result<Donor> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Donor> {
                let now = Utc::now().naive_utc();
                let existing = donors::table
                    .filter(donors::email.eq(&new_donor.email))
                    .select(DonorDB::as_select())
                    .first(conn)
                    .optional()
                    .into_core()?;

                if let Some(existing) = existing {
                    let changes = DonorProfileChangeset {
                        title: new_donor.title,
                        first_name: new_donor.first_name,
                        last_name: new_donor.last_name,
                        phone: new_donor.phone,
                        address_line1: new_donor.address_line1,
                        house_name_or_number: new_donor.house_name_or_number,
                        city: new_donor.city,
                        postcode: new_donor.postcode,
                        country: new_donor.country,
                        updated_at: now,
                    };
                    let updated = diesel::update(donors::table.find(&existing.id))
                        .set(&changes)
                        .returning(DonorDB::as_returning())
                        .get_result(conn)
                        .into_core()?;
                    return Ok(Donor::from(updated));
                }

                let row = NewDonorDB {
                    id: Uuid::new_v4().to_string(),
                    email: new_donor.email,
                    title: new_donor.title,
                    first_name: new_donor.first_name,
                    last_name: new_donor.last_name,
                    phone: new_donor.phone,
                    address_line1: new_donor.address_line1,
                    house_name_or_number: new_donor.house_name_or_number,
                    city: new_donor.city,
                    postcode: new_donor.postcode,
                    country: new_donor.country,
                    created_at: now,
                    updated_at: now,
                };
                let inserted = diesel::insert_into(donors::table)
                    .values(&row)
                    .returning(DonorDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                debug!("Created donor {}", inserted.id);
                Ok(Donor::from(inserted))
            })
            .await
    }

    async fn set_gateway_customer_id(&self, donor_id: &str, customer_id: &str) -> Result<Donor> {
        let donor_id = donor_id.to_string();
        let customer_id = customer_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Donor> {
                let updated = diesel::update(donors::table.find(&donor_id))
                    .set((
                        donors::gateway_customer_id.eq(Some(customer_id)),
                        donors::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::NotFound(format!("Donor {} not found", donor_id)));
                }
                load_donor(conn, &donor_id)
            })
            .await
    }
}

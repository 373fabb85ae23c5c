//! Database models for orders.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use donatio_core::checkout::{CartItem, Order};
use donatio_core::errors::Error;

use crate::errors::IntoCore;

/// Cart items are stored as JSON; they are only read back whole.
#[derive(Queryable, Identifiable, Selectable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderDB {
    pub id: String,
    pub order_number: String,
    pub donor_id: String,
    pub mode: String,
    pub status: String,
    pub currency: String,
    pub subtotal_pence: i64,
    pub fees_pence: i64,
    pub total_pence: i64,
    pub gift_aid: bool,
    pub items_json: String,
    pub payment_intent_id: Option<String>,
    pub subscription_id: Option<String>,
    pub setup_intent_id: Option<String>,
    pub payment_client_secret: Option<String>,
    pub subscription_client_secret: Option<String>,
    pub setup_client_secret: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
}

impl TryFrom<OrderDB> for Order {
    type Error = Error;

    fn try_from(db: OrderDB) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> = serde_json::from_str(&db.items_json).into_core()?;
        Ok(Self {
            mode: db.mode.parse()?,
            status: db.status.parse()?,
            items,
            id: db.id,
            order_number: db.order_number,
            donor_id: db.donor_id,
            currency: db.currency,
            subtotal_pence: db.subtotal_pence,
            fees_pence: db.fees_pence,
            total_pence: db.total_pence,
            gift_aid: db.gift_aid,
            payment_intent_id: db.payment_intent_id,
            subscription_id: db.subscription_id,
            setup_intent_id: db.setup_intent_id,
            payment_client_secret: db.payment_client_secret,
            subscription_client_secret: db.subscription_client_secret,
            setup_client_secret: db.setup_client_secret,
            created_at: db.created_at,
            updated_at: db.updated_at,
            confirmed_at: db.confirmed_at,
        })
    }
}

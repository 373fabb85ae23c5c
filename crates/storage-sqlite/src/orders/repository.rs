use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::{debug, info};
use uuid::Uuid;

use donatio_core::checkout::{NewOrder, Order, OrderRepositoryTrait, OrderStatus};
use donatio_core::confirmation::{ConfirmedOrder, OrderMaterialization};
use donatio_core::donation_numbers::NumberKind;
use donatio_core::errors::{Error, Result};

use super::model::OrderDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::donation_numbers::allocate_number;
use crate::donations::{
    insert_donation, insert_recurring, load_donations_by_order, load_recurring_by_order,
};
use crate::errors::IntoCore;
use crate::schema::orders;

pub struct OrderRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OrderRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        OrderRepository { pool, writer }
    }
}

fn load_by_number(conn: &mut SqliteConnection, order_number: &str) -> Result<Option<Order>> {
    orders::table
        .filter(orders::order_number.eq(order_number))
        .select(OrderDB::as_select())
        .first(conn)
        .optional()
        .into_core()?
        .map(Order::try_from)
        .transpose()
}

fn require_by_number(conn: &mut SqliteConnection, order_number: &str) -> Result<Order> {
    load_by_number(conn, order_number)?
        .ok_or_else(|| Error::NotFound(format!("Order {} not found", order_number)))
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    fn get_order(&self, order_id: &str) -> Result<Order> {
        let mut conn = get_connection(&self.pool)?;
        orders::table
            .find(order_id)
            .select(OrderDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| Error::NotFound(format!("Order {} not found", order_id)))
            .and_then(Order::try_from)
    }

    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>> {
        let mut conn = get_connection(&self.pool)?;
        load_by_number(&mut conn, order_number)
    }

    async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        let items_json = serde_json::to_string(&new_order.items).into_core()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Order> {
                let now = Utc::now().naive_utc();
                let row = OrderDB {
                    id: Uuid::new_v4().to_string(),
                    order_number: new_order.order_number,
                    donor_id: new_order.donor_id,
                    mode: new_order.mode.as_str().to_string(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    currency: new_order.currency,
                    subtotal_pence: new_order.subtotal_pence,
                    fees_pence: new_order.fees_pence,
                    total_pence: new_order.total_pence,
                    gift_aid: new_order.gift_aid,
                    items_json,
                    payment_intent_id: new_order.payment_intent_id,
                    subscription_id: new_order.subscription_id,
                    setup_intent_id: new_order.setup_intent_id,
                    payment_client_secret: new_order.payment_client_secret,
                    subscription_client_secret: new_order.subscription_client_secret,
                    setup_client_secret: new_order.setup_client_secret,
                    created_at: now,
                    updated_at: now,
                    confirmed_at: None,
                };
                let inserted = diesel::insert_into(orders::table)
                    .values(&row)
                    .returning(OrderDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                debug!("Created order {}", inserted.order_number);
                Order::try_from(inserted)
            })
            .await
    }

    async fn confirm_order(
        &self,
        order_number: &str,
        materialization: OrderMaterialization,
    ) -> Result<ConfirmedOrder> {
        let order_number = order_number.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<ConfirmedOrder> {
                let order = require_by_number(conn, &order_number)?;

                if order.status != OrderStatus::Pending {
                    let donations = load_donations_by_order(conn, &order.id)?;
                    let recurring = load_recurring_by_order(conn, &order.id)?;
                    return Ok(ConfirmedOrder {
                        order,
                        donations,
                        recurring,
                        newly_confirmed: false,
                    });
                }

                let mut donations = Vec::with_capacity(materialization.donations.len());
                for new in materialization.donations {
                    let number = allocate_number(conn, NumberKind::Donation)?;
                    donations.push(insert_donation(conn, number, new)?);
                }
                let mut recurring = Vec::with_capacity(materialization.recurring.len());
                for new in materialization.recurring {
                    let number = allocate_number(conn, NumberKind::Recurring)?;
                    recurring.push(insert_recurring(conn, number, new)?);
                }

                let now = Utc::now().naive_utc();
                let confirmed = diesel::update(orders::table.find(&order.id))
                    .set((
                        orders::status.eq(OrderStatus::Confirmed.as_str()),
                        orders::confirmed_at.eq(Some(now)),
                        orders::updated_at.eq(now),
                    ))
                    .returning(OrderDB::as_returning())
                    .get_result(conn)
                    .into_core()?;

                info!(
                    "Confirmed order {} with {} donation(s) and {} recurring commitment(s)",
                    order_number,
                    donations.len(),
                    recurring.len()
                );
                Ok(ConfirmedOrder {
                    order: Order::try_from(confirmed)?,
                    donations,
                    recurring,
                    newly_confirmed: true,
                })
            })
            .await
    }

    async fn mark_failed(&self, order_number: &str) -> Result<Order> {
        let order_number = order_number.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Order> {
                let order = require_by_number(conn, &order_number)?;
                if order.status != OrderStatus::Pending {
                    return Ok(order);
                }
                let failed = diesel::update(orders::table.find(&order.id))
                    .set((
                        orders::status.eq(OrderStatus::Failed.as_str()),
                        orders::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .returning(OrderDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                info!("Order {} marked FAILED", order_number);
                Order::try_from(failed)
            })
            .await
    }
}

use crate::checkout::checkout_model::{CheckoutRequest, CheckoutResponse, NewOrder, Order};
use crate::confirmation::{ConfirmedOrder, OrderMaterialization};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for order repository operations
#[async_trait]
pub trait OrderRepositoryTrait: Send + Sync {
    fn get_order(&self, order_id: &str) -> Result<Order>;
    fn find_by_number(&self, order_number: &str) -> Result<Option<Order>>;
    async fn create_order(&self, new_order: NewOrder) -> Result<Order>;

    /// Moves a PENDING order to CONFIRMED and inserts the materialized
    /// records, numbering each inside the same transaction. An order that
    /// has already left PENDING is returned with its existing records and
    /// `newly_confirmed == false`.
    async fn confirm_order(
        &self,
        order_number: &str,
        materialization: OrderMaterialization,
    ) -> Result<ConfirmedOrder>;

    /// Moves a PENDING order to FAILED. Other states are left untouched.
    async fn mark_failed(&self, order_number: &str) -> Result<Order>;
}

/// Trait for checkout service operations
#[async_trait]
pub trait CheckoutServiceTrait: Send + Sync {
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse>;
    fn get_order(&self, order_number: &str) -> Result<Order>;
}

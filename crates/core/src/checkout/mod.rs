//! Checkout orchestrator - turns a cart into an order and the gateway
//! objects the payment UI completes.

mod checkout_model;
mod checkout_plan;
mod checkout_service;
mod checkout_traits;


pub use checkout_model::{
    CartItem, CheckoutRequest, CheckoutResponse, Frequency, NewOrder, Order, OrderStatus,
    PaymentMode,
};
pub use checkout_plan::{expand_cart, plan_checkout, CheckoutPlan, RecurringPlan};
pub use checkout_service::CheckoutService;
pub use checkout_traits::{CheckoutServiceTrait, OrderRepositoryTrait};

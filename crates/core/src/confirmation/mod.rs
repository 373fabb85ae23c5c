//! Confirmation handler - idempotent transition of an order once the
//! gateway reports the payment outcome.

mod confirmation_model;
mod confirmation_service;
mod confirmation_traits;
mod materialize;

#[cfg(test)]
mod confirmation_service_tests;

pub use confirmation_model::{
    ConfirmOrderRequest, ConfirmationAck, ConfirmationOutcome, ConfirmedOrder,
    OrderMaterialization, ReceiptStatus,
};
pub use confirmation_service::ConfirmationService;
pub use confirmation_traits::ConfirmationServiceTrait;
pub use materialize::materialize_order;

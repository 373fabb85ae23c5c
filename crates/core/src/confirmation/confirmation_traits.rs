use crate::confirmation::confirmation_model::{ConfirmOrderRequest, ConfirmationOutcome};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for confirmation service operations
#[async_trait]
pub trait ConfirmationServiceTrait: Send + Sync {
    async fn confirm_order(&self, request: ConfirmOrderRequest) -> Result<ConfirmationOutcome>;
}

use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use donatio_core::{
    checkout::{CheckoutService, CheckoutServiceTrait},
    confirmation::{ConfirmationService, ConfirmationServiceTrait},
    donation_numbers::DonationNumberService,
    donations::{DonationService, DonationServiceTrait},
    giftaid::{GiftAidService, GiftAidServiceTrait},
    notifications::{NoopReceiptNotifier, ReceiptNotifierTrait},
};
use donatio_gateway::{StripeGateway, WebhookReceiptNotifier};
use donatio_storage_sqlite::{
    db, donation_numbers::DonationNumberRepository, donations::DonationRepository,
    donors::DonorRepository, giftaid::GiftAidRepository, orders::OrderRepository, DbPool,
};

use crate::{auth::AdminAuth, config::Config};

pub struct AppState {
    pub checkout_service: Arc<dyn CheckoutServiceTrait>,
    pub confirmation_service: Arc<dyn ConfirmationServiceTrait>,
    pub donation_service: Arc<dyn DonationServiceTrait>,
    pub giftaid_service: Arc<dyn GiftAidServiceTrait>,
    pub pool: Arc<DbPool>,
    pub auth: Option<Arc<AdminAuth>>,
    pub webhook_secret: Option<String>,
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let number_repo = Arc::new(DonationNumberRepository::new(pool.clone(), writer.clone()));
    let donor_repo = Arc::new(DonorRepository::new(pool.clone(), writer.clone()));
    let order_repo = Arc::new(OrderRepository::new(pool.clone(), writer.clone()));
    let donation_repo = Arc::new(DonationRepository::new(pool.clone(), writer.clone()));
    let giftaid_repo = Arc::new(GiftAidRepository::new(pool.clone(), writer.clone()));

    let number_service = Arc::new(DonationNumberService::new(number_repo));

    if config.gateway_secret_key.is_none() {
        tracing::warn!("DN_GATEWAY_SECRET_KEY is not set; checkout requests will fail");
    }
    let gateway = Arc::new(StripeGateway::new(
        &config.gateway_api_url,
        config.gateway_secret_key.as_deref(),
    )?);

    let notifier: Arc<dyn ReceiptNotifierTrait> = match &config.receipt_webhook_url {
        Some(url) => {
            tracing::info!("Receipts are posted to {}", url);
            Arc::new(WebhookReceiptNotifier::new(url)?)
        }
        None => {
            tracing::info!("DN_RECEIPT_WEBHOOK_URL is not set; receipts are only logged");
            Arc::new(NoopReceiptNotifier)
        }
    };

    let checkout_service = Arc::new(CheckoutService::new(
        order_repo.clone(),
        donor_repo.clone(),
        number_service.clone(),
        gateway.clone(),
        config.currency.clone(),
    ));
    let confirmation_service = Arc::new(ConfirmationService::new(
        order_repo,
        donation_repo.clone(),
        donor_repo.clone(),
        gateway,
        notifier,
    ));
    let donation_service = Arc::new(DonationService::new(
        donation_repo,
        donor_repo.clone(),
        number_service,
        config.currency.clone(),
    ));
    let giftaid_service = Arc::new(GiftAidService::new(giftaid_repo, donor_repo));

    let auth = config
        .auth
        .as_ref()
        .map(AdminAuth::new)
        .transpose()?
        .map(Arc::new);
    if config.gateway_webhook_secret.is_none() {
        tracing::warn!("DN_GATEWAY_WEBHOOK_SECRET is not set; gateway webhooks are rejected");
    }

    Ok(Arc::new(AppState {
        checkout_service,
        confirmation_service,
        donation_service,
        giftaid_service,
        pool,
        auth,
        webhook_secret: config.gateway_webhook_secret.clone(),
    }))
}

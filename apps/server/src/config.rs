use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use donatio_core::constants::DEFAULT_CURRENCY;
use donatio_gateway::DEFAULT_GATEWAY_API_URL;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::auth::AdminAuthConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub currency: String,
    pub gateway_api_url: String,
    pub gateway_secret_key: Option<String>,
    pub gateway_webhook_secret: Option<String>,
    pub receipt_webhook_url: Option<String>,
    pub auth: Option<AdminAuthConfig>,
    pub log_format: String,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("DN_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid DN_LISTEN_ADDR")?;
        let db_path = std::env::var("DN_DB_PATH").unwrap_or_else(|_| "./db/app.db".into());
        let cors_allow = std::env::var("DN_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("DN_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let currency = optional_var("DN_CURRENCY")
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let auth = match (
            optional_var("DN_AUTH_PASSWORD_HASH"),
            optional_var("DN_SECRET_KEY"),
        ) {
            (Some(password_hash), Some(secret)) => {
                let ttl_minutes: u64 = std::env::var("DN_AUTH_TOKEN_TTL_MINUTES")
                    .unwrap_or_else(|_| "60".into())
                    .parse()
                    .unwrap_or(60);
                Some(AdminAuthConfig {
                    password_hash,
                    signing_key: parse_signing_key(&secret)?,
                    session_ttl: Duration::from_secs(ttl_minutes * 60),
                })
            }
            (None, None) => None,
            _ => anyhow::bail!("DN_AUTH_PASSWORD_HASH and DN_SECRET_KEY must be set together"),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            currency,
            gateway_api_url: optional_var("DN_GATEWAY_API_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_API_URL.to_string()),
            gateway_secret_key: optional_var("DN_GATEWAY_SECRET_KEY"),
            gateway_webhook_secret: optional_var("DN_GATEWAY_WEBHOOK_SECRET"),
            receipt_webhook_url: optional_var("DN_RECEIPT_WEBHOOK_URL"),
            auth,
            log_format: std::env::var("DN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
        })
    }

    /// Defaults with every optional collaborator switched off.
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            db_path: db_path.into(),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
            currency: DEFAULT_CURRENCY.to_string(),
            gateway_api_url: DEFAULT_GATEWAY_API_URL.to_string(),
            gateway_secret_key: None,
            gateway_webhook_secret: None,
            receipt_webhook_url: None,
            auth: None,
            log_format: "text".to_string(),
        }
    }
}

/// Admin token signing key: base64 or a raw 32-character string, 32 bytes either way.
fn parse_signing_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("DN_SECRET_KEY cannot be empty");
    }
    let key = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => anyhow::bail!("DN_SECRET_KEY must be base64 encoded or a 32-byte ASCII string"),
    };
    if key.len() != 32 {
        anyhow::bail!("DN_SECRET_KEY must decode to exactly 32 bytes");
    }
    Ok(key)
}

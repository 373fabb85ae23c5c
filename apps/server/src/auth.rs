//! Admin sessions for the donation back office.
//!
//! A single operator password (argon2 PHC string) unlocks a short-lived HS256
//! token scoped to donation administration. Gift aid and manual donation
//! routes sit behind [`require_admin`]; checkout and webhooks never do.

use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

const ADMIN_SUBJECT: &str = "donatio-admin";

/// The only scope a session can carry.
pub const ADMIN_SCOPE: &str = "donations:admin";

#[derive(Clone)]
pub struct AdminAuthConfig {
    pub password_hash: String,
    pub signing_key: Vec<u8>,
    pub session_ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token handed back on a successful sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub expires_at: DateTime<Utc>,
}

pub struct AdminAuth {
    password_hash: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_ttl: chrono::Duration,
}

impl AdminAuth {
    pub fn new(config: &AdminAuthConfig) -> anyhow::Result<Self> {
        PasswordHash::new(&config.password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid DN_AUTH_PASSWORD_HASH: {e}"))?;
        let session_ttl = chrono::Duration::from_std(config.session_ttl)
            .map_err(|e| anyhow::anyhow!("Invalid admin session lifetime: {e}"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.sub = Some(ADMIN_SUBJECT.to_string());
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            password_hash: config.password_hash.clone(),
            encoding_key: EncodingKey::from_secret(&config.signing_key),
            decoding_key: DecodingKey::from_secret(&config.signing_key),
            validation,
            session_ttl,
        })
    }

    /// Checks the operator password and opens a session valid from `now`.
    pub fn sign_in(&self, password: &str, now: DateTime<Utc>) -> ApiResult<AdminSession> {
        let parsed = PasswordHash::new(&self.password_hash)
            .map_err(|e| ApiError::Internal(format!("Invalid password hash: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => {
                    tracing::warn!("Rejected admin sign-in");
                    ApiError::Unauthorized("Invalid password".to_string())
                }
                other => ApiError::Internal(format!("Password verification failed: {other}")),
            })?;

        let expires_at = now + self.session_ttl;
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            scope: ADMIN_SCOPE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let access_token = self.sign(&claims)?;
        Ok(AdminSession {
            access_token,
            token_type: "Bearer",
            expires_in: self.session_ttl.num_seconds().max(0) as u64,
            expires_at,
        })
    }

    fn sign(&self, claims: &AdminClaims) -> ApiResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign admin token: {e}")))
    }

    /// Decodes a bearer token and insists on the admin scope.
    pub fn authorize(&self, token: &str) -> ApiResult<AdminClaims> {
        let claims = decode::<AdminClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Admin token rejected: {:?}", e.kind());
                unauthorized()
            })?
            .claims;
        if claims.scope != ADMIN_SCOPE {
            tracing::debug!("Admin token carries scope {}", claims.scope);
            return Err(unauthorized());
        }
        Ok(claims)
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized("Unauthorized".to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Guards the back office. Left open when no admin password is configured.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> ApiResult<Response> {
    if let Some(auth) = state.auth.as_ref() {
        let token = bearer_token(request.headers()).ok_or_else(unauthorized)?;
        let claims = auth.authorize(token)?;
        request.extensions_mut().insert(claims);
    }
    Ok(next.run(request).await)
}

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use donatio_core::errors::Error as CoreError;
use serde::{Deserialize, Serialize};

use crate::{
    auth::AdminSession,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct SignInRequest {
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthStatus {
    requires_password: bool,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> ApiResult<Json<AdminSession>> {
    let auth = state.auth.as_ref().ok_or_else(|| {
        ApiError::Core(CoreError::NotFound(
            "admin sign-in is not enabled on this server".to_string(),
        ))
    })?;
    let session = auth.sign_in(&request.password, Utc::now())?;
    tracing::info!("Admin session opened until {}", session.expires_at);
    Ok(Json(session))
}

async fn status(State(state): State<Arc<AppState>>) -> Json<AuthStatus> {
    Json(AuthStatus {
        requires_password: state.auth.is_some(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/status", get(status))
}

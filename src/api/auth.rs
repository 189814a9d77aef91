//! Session login

use axum::{extract::State, routing::post, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::api::users::UserResponse;

pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login_id: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserResponse,
}

/// POST /auth/login
///
/// Issues a session token for an active account. Unknown logins, wrong
/// passwords and inactive accounts get the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .credentials
        .authenticate(&request.login_id, &request.password)
        .await
        .map_err(|e| state.api_error(e))?
        .ok_or_else(|| ApiError::unauthorized("Invalid login id or password"))?;

    let token = state
        .jwt_service
        .generate(&user)
        .map_err(|e| state.api_error(e))?;

    let expires_at = Utc::now() + Duration::hours(state.jwt_service.expiration_hours() as i64);

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_at: expires_at.to_rfc3339(),
        user: UserResponse::from(&user),
    }))
}

//! Session extractors
//!
//! The bearer token names a user id; the actor is resolved from the directory
//! on every request so role and status changes apply immediately.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::message::MessageCode;
use crate::domain::user::UserStatus;
use crate::domain::{Actor, DomainError};

/// Extractor that requires a valid session for an active user
#[derive(Debug, Clone)]
pub struct RequireActor(pub Actor);

/// Extractor that additionally requires `ROLE_SYS_ADMIN`
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Actor);

impl FromRequestParts<AppState> for RequireActor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        let claims = state.jwt_service.validate(&token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized("Invalid or expired session token")
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::unauthorized("Invalid or expired session token"))?;

        let actor = match state.user_directory.resolve_actor(user_id).await {
            Ok(actor) => actor,
            Err(DomainError::NotFound { .. }) => {
                warn!(user_id = %user_id, "SECURITY: session token for unknown user");
                return Err(ApiError::unauthorized("Session user no longer exists"));
            }
            Err(e) => return Err(state.api_error(e)),
        };

        if actor.status() != UserStatus::Active {
            warn!(
                login_id = actor.login_id(),
                status = %actor.status(),
                "SECURITY: session used by inactive account"
            );
            return Err(state.api_error(
                DomainError::permission_denied(
                    MessageCode::OperNotAllowedForState,
                    format!("Account '{}' is {}", actor.login_id(), actor.status()),
                )
                .with_object_id(user_id.value()),
            ));
        }

        Ok(RequireActor(actor))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireActor(actor) = RequireActor::from_request_parts(parts, state).await?;

        if !actor.is_admin() {
            return Err(state.api_error(DomainError::permission_denied(
                MessageCode::OperNoPermission,
                "Administrator role required",
            )));
        }

        debug!(login_id = actor.login_id(), "Admin access");
        Ok(RequireAdmin(actor))
    }
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a session token via 'Authorization: Bearer <token>'",
    ))
}

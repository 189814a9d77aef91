//! API errors rendered as response envelopes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error};

use super::response::ResponseEnvelope;
use crate::domain::{DomainError, MessageCatalog};

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ResponseEnvelope,
}

/// HTTP status for a domain error
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        DomainError::DuplicateObject { .. } => StatusCode::CONFLICT,
        DomainError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        DomainError::Conflict { .. } => StatusCode::CONFLICT,
        DomainError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn new(status: StatusCode, body: ResponseEnvelope) -> Self {
        Self { status, body }
    }

    /// Render a domain error with its bound catalog entry
    ///
    /// A not-found error that carries the attempted payload echoes it in
    /// `msgDesc`.
    pub fn from_domain(err: &DomainError, catalog: &MessageCatalog) -> Self {
        let status = status_for(err);

        if status.is_server_error() {
            error!(error = %err, code = err.code().name(), "Request failed");
        } else {
            debug!(error = %err, code = err.code().name(), "Request rejected");
        }

        let msg_desc = match err.detail() {
            Some(detail) => format!("{} (request: {})", err, detail),
            None => err.to_string(),
        };

        Self::new(
            status,
            ResponseEnvelope::error(msg_desc).with_message(err.message_entry(catalog)),
        )
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ResponseEnvelope::error(message))
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ResponseEnvelope::error(message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.status,
            self.body.msg_desc.as_deref().unwrap_or_default()
        )
    }
}

impl std::error::Error for ApiError {}

//! Path and query extractors that report bad parameters in the envelope format

use axum::{
    extract::{
        path::ErrorKind,
        rejection::{PathRejection, QueryRejection},
        FromRequestParts, Path as AxumPath, Query as AxumQuery,
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use crate::api::state::AppState;
use crate::domain::message::MessageCode;
use crate::domain::DomainError;

/// Wrapper around `axum::extract::Path` whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

/// Wrapper around `axum::extract::Query` whose rejection is an [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T> FromRequestParts<AppState> for Path<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AxumPath::<T>::from_request_parts(parts, state).await {
            Ok(AxumPath(value)) => Ok(Path(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected path parameter");
                Err(state.api_error(path_error(&rejection)))
            }
        }
    }
}

impl<T> FromRequestParts<AppState> for Query<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AxumQuery::<T>::from_request_parts(parts, state).await {
            Ok(AxumQuery(value)) => Ok(Query(value)),
            Err(rejection) => {
                debug!(error = %rejection.body_text(), "Rejected query string");
                Err(state.api_error(query_error(&rejection)))
            }
        }
    }
}

fn path_error(rejection: &PathRejection) -> DomainError {
    let field = match rejection {
        PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
            ErrorKind::ParseErrorAtKey { key, .. }
            | ErrorKind::InvalidUtf8InPathParam { key }
            | ErrorKind::DeserializeError { key, .. } => key.clone(),
            _ => "path".to_string(),
        },
        _ => "path".to_string(),
    };

    DomainError::invalid_field(
        field,
        MessageCode::InvalidInputData,
        format!("Invalid path parameter: {}", rejection.body_text()),
    )
}

fn query_error(rejection: &QueryRejection) -> DomainError {
    DomainError::invalid_field(
        "query",
        MessageCode::InvalidInputData,
        format!("Invalid query string: {}", rejection.body_text()),
    )
}

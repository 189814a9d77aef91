//! Configuration resource lookup

use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Serialize;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path};
use crate::domain::{DomainError, ResourceOrigin};

pub fn create_resources_router() -> Router<AppState> {
    Router::new().route("/{name}", get(resolve_resource))
}

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub name: String,
    pub path: String,
    pub uri: String,
    pub origin: ResourceOrigin,
}

/// GET /resources/{name}
pub async fn resolve_resource(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(name): Path<String>,
) -> Result<Json<ResourceResponse>, ApiError> {
    let resolved = state
        .resolve_resource(&name)
        .await
        .map_err(|e| state.api_error(e))?
        .ok_or_else(|| {
            state.api_error(DomainError::not_found(format!(
                "Configuration resource '{}' not found",
                name
            )))
        })?;

    Ok(Json(ResourceResponse {
        name: resolved.name().to_string(),
        path: resolved.path().display().to_string(),
        uri: resolved.uri(),
        origin: resolved.origin(),
    }))
}

//! Group endpoints

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireActor, RequireAdmin};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path, Query};
use crate::domain::group::{Group, GroupId, GroupQuery, GroupSource, GroupStatus, GroupType};
use crate::infrastructure::group::{CreateGroupRequest, UpdateGroupRequest};

pub fn create_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groups).post(create_group))
        .route("/{id}", get(get_group).put(update_group))
        .route("/{id}/deactivate", post(deactivate_group))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub status: GroupStatus,
    pub group_type: GroupType,
    pub group_source: GroupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_store_id: Option<u64>,
    pub create_date: String,
    pub update_date: String,
    pub version: u64,
}

impl From<&Group> for GroupResponse {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id().value(),
            name: group.name().to_string(),
            description: group.description().to_string(),
            status: group.status(),
            group_type: group.group_type(),
            group_source: group.group_source(),
            credential_store_id: group.credential_store_id(),
            create_date: group.audit().created_at().to_rfc3339(),
            update_date: group.audit().updated_at().to_rfc3339(),
            version: group.version(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListGroupsResponse {
    pub groups: Vec<GroupResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupListParams {
    pub status: Option<GroupStatus>,
    pub source: Option<GroupSource>,
    pub name: Option<String>,
}

impl From<GroupListParams> for GroupQuery {
    fn from(params: GroupListParams) -> Self {
        Self {
            status: params.status,
            source: params.source,
            name: params.name.filter(|n| !n.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group_type: GroupType,
    #[serde(default)]
    pub group_source: GroupSource,
    #[serde(default)]
    pub credential_store_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub credential_store_id: Option<u64>,
    #[serde(default)]
    pub version: Option<u64>,
}

/// GET /groups
pub async fn list_groups(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(params): Query<GroupListParams>,
) -> Result<Json<ListGroupsResponse>, ApiError> {
    let groups = state
        .group_service
        .list(&actor, &params.into())
        .await
        .map_err(|e| state.api_error(e))?;

    let groups: Vec<GroupResponse> = groups.iter().map(GroupResponse::from).collect();
    let total = groups.len();

    Ok(Json(ListGroupsResponse { groups, total }))
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(body): Json<CreateGroupBody>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    debug!(name = %body.name, "Creating group");

    let request = CreateGroupRequest {
        name: body.name,
        description: body.description,
        group_type: body.group_type,
        group_source: body.group_source,
        credential_store_id: body.credential_store_id,
    };

    let group = state
        .group_service
        .create(&actor, request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(&group))))
}

/// GET /groups/{id}
pub async fn get_group(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = state
        .group_service
        .get(&actor, GroupId::new(id))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(GroupResponse::from(&group)))
}

/// PUT /groups/{id}
pub async fn update_group(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
    Json(body): Json<UpdateGroupBody>,
) -> Result<Json<GroupResponse>, ApiError> {
    let request = UpdateGroupRequest {
        id: GroupId::new(id),
        name: body.name,
        description: body.description,
        credential_store_id: body.credential_store_id,
        version: body.version,
    };

    let group = state
        .group_service
        .update(&actor, request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(GroupResponse::from(&group)))
}

/// POST /groups/{id}/deactivate
pub async fn deactivate_group(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<u64>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = state
        .group_service
        .deactivate(&actor, GroupId::new(id))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(GroupResponse::from(&group)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_into_query() {
        let query: GroupQuery = GroupListParams {
            status: Some(GroupStatus::Active),
            source: None,
            name: Some("  ".to_string()),
        }
        .into();

        assert_eq!(query.status, Some(GroupStatus::Active));
        assert!(query.name.is_none());
    }

    #[test]
    fn test_create_body_defaults() {
        let body: CreateGroupBody = serde_json::from_str(r#"{"name":"analysts"}"#).unwrap();

        assert_eq!(body.group_type, GroupType::Internal);
        assert_eq!(body.group_source, GroupSource::Internal);
        assert!(body.description.is_none());
    }

    #[test]
    fn test_group_response_shape() {
        let group = Group::new(GroupId::new(4), "analysts", "Data team", None);
        let json = serde_json::to_value(GroupResponse::from(&group)).unwrap();

        assert_eq!(json["id"], 4);
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["groupSource"], "internal");
        assert!(json.get("credentialStoreId").is_none());
    }
}

//! User directory endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::{RequireActor, RequireAdmin};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, Path, Query, ResponseEnvelope};
use crate::domain::user::{
    Page, SortOrder, User, UserId, UserRole, UserSearchCriteria, UserSortField, UserSource,
    UserStatus, DEFAULT_PAGE_SIZE,
};
use crate::domain::DomainError;
use crate::infrastructure::user::{
    CreateUserRequest, EmailChangeRequest, PasswordChangeRequest, UpdateUserRequest,
};

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_users).post(create_user).put(update_user))
        .route("/default", post(create_default_user))
        .route("/profile", get(profile))
        .route("/{id}", get(get_user))
        .route("/{id}/roles", put(set_roles))
        .route("/{id}/approve", post(approve_user))
        .route("/{id}/deactivate", post(deactivate_user))
        .route("/{id}/passwordchange", post(change_password))
        .route("/{id}/emailchange", post(change_email))
}

/// User record as exposed over the API; never carries the password
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: u64,
    pub login_id: String,
    pub email_address: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_screen_name: Option<String>,
    pub status: UserStatus,
    pub user_role_list: Vec<UserRole>,
    pub user_source: UserSource,
    pub create_date: String,
    pub update_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_date: Option<String>,
    pub version: u64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().value(),
            login_id: user.login_id().to_string(),
            email_address: user.email().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().map(String::from),
            public_screen_name: user.public_screen_name().map(String::from),
            status: user.status(),
            user_role_list: user.roles().iter().copied().collect(),
            user_source: user.user_source(),
            create_date: user.audit().created_at().to_rfc3339(),
            update_date: user.audit().updated_at().to_rfc3339(),
            approved_date: user.approved_at().map(|t| t.to_rfc3339()),
            activation_date: user.activated_at().map(|t| t.to_rfc3339()),
            version: user.version(),
        }
    }
}

/// One page of users
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub start_index: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub result_size: usize,
    pub users: Vec<UserResponse>,
}

impl From<Page<User>> for UserListResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            start_index: page.start_index(),
            page_size: page.page_size(),
            total_count: page.total_count(),
            result_size: page.result_size(),
            users: page.items().iter().map(UserResponse::from).collect(),
        }
    }
}

/// Query string of `GET /users`
///
/// `status` and `userRole` take comma-separated lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchParams {
    pub user_id: Option<u64>,
    pub login_id: Option<String>,
    pub email_address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub public_screen_name: Option<String>,
    pub status: Option<String>,
    pub user_role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub start_index: Option<usize>,
    pub page_size: Option<usize>,
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl UserSearchParams {
    pub fn into_criteria(self) -> Result<UserSearchCriteria, DomainError> {
        let statuses = split_list(self.status.as_deref())
            .map(|s| s.parse::<UserStatus>().map_err(DomainError::from))
            .collect::<Result<Vec<_>, _>>()?;

        let roles = split_list(self.user_role.as_deref())
            .map(|s| s.parse::<UserRole>().map_err(DomainError::from))
            .collect::<Result<Vec<_>, _>>()?;

        let sort_by = match non_blank(self.sort_by) {
            Some(field) => Some(field.parse::<UserSortField>()?),
            None => None,
        };

        let sort_order = match non_blank(self.sort_type) {
            Some(order) => order.parse()?,
            None => SortOrder::Asc,
        };

        Ok(UserSearchCriteria {
            user_id: self.user_id.map(UserId::new),
            login_id: non_blank(self.login_id),
            email: non_blank(self.email_address),
            first_name: non_blank(self.first_name),
            last_name: non_blank(self.last_name),
            public_screen_name: non_blank(self.public_screen_name),
            statuses,
            roles,
            sort_by,
            sort_order,
            start_index: self.start_index.unwrap_or(0),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

/// Body of `POST /users` and `POST /users/default`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub login_id: String,
    pub email_address: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub public_screen_name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub user_role_list: Vec<UserRole>,
    #[serde(default)]
    pub user_source: UserSource,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            login_id: body.login_id,
            email: body.email_address,
            first_name: body.first_name,
            last_name: body.last_name,
            public_screen_name: body.public_screen_name,
            password: body.password,
            roles: body.user_role_list,
            user_source: body.user_source,
        }
    }
}

/// Body of `PUT /users`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub id: u64,
    pub email_address: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub public_screen_name: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRolesBody {
    pub user_role_list: Vec<UserRole>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeBody {
    #[serde(default)]
    pub old_password: Option<String>,
    #[serde(alias = "updPassword")]
    pub new_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailChangeBody {
    pub email_address: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// GET /users
pub async fn search_users(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Query(params): Query<UserSearchParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    let criteria = params.into_criteria().map_err(|e| state.api_error(e))?;

    let page = state
        .user_directory
        .search(&actor, &criteria)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserListResponse::from(page)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_directory
        .get(&actor, UserId::new(id))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(login_id = %body.login_id, "Creating user");

    let user = state
        .user_directory
        .create(&actor, body.into())
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /users/default
pub async fn create_default_user(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!(login_id = %body.login_id, "Creating pre-approved user");

    let user = state
        .user_directory
        .create_default_account(&actor, body.into())
        .await
        .map_err(|e| state.api_error(e))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /users
pub async fn update_user(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = UpdateUserRequest {
        id: UserId::new(body.id),
        email: body.email_address,
        first_name: body.first_name,
        last_name: body.last_name,
        public_screen_name: body.public_screen_name,
        version: body.version,
    };

    let user = state
        .user_directory
        .update(&actor, request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /users/{id}/roles
pub async fn set_roles(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
    Json(body): Json<SetRolesBody>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    state
        .user_directory
        .set_roles(&actor, UserId::new(id), body.user_role_list)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ResponseEnvelope::success(format!(
        "Roles of user '{}' updated",
        id
    ))))
}

/// POST /users/{id}/approve
pub async fn approve_user(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_directory
        .approve(&actor, UserId::new(id))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserResponse::from(&user)))
}

/// POST /users/{id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(actor): RequireAdmin,
    Path(id): Path<u64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_directory
        .deactivate(&actor, UserId::new(id))
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserResponse::from(&user)))
}

/// GET /users/profile
///
/// 204 when the session's record cannot be loaded.
pub async fn profile(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
) -> Response {
    match state.user_directory.profile(&actor).await {
        Some(user) => Json(UserResponse::from(&user)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// POST /users/{id}/passwordchange
pub async fn change_password(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
    Json(body): Json<PasswordChangeBody>,
) -> Result<Json<ResponseEnvelope>, ApiError> {
    let request = PasswordChangeRequest {
        old_password: body.old_password,
        new_password: body.new_password,
    };

    state
        .credentials
        .change_password(&actor, UserId::new(id), request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(ResponseEnvelope::success("Password changed")))
}

/// POST /users/{id}/emailchange
pub async fn change_email(
    State(state): State<AppState>,
    RequireActor(actor): RequireActor,
    Path(id): Path<u64>,
    Json(body): Json<EmailChangeBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let request = EmailChangeRequest {
        email: body.email_address,
        password: body.password,
    };

    let user = state
        .credentials
        .change_email(&actor, UserId::new(id), request)
        .await
        .map_err(|e| state.api_error(e))?;

    Ok(Json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_to_criteria() {
        let params = UserSearchParams {
            login_id: Some("ali".to_string()),
            status: Some("ACTIVE, unapproved".to_string()),
            user_role: Some("ROLE_SYS_ADMIN".to_string()),
            sort_by: Some("lastName".to_string()),
            sort_type: Some("desc".to_string()),
            start_index: Some(5),
            page_size: Some(10),
            ..Default::default()
        };

        let criteria = params.into_criteria().unwrap();
        assert_eq!(criteria.login_id.as_deref(), Some("ali"));
        assert_eq!(
            criteria.statuses,
            vec![UserStatus::Active, UserStatus::Unapproved]
        );
        assert_eq!(criteria.roles, vec![UserRole::SysAdmin]);
        assert_eq!(criteria.sort_by, Some(UserSortField::LastName));
        assert_eq!(criteria.sort_order, SortOrder::Desc);
        assert_eq!(criteria.start_index, 5);
        assert_eq!(criteria.page_size, 10);
    }

    #[test]
    fn test_defaults() {
        let criteria = UserSearchParams::default().into_criteria().unwrap();

        assert!(criteria.statuses.is_empty());
        assert_eq!(criteria.sort_by, None);
        assert_eq!(criteria.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_unknown_sort_field() {
        let params = UserSearchParams {
            sort_by: Some("password".to_string()),
            ..Default::default()
        };

        let err = params.into_criteria().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
        assert_eq!(err.field(), Some("sortBy"));
    }

    #[test]
    fn test_unknown_status() {
        let params = UserSearchParams {
            status: Some("ACTIVE,SUSPENDED".to_string()),
            ..Default::default()
        };

        assert!(params.into_criteria().is_err());
    }

    #[test]
    fn test_user_response_hides_password() {
        let user = User::new(
            UserId::new(3),
            "carol",
            "carol@example.com",
            "Carol",
            "$argon2id$secret-hash",
            None,
        );

        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"loginId\":\"carol\""));
        assert!(json.contains("\"status\":\"UNAPPROVED\""));
    }

    #[test]
    fn test_password_body_accepts_legacy_field() {
        let body: PasswordChangeBody =
            serde_json::from_str(r#"{"oldPassword":"a","updPassword":"b"}"#).unwrap();
        assert_eq!(body.new_password, "b");
    }
}

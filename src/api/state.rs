//! Application state for shared services

use std::sync::Arc;

use crate::api::types::ApiError;
use crate::domain::group::{Group, GroupId, GroupQuery, GroupRepository};
use crate::domain::user::{Page, User, UserId, UserRepository, UserRole, UserSearchCriteria};
use crate::domain::{Actor, DomainError, MessageCatalog, ResolvedResource};
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::group::{CreateGroupRequest, GroupService, UpdateGroupRequest};
use crate::infrastructure::materializer::ConfigMaterializer;
use crate::infrastructure::user::{
    CreateUserRequest, CredentialLifecycle, EmailChangeRequest, PasswordChangeRequest,
    PasswordHasher, UpdateUserRequest, UserDirectory,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_directory: Arc<dyn UserDirectoryTrait>,
    pub credentials: Arc<dyn CredentialServiceTrait>,
    pub group_service: Arc<dyn GroupServiceTrait>,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub catalog: Arc<MessageCatalog>,
    pub materializer: Arc<ConfigMaterializer>,
}

impl AppState {
    /// Render a domain error against the process catalog
    pub fn api_error(&self, err: DomainError) -> ApiError {
        ApiError::from_domain(&err, &self.catalog)
    }

    /// Resolve a configuration resource on the blocking pool
    pub async fn resolve_resource(
        &self,
        name: &str,
    ) -> Result<Option<ResolvedResource>, DomainError> {
        let materializer = self.materializer.clone();
        let name = name.to_string();

        tokio::task::spawn_blocking(move || materializer.resolve(&name))
            .await
            .map_err(|e| DomainError::internal(format!("Resource resolution task failed: {}", e)))?
    }
}

/// Trait for user directory operations
#[async_trait::async_trait]
pub trait UserDirectoryTrait: Send + Sync {
    async fn search(
        &self,
        actor: &Actor,
        criteria: &UserSearchCriteria,
    ) -> Result<Page<User>, DomainError>;
    async fn get(&self, actor: &Actor, id: UserId) -> Result<User, DomainError>;
    async fn create(&self, actor: &Actor, request: CreateUserRequest) -> Result<User, DomainError>;
    async fn create_default_account(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<User, DomainError>;
    async fn update(&self, actor: &Actor, request: UpdateUserRequest) -> Result<User, DomainError>;
    async fn set_roles(
        &self,
        actor: &Actor,
        id: UserId,
        roles: Vec<UserRole>,
    ) -> Result<User, DomainError>;
    async fn approve(&self, actor: &Actor, id: UserId) -> Result<User, DomainError>;
    async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<User, DomainError>;
    async fn profile(&self, actor: &Actor) -> Option<User>;
    async fn resolve_actor(&self, id: UserId) -> Result<Actor, DomainError>;
}

/// Trait for credential workflows
#[async_trait::async_trait]
pub trait CredentialServiceTrait: Send + Sync {
    async fn change_password(
        &self,
        actor: &Actor,
        id: UserId,
        request: PasswordChangeRequest,
    ) -> Result<User, DomainError>;
    async fn change_email(
        &self,
        actor: &Actor,
        id: UserId,
        request: EmailChangeRequest,
    ) -> Result<User, DomainError>;
    async fn authenticate(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError>;
}

/// Trait for group operations
#[async_trait::async_trait]
pub trait GroupServiceTrait: Send + Sync {
    async fn create(&self, actor: &Actor, request: CreateGroupRequest)
        -> Result<Group, DomainError>;
    async fn get(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError>;
    async fn list(&self, actor: &Actor, query: &GroupQuery) -> Result<Vec<Group>, DomainError>;
    async fn update(&self, actor: &Actor, request: UpdateGroupRequest)
        -> Result<Group, DomainError>;
    async fn deactivate(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R, H> UserDirectoryTrait for UserDirectory<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn search(
        &self,
        actor: &Actor,
        criteria: &UserSearchCriteria,
    ) -> Result<Page<User>, DomainError> {
        UserDirectory::search(self, actor, criteria).await
    }

    async fn get(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        UserDirectory::get(self, actor, id).await
    }

    async fn create(&self, actor: &Actor, request: CreateUserRequest) -> Result<User, DomainError> {
        UserDirectory::create(self, actor, request).await
    }

    async fn create_default_account(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<User, DomainError> {
        UserDirectory::create_default_account(self, actor, request).await
    }

    async fn update(&self, actor: &Actor, request: UpdateUserRequest) -> Result<User, DomainError> {
        UserDirectory::update(self, actor, request).await
    }

    async fn set_roles(
        &self,
        actor: &Actor,
        id: UserId,
        roles: Vec<UserRole>,
    ) -> Result<User, DomainError> {
        UserDirectory::set_roles(self, actor, id, roles).await
    }

    async fn approve(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        UserDirectory::approve(self, actor, id).await
    }

    async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        UserDirectory::deactivate(self, actor, id).await
    }

    async fn profile(&self, actor: &Actor) -> Option<User> {
        UserDirectory::profile(self, actor).await
    }

    async fn resolve_actor(&self, id: UserId) -> Result<Actor, DomainError> {
        UserDirectory::resolve_actor(self, id).await
    }
}

#[async_trait::async_trait]
impl<R, H> CredentialServiceTrait for CredentialLifecycle<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn change_password(
        &self,
        actor: &Actor,
        id: UserId,
        request: PasswordChangeRequest,
    ) -> Result<User, DomainError> {
        CredentialLifecycle::change_password(self, actor, id, request).await
    }

    async fn change_email(
        &self,
        actor: &Actor,
        id: UserId,
        request: EmailChangeRequest,
    ) -> Result<User, DomainError> {
        CredentialLifecycle::change_email(self, actor, id, request).await
    }

    async fn authenticate(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        CredentialLifecycle::authenticate(self, login_id, password).await
    }
}

#[async_trait::async_trait]
impl<R: GroupRepository + 'static> GroupServiceTrait for GroupService<R> {
    async fn create(
        &self,
        actor: &Actor,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        GroupService::create(self, actor, request).await
    }

    async fn get(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError> {
        GroupService::get(self, actor, id).await
    }

    async fn list(&self, actor: &Actor, query: &GroupQuery) -> Result<Vec<Group>, DomainError> {
        GroupService::list(self, actor, query).await
    }

    async fn update(
        &self,
        actor: &Actor,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError> {
        GroupService::update(self, actor, request).await
    }

    async fn deactivate(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError> {
        GroupService::deactivate(self, actor, id).await
    }
}

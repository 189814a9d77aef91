//! Group service

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::group::{
    validate_description, validate_group_name, Group, GroupId, GroupQuery, GroupRepository,
    GroupSource, GroupType,
};
use crate::domain::{AccessControlGate, Actor, AuditEvent, DomainError, Operation, Target};
use crate::infrastructure::audit::audited;
use crate::infrastructure::timeout::with_timeout;

#[derive(Debug, Clone)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub group_type: GroupType,
    pub group_source: GroupSource,
    pub credential_store_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct UpdateGroupRequest {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub credential_store_id: Option<u64>,
    pub version: Option<u64>,
}

/// Group management, gated like the user directory
#[derive(Debug)]
pub struct GroupService<R: GroupRepository> {
    repository: Arc<R>,
    gate: AccessControlGate,
    timeout: Duration,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(repository: Arc<R>, timeout: Duration) -> Self {
        Self {
            repository,
            gate: AccessControlGate::new(),
            timeout,
        }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        self.gate.require(actor, Operation::Create, Target::Directory)?;

        audited(AuditEvent::CreateGroup, actor, async {
            info!(name = %request.name, "Creating group");

            let description = request.description.clone().unwrap_or_default();
            validate_group_name(&request.name)?;
            validate_description(&description)?;

            let id = with_timeout(self.timeout, "allocate group id", self.repository.next_id())
                .await?;

            let group = Group::new(id, request.name.clone(), description, actor.audit_id())
                .with_type(request.group_type)
                .with_source(request.group_source)
                .with_credential_store(request.credential_store_id);

            with_timeout(self.timeout, "create group", self.repository.create(group)).await
        })
        .await
    }

    pub async fn get(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError> {
        self.gate.require(actor, Operation::Read, Target::Group(id))?;
        self.load(id).await
    }

    /// List groups; requires directory read access
    pub async fn list(&self, actor: &Actor, query: &GroupQuery) -> Result<Vec<Group>, DomainError> {
        self.gate.require(actor, Operation::Read, Target::Directory)?;
        debug!(?query, "Listing groups");

        with_timeout(self.timeout, "list groups", self.repository.list(query)).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        request: UpdateGroupRequest,
    ) -> Result<Group, DomainError> {
        self.gate
            .require(actor, Operation::Update, Target::Group(request.id))?;

        audited(AuditEvent::UpdateGroup, actor, async {
            let mut group = self.load(request.id).await?;

            if request.version.is_some_and(|v| v != group.version()) {
                return Err(DomainError::conflict(format!(
                    "Group '{}' is at version {}",
                    request.id,
                    group.version()
                ))
                .with_object_id(request.id.value()));
            }

            let description = request.description.clone().unwrap_or_default();
            validate_group_name(&request.name)?;
            validate_description(&description)?;

            let expected = group.version();
            group.update(
                request.name.clone(),
                description,
                request.credential_store_id,
                actor.audit_id(),
            );

            self.store(&group, expected).await
        })
        .await
    }

    /// Deactivate a group; repeating it is a no-op
    pub async fn deactivate(&self, actor: &Actor, id: GroupId) -> Result<Group, DomainError> {
        self.gate.require(actor, Operation::Deactivate, Target::Group(id))?;

        audited(AuditEvent::DeactivateGroup, actor, async {
            let mut group = self.load(id).await?;
            let expected = group.version();

            if !group.deactivate(actor.audit_id()) {
                return Ok(group);
            }

            self.store(&group, expected).await
        })
        .await
    }

    async fn load(&self, id: GroupId) -> Result<Group, DomainError> {
        with_timeout(self.timeout, "get group", self.repository.get(id))
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("Group '{}' not found", id))
                    .with_object_id(id.value())
            })
    }

    async fn store(&self, group: &Group, expected_version: u64) -> Result<Group, DomainError> {
        with_timeout(
            self.timeout,
            "update group",
            self.repository.update(group, expected_version),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group::GroupStatus;
    use crate::domain::user::{UserId, UserRole, UserStatus};
    use crate::domain::MessageCode;
    use crate::infrastructure::group::InMemoryGroupRepository;

    fn create_service() -> GroupService<InMemoryGroupRepository> {
        GroupService::new(Arc::new(InMemoryGroupRepository::new()), Duration::from_secs(5))
    }

    fn regular() -> Actor {
        Actor::new(UserId::new(2), "bob", [UserRole::User], UserStatus::Active)
    }

    fn request(name: &str) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            description: Some("Operators".to_string()),
            group_type: GroupType::Internal,
            group_source: GroupSource::Internal,
            credential_store_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_group() {
        let service = create_service();
        let group = service.create(&Actor::system(), request("ops")).await.unwrap();

        assert_eq!(group.name(), "ops");
        assert_eq!(group.status(), GroupStatus::Active);
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let service = create_service();
        let group = service.create(&Actor::system(), request("ops")).await.unwrap();

        let err = service.create(&regular(), request("devs")).await.unwrap_err();
        assert_eq!(err.code(), MessageCode::OperNoPermission);

        let err = service.deactivate(&regular(), group.id()).await.unwrap_err();
        assert_eq!(err.code(), MessageCode::OperNoPermission);

        // Reading a single group is open to any active actor
        assert!(service.get(&regular(), group.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let service = create_service();
        service.create(&Actor::system(), request("ops")).await.unwrap();

        let err = service
            .create(&Actor::system(), request("ops"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorDuplicateObject);
    }

    #[tokio::test]
    async fn test_update_and_stale_version() {
        let service = create_service();
        let group = service.create(&Actor::system(), request("ops")).await.unwrap();

        let update = UpdateGroupRequest {
            id: group.id(),
            name: "operators".to_string(),
            description: None,
            credential_store_id: Some(3),
            version: Some(group.version()),
        };

        let updated = service.update(&Actor::system(), update.clone()).await.unwrap();
        assert_eq!(updated.name(), "operators");
        assert_eq!(updated.description(), "");

        let err = service.update(&Actor::system(), update).await.unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorStaleState);
    }

    #[tokio::test]
    async fn test_deactivate_unknown_and_twice() {
        let service = create_service();

        let err = service
            .deactivate(&Actor::system(), GroupId::new(9))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::DataNotFound);

        let group = service.create(&Actor::system(), request("ops")).await.unwrap();
        let first = service.deactivate(&Actor::system(), group.id()).await.unwrap();
        let second = service.deactivate(&Actor::system(), group.id()).await.unwrap();
        assert_eq!(first.version(), second.version());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let service = create_service();
        let system = Actor::system();
        service.create(&system, request("ops")).await.unwrap();
        let devs = service.create(&system, request("devs")).await.unwrap();
        service.deactivate(&system, devs.id()).await.unwrap();

        let active = service
            .list(&system, &GroupQuery::new().with_status(GroupStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);

        let err = service.list(&regular(), &GroupQuery::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }
}

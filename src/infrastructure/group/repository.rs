//! In-memory group repository

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::group::{Group, GroupId, GroupQuery, GroupRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: Arc<RwLock<BTreeMap<u64, Group>>>,
    last_id: AtomicU64,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken(groups: &BTreeMap<u64, Group>, group: &Group) -> Result<(), DomainError> {
    if groups.values().any(|existing| existing.name_conflicts_with(group)) {
        return Err(DomainError::duplicate(
            "name",
            format!("Group '{}' already exists", group.name()),
        ));
    }

    Ok(())
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn next_id(&self) -> Result<GroupId, DomainError> {
        Ok(GroupId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError> {
        Ok(self.groups.read().await.get(&id.value()).cloned())
    }

    async fn create(&self, group: Group) -> Result<Group, DomainError> {
        let mut groups = self.groups.write().await;

        name_taken(&groups, &group)?;
        groups.insert(group.id().value(), group.clone());

        Ok(group)
    }

    async fn update(&self, group: &Group, expected_version: u64) -> Result<Group, DomainError> {
        let mut groups = self.groups.write().await;
        let id = group.id().value();

        let stored = groups.get(&id).ok_or_else(|| {
            DomainError::not_found(format!("Group '{}' not found", id)).with_object_id(id)
        })?;

        if stored.version() != expected_version {
            return Err(DomainError::conflict(format!(
                "Group '{}' changed since it was read",
                id
            ))
            .with_object_id(id));
        }

        name_taken(&groups, group)?;
        groups.insert(id, group.clone());

        Ok(group.clone())
    }

    async fn list(&self, query: &GroupQuery) -> Result<Vec<Group>, DomainError> {
        let groups = self.groups.read().await;
        Ok(groups.values().filter(|g| query.matches(g)).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::group::{GroupSource, GroupStatus};
    use crate::domain::MessageCode;

    #[tokio::test]
    async fn test_create_and_list() {
        let repo = InMemoryGroupRepository::new();
        let id = repo.next_id().await.unwrap();
        repo.create(Group::new(id, "ops", "", None)).await.unwrap();

        assert_eq!(repo.list(&GroupQuery::new()).await.unwrap().len(), 1);
        assert!(repo.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_name_unique_per_source_among_active() {
        let repo = InMemoryGroupRepository::new();
        repo.create(Group::new(GroupId::new(1), "ops", "", None))
            .await
            .unwrap();

        let err = repo
            .create(Group::new(GroupId::new(2), "ops", "", None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorDuplicateObject);

        repo.create(Group::new(GroupId::new(3), "ops", "", None).with_source(GroupSource::External))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deactivated_name_can_be_reused() {
        let repo = InMemoryGroupRepository::new();
        let mut ops = repo
            .create(Group::new(GroupId::new(1), "ops", "", None))
            .await
            .unwrap();

        ops.deactivate(None);
        repo.update(&ops, 1).await.unwrap();

        repo.create(Group::new(GroupId::new(2), "ops", "", None))
            .await
            .unwrap();

        let active = repo
            .list(&GroupQuery::new().with_status(GroupStatus::Active))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id(), GroupId::new(2));
    }

    #[tokio::test]
    async fn test_stale_update() {
        let repo = InMemoryGroupRepository::new();
        let group = repo
            .create(Group::new(GroupId::new(1), "ops", "", None))
            .await
            .unwrap();

        let mut first = group.clone();
        first.update("ops", "first", None, None);
        repo.update(&first, 1).await.unwrap();

        let mut second = group;
        second.update("ops", "second", None, None);
        let err = repo.update(&second, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }
}

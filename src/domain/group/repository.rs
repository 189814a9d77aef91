//! Group repository trait

use async_trait::async_trait;

use super::entity::{Group, GroupId, GroupSource, GroupStatus};
use crate::domain::DomainError;

/// Query parameters for listing groups
#[derive(Debug, Clone, Default)]
pub struct GroupQuery {
    pub status: Option<GroupStatus>,
    pub source: Option<GroupSource>,
    /// Case-insensitive substring of the group name
    pub name: Option<String>,
}

impl GroupQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: GroupStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: GroupSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn matches(&self, group: &Group) -> bool {
        if self.status.is_some_and(|s| s != group.status()) {
            return false;
        }

        if self.source.is_some_and(|s| s != group.group_source()) {
            return false;
        }

        match &self.name {
            Some(name) => group.name().to_lowercase().contains(&name.to_lowercase()),
            None => true,
        }
    }
}

/// Repository for directory groups
///
/// Names are unique among active groups of the same source.
#[async_trait]
pub trait GroupRepository: Send + Sync + std::fmt::Debug {
    async fn next_id(&self) -> Result<GroupId, DomainError>;

    async fn get(&self, id: GroupId) -> Result<Option<Group>, DomainError>;

    /// Persist a new group, rejecting name collisions
    async fn create(&self, group: Group) -> Result<Group, DomainError>;

    /// Replace a stored group; fails with `Conflict` on a stale version
    async fn update(&self, group: &Group, expected_version: u64) -> Result<Group, DomainError>;

    /// List groups ordered by id
    async fn list(&self, query: &GroupQuery) -> Result<Vec<Group>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_matching() {
        let group = Group::new(GroupId::new(1), "Hadoop-Admins", "", None);

        assert!(GroupQuery::new().matches(&group));
        assert!(GroupQuery::new().with_name("admins").matches(&group));
        assert!(GroupQuery::new().with_status(GroupStatus::Active).matches(&group));
        assert!(!GroupQuery::new()
            .with_status(GroupStatus::Deactivated)
            .matches(&group));
        assert!(!GroupQuery::new()
            .with_source(GroupSource::External)
            .matches(&group));
    }
}

//! Group entity and related types

use serde::{Deserialize, Serialize};

use crate::domain::audit::AuditableRecord;

/// Numeric group identifier, assigned by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(u64);

impl GroupId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    #[default]
    Active,
    Deactivated,
}

impl GroupStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Deactivated => write!(f, "DEACTIVATED"),
        }
    }
}

/// Whether the group is managed here or mirrored from elsewhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupType {
    #[default]
    Internal,
    External,
}

/// Directory the group was sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
    #[default]
    Internal,
    External,
}

/// Directory group
///
/// Equality is identity, as for users.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    id: GroupId,
    name: String,
    description: String,
    status: GroupStatus,
    group_type: GroupType,
    group_source: GroupSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_store_id: Option<u64>,
    audit: AuditableRecord,
}

impl Group {
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: Option<u64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            status: GroupStatus::Active,
            group_type: GroupType::Internal,
            group_source: GroupSource::Internal,
            credential_store_id: None,
            audit: AuditableRecord::new(created_by),
        }
    }

    pub fn with_type(mut self, group_type: GroupType) -> Self {
        self.group_type = group_type;
        self
    }

    pub fn with_source(mut self, source: GroupSource) -> Self {
        self.group_source = source;
        self
    }

    pub fn with_credential_store(mut self, id: Option<u64>) -> Self {
        self.credential_store_id = id;
        self
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> GroupStatus {
        self.status
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn group_source(&self) -> GroupSource {
        self.group_source
    }

    pub fn credential_store_id(&self) -> Option<u64> {
        self.credential_store_id
    }

    pub fn audit(&self) -> &AuditableRecord {
        &self.audit
    }

    pub fn version(&self) -> u64 {
        self.audit.version()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether `other` would collide with this group's name
    pub fn name_conflicts_with(&self, other: &Group) -> bool {
        self.id != other.id
            && self.is_active()
            && other.is_active()
            && self.group_source == other.group_source
            && self.name == other.name
    }

    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        credential_store_id: Option<u64>,
        updated_by: Option<u64>,
    ) {
        self.name = name.into();
        self.description = description.into();
        self.credential_store_id = credential_store_id;
        self.audit.touch(updated_by);
    }

    /// Field-by-field comparison, including audit metadata
    pub fn same_content(&self, other: &Group) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.status == other.status
            && self.group_type == other.group_type
            && self.group_source == other.group_source
            && self.credential_store_id == other.credential_store_id
            && self.audit == other.audit
    }

    /// Returns `false` when the group was already deactivated
    pub fn deactivate(&mut self, updated_by: Option<u64>) -> bool {
        if !self.is_active() {
            return false;
        }

        self.status = GroupStatus::Deactivated;
        self.audit.touch(updated_by);
        true
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Group {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group_defaults() {
        let group = Group::new(GroupId::new(1), "analysts", "Data analysts", Some(7));

        assert!(group.is_active());
        assert_eq!(group.group_type(), GroupType::Internal);
        assert_eq!(group.group_source(), GroupSource::Internal);
        assert_eq!(group.audit().created_by(), Some(7));
        assert_eq!(group.version(), 1);
    }

    #[test]
    fn test_equality_is_keyed_on_id() {
        let a = Group::new(GroupId::new(1), "analysts", "", None);
        let b = Group::new(GroupId::new(2), "analysts", "", None);
        let mut renamed = a.clone();
        renamed.update("auditors", "", None, None);

        assert_ne!(a, b);
        assert_eq!(a, renamed);
        assert!(!a.same_content(&renamed));
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut group = Group::new(GroupId::new(1), "analysts", "", None);

        assert!(group.deactivate(None));
        assert_eq!(group.version(), 2);
        assert!(!group.deactivate(None));
        assert_eq!(group.version(), 2);
    }

    #[test]
    fn test_name_conflicts() {
        let a = Group::new(GroupId::new(1), "ops", "", None);
        let b = Group::new(GroupId::new(2), "ops", "", None);
        let external = Group::new(GroupId::new(3), "ops", "", None).with_source(GroupSource::External);

        assert!(a.name_conflicts_with(&b));
        assert!(!a.name_conflicts_with(&a));
        assert!(!a.name_conflicts_with(&external));

        let mut inactive = b.clone();
        inactive.deactivate(None);
        assert!(!a.name_conflicts_with(&inactive));
    }

    #[test]
    fn test_update_bumps_version() {
        let mut group = Group::new(GroupId::new(1), "ops", "", None);
        group.update("operators", "On-call", Some(4), Some(2));

        assert_eq!(group.name(), "operators");
        assert_eq!(group.credential_store_id(), Some(4));
        assert_eq!(group.version(), 2);
    }
}

//! Audit metadata shared by directory records

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Creation/update metadata embedded in every directory record
///
/// `version` starts at 1 and grows by one on every mutation; repositories use
/// it to reject writes based on a stale read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditableRecord {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_by: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_by: Option<u64>,
    version: u64,
}

impl AuditableRecord {
    pub fn new(created_by: Option<u64>) -> Self {
        let now = Utc::now();

        Self {
            created_at: now,
            updated_at: now,
            created_by,
            updated_by: created_by,
            version: 1,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn created_by(&self) -> Option<u64> {
        self.created_by
    }

    pub fn updated_by(&self) -> Option<u64> {
        self.updated_by
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Record a mutation
    pub fn touch(&mut self, updated_by: Option<u64>) {
        self.updated_at = Utc::now();
        self.updated_by = updated_by;
        self.version += 1;
    }
}

/// Administrative events written to the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    CreateUser,
    CreateDefaultAccount,
    UpdateUser,
    SetUserRoles,
    ApproveUser,
    DeactivateUser,
    ChangePassword,
    ChangeEmail,
    CreateGroup,
    UpdateGroup,
    DeactivateGroup,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::CreateDefaultAccount => "create_default_account",
            Self::UpdateUser => "update_user",
            Self::SetUserRoles => "set_user_roles",
            Self::ApproveUser => "approve_user",
            Self::DeactivateUser => "deactivate_user",
            Self::ChangePassword => "change_password",
            Self::ChangeEmail => "change_email",
            Self::CreateGroup => "create_group",
            Self::UpdateGroup => "update_group",
            Self::DeactivateGroup => "deactivate_group",
        }
    }
}

impl std::fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

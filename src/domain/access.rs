//! Access control gate
//!
//! Answers "can this actor perform this operation on this target" before any
//! directory mutation happens. The check is pure: it reads the actor and the
//! target identity and nothing else.

use std::collections::BTreeSet;

use serde::Serialize;

use super::group::GroupId;
use super::message::MessageCode;
use super::user::{User, UserId, UserRole, UserStatus};
use super::DomainError;

/// Operations the gate knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Read,
    Create,
    Update,
    Deactivate,
    ChangeCredential,
    ChangeRoles,
    Approve,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Deactivate => "DEACTIVATE",
            Self::ChangeCredential => "CHANGE_CREDENTIAL",
            Self::ChangeRoles => "CHANGE_ROLES",
            Self::Approve => "APPROVE",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an operation is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The directory as a whole (create, search)
    Directory,
    User(UserId),
    Group(GroupId),
}

impl Target {
    fn object_id(&self) -> Option<u64> {
        match self {
            Self::Directory => None,
            Self::User(id) => Some(id.value()),
            Self::Group(id) => Some(id.value()),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::User(id) => write!(f, "user {}", id),
            Self::Group(id) => write!(f, "group {}", id),
        }
    }
}

/// Authenticated identity with its resolved roles and status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    user_id: Option<UserId>,
    login_id: String,
    roles: BTreeSet<UserRole>,
    status: UserStatus,
}

impl Actor {
    pub fn new(
        user_id: UserId,
        login_id: impl Into<String>,
        roles: impl IntoIterator<Item = UserRole>,
        status: UserStatus,
    ) -> Self {
        Self {
            user_id: Some(user_id),
            login_id: login_id.into(),
            roles: roles.into_iter().collect(),
            status,
        }
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: Some(user.id()),
            login_id: user.login_id().to_string(),
            roles: user.roles().clone(),
            status: user.status(),
        }
    }

    /// The service itself, used for startup seeding
    pub fn system() -> Self {
        Self {
            user_id: None,
            login_id: "system".to_string(),
            roles: [UserRole::SysAdmin].into_iter().collect(),
            status: UserStatus::Active,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Id recorded in audit metadata
    pub fn audit_id(&self) -> Option<u64> {
        self.user_id.map(|id| id.value())
    }

    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.roles
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&UserRole::SysAdmin)
    }

    pub fn is_self(&self, id: UserId) -> bool {
        self.user_id == Some(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(MessageCode),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Stateless authorization rules
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessControlGate;

impl AccessControlGate {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize(&self, actor: &Actor, operation: Operation, target: Target) -> Decision {
        if actor.status() != UserStatus::Active {
            return Decision::Deny(MessageCode::OperNotAllowedForState);
        }

        if actor.is_admin() {
            return Decision::Allow;
        }

        let allowed = match (operation, target) {
            (Operation::Read, Target::User(_) | Target::Group(_)) => true,
            (Operation::Update | Operation::ChangeCredential, Target::User(id)) => {
                actor.is_self(id)
            }
            _ => false,
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Deny(MessageCode::OperNoPermission)
        }
    }

    /// Like [`authorize`](Self::authorize), turning a denial into an error
    pub fn require(
        &self,
        actor: &Actor,
        operation: Operation,
        target: Target,
    ) -> Result<(), DomainError> {
        match self.authorize(actor, operation, target) {
            Decision::Allow => Ok(()),
            Decision::Deny(code) => {
                let err = DomainError::permission_denied(
                    code,
                    format!(
                        "'{}' may not perform {} on {}",
                        actor.login_id(),
                        operation,
                        target
                    ),
                );

                Err(match target.object_id() {
                    Some(id) => err.with_object_id(id),
                    None => err,
                })
            }
        }
    }
}

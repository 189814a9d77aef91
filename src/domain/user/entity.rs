//! User entity and related types

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::UserValidationError;
use crate::domain::audit::AuditableRecord;

/// Numeric user identifier, assigned by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Created, waiting for administrator approval
    #[default]
    Unapproved,
    /// Approved and able to log in
    Active,
    /// Terminal state
    Deactivated,
}

impl UserStatus {
    /// Check if the user can log in
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether the state machine allows moving from `self` to `target`
    pub fn can_transition_to(&self, target: UserStatus) -> bool {
        matches!(
            (self, target),
            (Self::Unapproved, Self::Active)
                | (Self::Unapproved, Self::Deactivated)
                | (Self::Active, Self::Deactivated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unapproved => "UNAPPROVED",
            Self::Active => "ACTIVE",
            Self::Deactivated => "DEACTIVATED",
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNAPPROVED" => Ok(Self::Unapproved),
            "ACTIVE" => Ok(Self::Active),
            "DEACTIVATED" => Ok(Self::Deactivated),
            _ => Err(UserValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// Named permission group assigned to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "ROLE_SYS_ADMIN")]
    SysAdmin,
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_OTHER")]
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SysAdmin => "ROLE_SYS_ADMIN",
            Self::User => "ROLE_USER",
            Self::Other => "ROLE_OTHER",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ROLE_SYS_ADMIN" => Ok(Self::SysAdmin),
            "ROLE_USER" => Ok(Self::User),
            "ROLE_OTHER" => Ok(Self::Other),
            other => Err(UserValidationError::UnknownRole(other.to_string())),
        }
    }
}

/// Where the account is mastered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserSource {
    #[default]
    Internal,
    External,
}

/// Directory user
///
/// Equality is identity: two values are equal when they carry the same id.
/// Use [`User::same_content`] to compare field by field.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: UserId,
    login_id: String,
    email: String,
    first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_screen_name: Option<String>,
    status: UserStatus,
    roles: BTreeSet<UserRole>,
    user_source: UserSource,
    /// Argon2 PHC string (salt embedded) - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    activated_at: Option<DateTime<Utc>>,
    audit: AuditableRecord,
}

impl User {
    /// Create a new, unapproved user
    pub fn new(
        id: UserId,
        login_id: impl Into<String>,
        email: impl Into<String>,
        first_name: impl Into<String>,
        password_hash: impl Into<String>,
        created_by: Option<u64>,
    ) -> Self {
        Self {
            id,
            login_id: login_id.into(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: None,
            public_screen_name: None,
            status: UserStatus::Unapproved,
            roles: BTreeSet::new(),
            user_source: UserSource::Internal,
            password_hash: password_hash.into(),
            approved_at: None,
            activated_at: None,
            audit: AuditableRecord::new(created_by),
        }
    }

    pub fn with_last_name(mut self, last_name: Option<String>) -> Self {
        self.last_name = last_name;
        self
    }

    pub fn with_public_screen_name(mut self, name: Option<String>) -> Self {
        self.public_screen_name = name;
        self
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = UserRole>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_source(mut self, source: UserSource) -> Self {
        self.user_source = source;
        self
    }

    /// Mark a freshly built user as already approved and active
    ///
    /// Used by the bootstrap path, which bypasses administrator approval.
    pub fn pre_approved(mut self) -> Self {
        let now = Utc::now();
        self.status = UserStatus::Active;
        self.approved_at = Some(now);
        self.activated_at = Some(now);
        self
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn login_id(&self) -> &str {
        &self.login_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn public_screen_name(&self) -> Option<&str> {
        self.public_screen_name.as_deref()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn roles(&self) -> &BTreeSet<UserRole> {
        &self.roles
    }

    pub fn user_source(&self) -> UserSource {
        self.user_source
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// When the account was requested (its creation time)
    pub fn request_date(&self) -> DateTime<Utc> {
        self.audit.created_at()
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    pub fn audit(&self) -> &AuditableRecord {
        &self.audit
    }

    pub fn version(&self) -> u64 {
        self.audit.version()
    }

    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&UserRole::SysAdmin)
    }

    /// Field-by-field comparison, including audit metadata
    pub fn same_content(&self, other: &User) -> bool {
        self.login_id == other.login_id
            && self.email == other.email
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.public_screen_name == other.public_screen_name
            && self.status == other.status
            && self.roles == other.roles
            && self.user_source == other.user_source
            && self.password_hash == other.password_hash
            && self.approved_at == other.approved_at
            && self.activated_at == other.activated_at
            && self.audit == other.audit
    }

    // Mutators

    /// Replace the editable fields of a full-record update
    pub fn update_profile(
        &mut self,
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: Option<String>,
        public_screen_name: Option<String>,
        updated_by: Option<u64>,
    ) {
        self.email = email.into();
        self.first_name = first_name.into();
        self.last_name = last_name;
        self.public_screen_name = public_screen_name;
        self.audit.touch(updated_by);
    }

    pub fn set_email(&mut self, email: impl Into<String>, updated_by: Option<u64>) {
        self.email = email.into();
        self.audit.touch(updated_by);
    }

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>, updated_by: Option<u64>) {
        self.password_hash = password_hash.into();
        self.audit.touch(updated_by);
    }

    /// Replace the whole role set
    pub fn set_roles(&mut self, roles: BTreeSet<UserRole>, updated_by: Option<u64>) {
        self.roles = roles;
        self.audit.touch(updated_by);
    }

    /// Approve a pending account
    pub fn approve(&mut self, updated_by: Option<u64>) -> Result<(), UserValidationError> {
        self.transition(UserStatus::Active, updated_by)?;
        let now = Utc::now();
        self.approved_at = Some(now);
        self.activated_at = Some(now);
        Ok(())
    }

    /// Deactivate the account
    ///
    /// Returns `false` without touching the record when it is already
    /// deactivated.
    pub fn deactivate(&mut self, updated_by: Option<u64>) -> bool {
        if self.status == UserStatus::Deactivated {
            return false;
        }

        self.status = UserStatus::Deactivated;
        self.audit.touch(updated_by);
        true
    }

    fn transition(
        &mut self,
        target: UserStatus,
        updated_by: Option<u64>,
    ) -> Result<(), UserValidationError> {
        if !self.status.can_transition_to(target) {
            return Err(UserValidationError::InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        self.audit.touch(updated_by);
        Ok(())
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId};
use super::search::{Page, UserSearchCriteria};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Users are never deleted. Login id and email (case-insensitive) are unique
/// across every stored user.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Reserve the next user id
    async fn next_id(&self) -> Result<UserId, DomainError>;

    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their login id
    async fn get_by_login_id(&self, login_id: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by email address, ignoring case
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user, rejecting duplicate login ids and emails
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Replace a stored user
    ///
    /// `expected_version` is the version observed when the record was read;
    /// the write fails with `Conflict` if the stored record moved on since.
    async fn update(&self, user: &User, expected_version: u64) -> Result<User, DomainError>;

    /// Filtered, sorted, paged search
    async fn search(&self, criteria: &UserSearchCriteria) -> Result<Page<User>, DomainError>;

    /// Check if a login id is taken
    async fn login_id_exists(&self, login_id: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_login_id(login_id).await?.is_some())
    }
}

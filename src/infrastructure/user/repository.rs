//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{Page, User, UserId, UserRepository, UserSearchCriteria};
use crate::domain::DomainError;

/// Records and their uniqueness indexes, always locked together
#[derive(Debug, Default)]
struct UserTable {
    users: BTreeMap<u64, User>,
    by_login_id: HashMap<String, u64>,
    /// Keyed by lowercased email
    by_email: HashMap<String, u64>,
}

impl UserTable {
    fn insert(&mut self, user: User) {
        let id = user.id().value();
        self.by_login_id.insert(user.login_id().to_string(), id);
        self.by_email.insert(user.email().to_lowercase(), id);
        self.users.insert(id, user);
    }

    fn check_unique(&self, user: &User) -> Result<(), DomainError> {
        let id = user.id().value();

        if self
            .by_login_id
            .get(user.login_id())
            .is_some_and(|owner| *owner != id)
        {
            return Err(DomainError::duplicate(
                "loginId",
                format!("Login id '{}' already exists", user.login_id()),
            ));
        }

        if self
            .by_email
            .get(&user.email().to_lowercase())
            .is_some_and(|owner| *owner != id)
        {
            return Err(DomainError::duplicate(
                "emailAddress",
                format!("Email '{}' already exists", user.email()),
            ));
        }

        Ok(())
    }
}

/// In-memory implementation of UserRepository
///
/// Whole records are replaced under the write lock, so concurrent readers
/// observe either the previous or the next version of a user, never a mix.
#[derive(Debug)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
    last_id: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(UserTable::default())),
            last_id: AtomicU64::new(0),
        }
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();
        let mut last_id = 0;

        for user in users {
            last_id = last_id.max(user.id().value());
            table.insert(user);
        }

        Self {
            table: Arc::new(RwLock::new(table)),
            last_id: AtomicU64::new(last_id),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn next_id(&self) -> Result<UserId, DomainError> {
        Ok(UserId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(&id.value()).cloned())
    }

    async fn get_by_login_id(&self, login_id: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .by_login_id
            .get(login_id)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().value();

        if table.users.contains_key(&id) {
            return Err(DomainError::duplicate(
                "id",
                format!("User with ID '{}' already exists", id),
            ));
        }

        table.check_unique(&user)?;
        table.insert(user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User, expected_version: u64) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().value();

        let stored = table.users.get(&id).ok_or_else(|| {
            DomainError::not_found(format!("User '{}' not found", id)).with_object_id(id)
        })?;

        if stored.version() != expected_version {
            return Err(DomainError::conflict(format!(
                "User '{}' changed since it was read (version {} != {})",
                id,
                stored.version(),
                expected_version
            ))
            .with_object_id(id));
        }

        table.check_unique(user)?;

        let previous_login_id = stored.login_id().to_string();
        let previous_email = stored.email().to_lowercase();

        table.by_login_id.remove(&previous_login_id);
        table.by_email.remove(&previous_email);
        table.insert(user.clone());

        Ok(user.clone())
    }

    async fn search(&self, criteria: &UserSearchCriteria) -> Result<Page<User>, DomainError> {
        let table = self.table.read().await;
        Ok(criteria.apply(table.users.values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{UserRole, UserStatus};
    use crate::domain::MessageCode;
    use std::collections::BTreeSet;

    fn create_test_user(id: u64, login_id: &str) -> User {
        User::new(
            UserId::new(id),
            login_id,
            format!("{}@example.com", login_id),
            "Test",
            "hashed_password",
            None,
        )
    }

    async fn total(repo: &InMemoryUserRepository) -> usize {
        repo.search(&UserSearchCriteria::default())
            .await
            .unwrap()
            .total_count()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user(1, "alice");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.login_id(), "alice");

        let by_login = repo.get_by_login_id("alice").await.unwrap();
        assert!(by_login.is_some());
        assert!(repo.get_by_login_id("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryUserRepository::with_users(vec![create_test_user(10, "seed")]);

        assert_eq!(repo.next_id().await.unwrap(), UserId::new(11));
        assert_eq!(repo.next_id().await.unwrap(), UserId::new(12));
    }

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user(1, "alice")).await.unwrap();

        let found = repo.get_by_email("ALICE@Example.com").await.unwrap();
        assert_eq!(found.unwrap().id(), UserId::new(1));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        let alice = User::new(UserId::new(1), "alice", "a@x.com", "Alice", "h", None);
        let bob = User::new(UserId::new(2), "bob", "A@X.com", "Bob", "h", None);

        repo.create(alice).await.unwrap();

        let err = repo.create(bob).await.unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorDuplicateObject);
        assert_eq!(err.field(), Some("emailAddress"));
        assert_eq!(total(&repo).await, 1);
        assert!(repo.get_by_login_id("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_login_id_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user(1, "alice")).await.unwrap();

        let twin = User::new(UserId::new(2), "alice", "other@x.com", "A", "h", None);
        let err = repo.create(twin).await.unwrap_err();

        assert_eq!(err.field(), Some("loginId"));
        assert_eq!(total(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_update_reindexes_email() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user(1, "alice");
        repo.create(user.clone()).await.unwrap();

        let version = user.version();
        user.set_email("new@example.com", None);
        repo.update(&user, version).await.unwrap();

        assert!(repo.get_by_email("alice@example.com").await.unwrap().is_none());
        assert!(repo.get_by_email("new@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user(1, "alice")).await.unwrap();
        let mut bob = create_test_user(2, "bob");
        repo.create(bob.clone()).await.unwrap();

        let version = bob.version();
        bob.set_email("alice@example.com", None);

        let err = repo.update(&bob, version).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateObject { .. }));

        let stored = repo.get(UserId::new(2)).await.unwrap().unwrap();
        assert_eq!(stored.email(), "bob@example.com");
    }

    #[tokio::test]
    async fn test_update_stale_version() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user(1, "alice");
        repo.create(user.clone()).await.unwrap();

        let mut first = user.clone();
        first.set_email("first@example.com", None);
        repo.update(&first, 1).await.unwrap();

        let mut second = user.clone();
        second.set_email("second@example.com", None);
        let err = repo.update(&second, 1).await.unwrap_err();

        assert_eq!(err.code(), MessageCode::ErrorStaleState);
        assert_eq!(err.object_id(), Some(1));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user(42, "ghost");

        let err = repo.update(&user, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(total(&repo).await, 0);
    }

    #[tokio::test]
    async fn test_search_delegates_to_criteria() {
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user(1, "alice").with_roles([UserRole::SysAdmin]),
            create_test_user(2, "bob"),
        ]);

        let criteria = UserSearchCriteria {
            roles: vec![UserRole::SysAdmin],
            ..Default::default()
        };

        let page = repo.search(&criteria).await.unwrap();
        assert_eq!(page.total_count(), 1);
        assert_eq!(page.items()[0].login_id(), "alice");
    }

    #[tokio::test]
    async fn test_role_replacement_is_atomic_for_readers() {
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![
            create_test_user(1, "alice").with_roles([UserRole::User, UserRole::Other]),
        ]));

        let before: BTreeSet<UserRole> = [UserRole::User, UserRole::Other].into_iter().collect();
        let after: BTreeSet<UserRole> = [UserRole::SysAdmin].into_iter().collect();

        let reader = {
            let repo = repo.clone();
            let (before, after) = (before.clone(), after.clone());
            tokio::spawn(async move {
                for _ in 0..500 {
                    let user = repo.get(UserId::new(1)).await.unwrap().unwrap();
                    assert!(user.roles() == &before || user.roles() == &after);
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut user = repo.get(UserId::new(1)).await.unwrap().unwrap();
        let version = user.version();
        user.set_roles(after.clone(), None);
        repo.update(&user, version).await.unwrap();

        reader.await.unwrap();

        let stored = repo.get(UserId::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.roles(), &after);
        assert_eq!(stored.status(), UserStatus::Unapproved);
    }
}

//! Credential lifecycle: password and email changes, login verification

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::domain::user::{validate_email, validate_password, User, UserId, UserRepository};
use crate::domain::{AccessControlGate, Actor, AuditEvent, DomainError, Operation, Target};
use crate::infrastructure::audit::audited;
use crate::infrastructure::timeout::with_timeout;

use super::password::{hash_blocking, verify_blocking, PasswordHasher};

/// When the current password must accompany a change
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialPolicy {
    /// Old password required for every password change, including admin resets
    pub require_old_password: bool,
    /// Current password required when users change their own email
    pub require_password_for_email_change: bool,
}

#[derive(Clone)]
pub struct PasswordChangeRequest {
    pub old_password: Option<String>,
    pub new_password: String,
}

impl std::fmt::Debug for PasswordChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordChangeRequest")
            .field("old_password", &self.old_password.as_ref().map(|_| "[REDACTED]"))
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone)]
pub struct EmailChangeRequest {
    pub email: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for EmailChangeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailChangeRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Password and email change workflows
///
/// Unknown ids are reported before authorization runs, so a caller probing
/// ids gets `DataNotFound` and a security warning in the log.
#[derive(Debug)]
pub struct CredentialLifecycle<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    gate: AccessControlGate,
    policy: CredentialPolicy,
    timeout: Duration,
    absent_user_hash: OnceCell<String>,
}

/// Verified in place of a stored hash when the login id is unknown
const ABSENT_USER_PASSWORD: &str = "absent-user-password";

impl<R: UserRepository, H: PasswordHasher + 'static> CredentialLifecycle<R, H> {
    pub fn new(
        repository: Arc<R>,
        hasher: Arc<H>,
        policy: CredentialPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            hasher,
            gate: AccessControlGate::new(),
            policy,
            timeout,
            absent_user_hash: OnceCell::new(),
        }
    }

    pub async fn change_password(
        &self,
        actor: &Actor,
        id: UserId,
        request: PasswordChangeRequest,
    ) -> Result<User, DomainError> {
        audited(AuditEvent::ChangePassword, actor, async {
            let mut user = self.load_target(actor, id, "password change").await?;
            self.gate
                .require(actor, Operation::ChangeCredential, Target::User(id))?;

            if self.policy.require_old_password || actor.is_self(id) {
                let old_password = request.old_password.clone().unwrap_or_default();

                if !self.verify(old_password, &user).await? {
                    return Err(DomainError::invalid_password("Old password does not match"));
                }
            }

            validate_password(&request.new_password)?;

            let hash = with_timeout(
                self.timeout,
                "hash password",
                hash_blocking(self.hasher.clone(), request.new_password.clone()),
            )
            .await?;

            let expected = user.version();
            user.set_password_hash(hash, actor.audit_id());

            debug!(user_id = %id, "Password changed");
            self.store(&user, expected).await
        })
        .await
    }

    pub async fn change_email(
        &self,
        actor: &Actor,
        id: UserId,
        request: EmailChangeRequest,
    ) -> Result<User, DomainError> {
        audited(AuditEvent::ChangeEmail, actor, async {
            let mut user = self.load_target(actor, id, "email change").await?;
            self.gate
                .require(actor, Operation::ChangeCredential, Target::User(id))?;

            if self.policy.require_password_for_email_change && actor.is_self(id) {
                let password = request.password.clone().unwrap_or_default();

                if !self.verify(password, &user).await? {
                    return Err(DomainError::invalid_password("Password does not match"));
                }
            }

            validate_email(&request.email)?;

            let owner = with_timeout(
                self.timeout,
                "check email",
                self.repository.get_by_email(&request.email),
            )
            .await?;

            if owner.is_some_and(|other| other.id() != id) {
                return Err(DomainError::duplicate(
                    "emailAddress",
                    format!("Email '{}' already exists", request.email),
                ));
            }

            let expected = user.version();
            user.set_email(request.email.clone(), actor.audit_id());
            self.store(&user, expected).await
        })
        .await
    }

    /// Verify login credentials
    ///
    /// Returns `None` for unknown logins, wrong passwords and accounts that
    /// may not log in. Unknown logins still run one password verification.
    pub async fn authenticate(
        &self,
        login_id: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = with_timeout(
            self.timeout,
            "get user",
            self.repository.get_by_login_id(login_id),
        )
        .await?
        else {
            self.verify_absent(password.to_string()).await?;
            debug!(login_id, "Login for unknown user");
            return Ok(None);
        };

        if !self.verify(password.to_string(), &user).await? {
            warn!(login_id, "SECURITY: failed login attempt");
            return Ok(None);
        }

        if !user.is_active() {
            warn!(login_id, status = %user.status(), "SECURITY: login refused for inactive account");
            return Ok(None);
        }

        Ok(Some(user))
    }

    async fn load_target(
        &self,
        actor: &Actor,
        id: UserId,
        what: &str,
    ) -> Result<User, DomainError> {
        let user = with_timeout(self.timeout, "get user", self.repository.get(id)).await?;

        user.ok_or_else(|| {
            warn!(
                user_id = %id,
                actor = actor.login_id(),
                "SECURITY: {} requested for unknown user",
                what
            );
            DomainError::not_found(format!("User '{}' not found", id)).with_object_id(id.value())
        })
    }

    async fn verify(&self, password: String, user: &User) -> Result<bool, DomainError> {
        with_timeout(
            self.timeout,
            "verify password",
            verify_blocking(
                self.hasher.clone(),
                password,
                user.password_hash().to_string(),
            ),
        )
        .await
    }

    async fn verify_absent(&self, password: String) -> Result<(), DomainError> {
        let hash = self
            .absent_user_hash
            .get_or_try_init(|| {
                with_timeout(
                    self.timeout,
                    "hash password",
                    hash_blocking(self.hasher.clone(), ABSENT_USER_PASSWORD.to_string()),
                )
            })
            .await?;

        with_timeout(
            self.timeout,
            "verify password",
            verify_blocking(self.hasher.clone(), password, hash.clone()),
        )
        .await?;
        Ok(())
    }

    async fn store(&self, user: &User, expected_version: u64) -> Result<User, DomainError> {
        with_timeout(
            self.timeout,
            "update user",
            self.repository.update(user, expected_version),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use crate::domain::MessageCode;
    use crate::infrastructure::user::password::Argon2Hasher;
    use crate::infrastructure::user::repository::InMemoryUserRepository;
    use crate::infrastructure::user::service::tests::{make_request, snapshot};
    use crate::infrastructure::user::UserDirectory;

    struct Fixture {
        directory: UserDirectory<InMemoryUserRepository, Argon2Hasher>,
        credentials: CredentialLifecycle<InMemoryUserRepository, Argon2Hasher>,
        admin: Actor,
    }

    async fn fixture(policy: CredentialPolicy) -> Fixture {
        let repository = Arc::new(InMemoryUserRepository::new());
        let hasher = Arc::new(Argon2Hasher::new());
        let timeout = Duration::from_secs(5);

        let directory = UserDirectory::new(repository.clone(), hasher.clone(), timeout);
        let credentials = CredentialLifecycle::new(repository, hasher, policy, timeout);

        let mut request = make_request("admin", "admin@example.com");
        request.roles = vec![UserRole::SysAdmin];
        let admin = directory
            .create_default_account(&Actor::system(), request)
            .await
            .unwrap();

        Fixture {
            directory,
            credentials,
            admin: Actor::from_user(&admin),
        }
    }

    async fn active(fixture: &Fixture, login_id: &str) -> (User, Actor) {
        let user = fixture
            .directory
            .create(
                &fixture.admin,
                make_request(login_id, &format!("{}@example.com", login_id)),
            )
            .await
            .unwrap();
        let user = fixture
            .directory
            .approve(&fixture.admin, user.id())
            .await
            .unwrap();
        let actor = Actor::from_user(&user);
        (user, actor)
    }

    fn password_change(old: Option<&str>, new: &str) -> PasswordChangeRequest {
        PasswordChangeRequest {
            old_password: old.map(str::to_string),
            new_password: new.to_string(),
        }
    }

    #[tokio::test]
    async fn test_self_service_password_change() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, alice) = active(&f, "alice").await;

        f.credentials
            .change_password(&alice, user.id(), password_change(Some("password123"), "newpass456"))
            .await
            .unwrap();

        assert!(f.credentials.authenticate("alice", "password123").await.unwrap().is_none());
        assert!(f.credentials.authenticate("alice", "newpass456").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_self_service_requires_old_password() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, alice) = active(&f, "alice").await;

        let err = f
            .credentials
            .change_password(&alice, user.id(), password_change(Some("wrongpass1"), "newpass456"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::InvalidPassword);

        let err = f
            .credentials
            .change_password(&alice, user.id(), password_change(None, "newpass456"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::InvalidPassword);
    }

    #[tokio::test]
    async fn test_admin_reset_without_old_password() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, _) = active(&f, "alice").await;

        f.credentials
            .change_password(&f.admin, user.id(), password_change(None, "resetpass9"))
            .await
            .unwrap();

        assert!(f.credentials.authenticate("alice", "resetpass9").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_policy_requires_old_password_for_admin() {
        let f = fixture(CredentialPolicy {
            require_old_password: true,
            ..Default::default()
        })
        .await;
        let (user, _) = active(&f, "alice").await;

        let err = f
            .credentials
            .change_password(&f.admin, user.id(), password_change(None, "resetpass9"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::InvalidPassword);
    }

    #[tokio::test]
    async fn test_unknown_id_reported_before_authorization() {
        let f = fixture(CredentialPolicy::default()).await;
        let (_, alice) = active(&f, "alice").await;
        let before = snapshot(&f.directory, &f.admin).await;

        let err = f
            .credentials
            .change_password(&alice, UserId::new(42), password_change(None, "newpass456"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::DataNotFound);

        let err = f
            .credentials
            .change_email(
                &alice,
                UserId::new(42),
                EmailChangeRequest {
                    email: "x@example.com".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::DataNotFound);

        let after = snapshot(&f.directory, &f.admin).await;
        assert_eq!(after.len(), 2);
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_cannot_change_someone_elses_password() {
        let f = fixture(CredentialPolicy::default()).await;
        let (_, alice) = active(&f, "alice").await;
        let (bob, _) = active(&f, "bob").await;

        let err = f
            .credentials
            .change_password(&alice, bob.id(), password_change(None, "hijacked1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::OperNoPermission);
    }

    #[tokio::test]
    async fn test_weak_new_password_rejected() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, _) = active(&f, "alice").await;

        let err = f
            .credentials
            .change_password(&f.admin, user.id(), password_change(None, "short"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::InvalidPassword);
    }

    #[tokio::test]
    async fn test_change_email() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, alice) = active(&f, "alice").await;

        let updated = f
            .credentials
            .change_email(
                &alice,
                user.id(),
                EmailChangeRequest {
                    email: "alice@corp.example".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email(), "alice@corp.example");
    }

    #[tokio::test]
    async fn test_change_email_conflict_keeps_prior_email() {
        let f = fixture(CredentialPolicy::default()).await;
        let (user, alice) = active(&f, "alice").await;
        active(&f, "bob").await;

        let err = f
            .credentials
            .change_email(
                &alice,
                user.id(),
                EmailChangeRequest {
                    email: "BOB@example.com".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::ErrorDuplicateObject);

        let err = f
            .credentials
            .change_email(
                &alice,
                user.id(),
                EmailChangeRequest {
                    email: "broken".to_string(),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("emailAddress"));

        let stored = f.directory.get(&alice, user.id()).await.unwrap();
        assert_eq!(stored.email(), "alice@example.com");
    }

    #[tokio::test]
    async fn test_email_change_password_policy() {
        let f = fixture(CredentialPolicy {
            require_password_for_email_change: true,
            ..Default::default()
        })
        .await;
        let (user, alice) = active(&f, "alice").await;

        let err = f
            .credentials
            .change_email(
                &alice,
                user.id(),
                EmailChangeRequest {
                    email: "alice@corp.example".to_string(),
                    password: Some("wrongpass1".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), MessageCode::InvalidPassword);

        f.credentials
            .change_email(
                &alice,
                user.id(),
                EmailChangeRequest {
                    email: "alice@corp.example".to_string(),
                    password: Some("password123".to_string()),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unapproved_user_cannot_log_in() {
        let f = fixture(CredentialPolicy::default()).await;
        f.directory
            .create(&f.admin, make_request("pending", "pending@example.com"))
            .await
            .unwrap();

        assert!(f
            .credentials
            .authenticate("pending", "password123")
            .await
            .unwrap()
            .is_none());
        assert!(f
            .credentials
            .authenticate("nobody", "password123")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let debug = format!("{:?}", password_change(Some("oldsecret1"), "newsecret2"));
        assert!(!debug.contains("oldsecret1"));
        assert!(!debug.contains("newsecret2"));

        let debug = format!(
            "{:?}",
            EmailChangeRequest {
                email: "a@x.com".to_string(),
                password: Some("hunter22".to_string()),
            }
        );
        assert!(debug.contains("a@x.com"));
        assert!(!debug.contains("hunter22"));
    }

    #[derive(Debug, Default)]
    struct CountingHasher {
        hashes: std::sync::atomic::AtomicUsize,
        verifies: std::sync::atomic::AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, DomainError> {
            self.hashes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(format!("counted:{}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            self.verifies.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            hash == format!("counted:{}", password)
        }
    }

    #[tokio::test]
    async fn test_unknown_login_still_verifies_a_hash() {
        use std::sync::atomic::Ordering;

        let hasher = Arc::new(CountingHasher::default());
        let credentials = CredentialLifecycle::new(
            Arc::new(InMemoryUserRepository::new()),
            hasher.clone(),
            CredentialPolicy::default(),
            Duration::from_secs(5),
        );

        for _ in 0..2 {
            let result = credentials.authenticate("ghost", "password123").await.unwrap();
            assert!(result.is_none());
        }

        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);

        let result = credentials
            .authenticate("ghost", ABSENT_USER_PASSWORD)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}

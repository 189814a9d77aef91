//! User directory service
//!
//! Every operation runs the access gate before it touches the store, and every
//! store or hasher call is bounded by the configured request timeout.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::user::{
    validate_email, validate_login_id, validate_name, validate_optional_name, validate_password,
    Page, User, UserId, UserRepository, UserRole, UserSearchCriteria, UserSource,
};
use crate::domain::{AccessControlGate, Actor, AuditEvent, DomainError, Operation, Target};
use crate::infrastructure::audit::audited;
use crate::infrastructure::timeout::with_timeout;

use super::password::{hash_blocking, PasswordHasher};

/// Request for creating a new user
#[derive(Clone)]
pub struct CreateUserRequest {
    pub login_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub public_screen_name: Option<String>,
    pub password: String,
    /// Defaults to `ROLE_USER` when empty
    pub roles: Vec<UserRole>,
    pub user_source: UserSource,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("login_id", &self.login_id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("public_screen_name", &self.public_screen_name)
            .field("password", &"[REDACTED]")
            .field("roles", &self.roles)
            .field("user_source", &self.user_source)
            .finish()
    }
}

/// Full-record update of a user's editable fields
#[derive(Debug, Clone)]
pub struct UpdateUserRequest {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub public_screen_name: Option<String>,
    /// Version the client last saw; checked when present
    pub version: Option<u64>,
}

/// User directory: search, lifecycle and role management
#[derive(Debug)]
pub struct UserDirectory<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
    gate: AccessControlGate,
    timeout: Duration,
}

impl<R: UserRepository, H: PasswordHasher + 'static> UserDirectory<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>, timeout: Duration) -> Self {
        Self {
            repository,
            hasher,
            gate: AccessControlGate::new(),
            timeout,
        }
    }

    /// Search the directory (admin only)
    pub async fn search(
        &self,
        actor: &Actor,
        criteria: &UserSearchCriteria,
    ) -> Result<Page<User>, DomainError> {
        self.gate.require(actor, Operation::Read, Target::Directory)?;
        criteria.validate()?;

        debug!(
            start_index = criteria.start_index,
            page_size = criteria.page_size,
            "Searching users"
        );

        with_timeout(self.timeout, "search users", self.repository.search(criteria)).await
    }

    /// Get one user
    pub async fn get(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::Read, Target::User(id))?;
        self.load(id).await
    }

    /// Create a user awaiting approval
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::Create, Target::Directory)?;

        audited(
            AuditEvent::CreateUser,
            actor,
            self.create_record(actor, request, false),
        )
        .await
    }

    /// Create an account that is active immediately, skipping approval
    pub async fn create_default_account(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
    ) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::Create, Target::Directory)?;

        audited(
            AuditEvent::CreateDefaultAccount,
            actor,
            self.create_record(actor, request, true),
        )
        .await
    }

    /// Replace the editable fields of a user
    pub async fn update(
        &self,
        actor: &Actor,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        self.gate
            .require(actor, Operation::Update, Target::User(request.id))?;

        audited(AuditEvent::UpdateUser, actor, async {
            let mut user = self.find(request.id).await?.ok_or_else(|| {
                DomainError::not_found(format!("User '{}' not found", request.id))
                    .with_object_id(request.id.value())
                    .with_detail(format!("{:?}", request))
            })?;

            if let Some(version) = request.version {
                if version != user.version() {
                    return Err(DomainError::conflict(format!(
                        "User '{}' is at version {}, request was based on {}",
                        request.id,
                        user.version(),
                        version
                    ))
                    .with_object_id(request.id.value()));
                }
            }

            validate_email(&request.email)?;
            validate_name("firstName", &request.first_name)?;
            validate_optional_name("lastName", request.last_name.as_deref())?;
            validate_optional_name("publicScreenName", request.public_screen_name.as_deref())?;

            let expected = user.version();
            user.update_profile(
                request.email.clone(),
                request.first_name.clone(),
                request.last_name.clone(),
                request.public_screen_name.clone(),
                actor.audit_id(),
            );

            self.store(&user, expected).await
        })
        .await
    }

    /// Atomically replace a user's role set
    pub async fn set_roles(
        &self,
        actor: &Actor,
        id: UserId,
        roles: Vec<UserRole>,
    ) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::ChangeRoles, Target::User(id))?;

        audited(AuditEvent::SetUserRoles, actor, async {
            let mut user = self.load(id).await?;
            let expected = user.version();

            user.set_roles(roles.into_iter().collect::<BTreeSet<_>>(), actor.audit_id());
            self.store(&user, expected).await
        })
        .await
    }

    /// Approve a pending account
    pub async fn approve(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::Approve, Target::User(id))?;

        audited(AuditEvent::ApproveUser, actor, async {
            let mut user = self.load(id).await?;
            let expected = user.version();

            user.approve(actor.audit_id())?;
            self.store(&user, expected).await
        })
        .await
    }

    /// Deactivate a user; deactivating twice is a successful no-op
    pub async fn deactivate(&self, actor: &Actor, id: UserId) -> Result<User, DomainError> {
        self.gate.require(actor, Operation::Deactivate, Target::User(id))?;

        audited(AuditEvent::DeactivateUser, actor, async {
            let mut user = self.load(id).await?;
            let expected = user.version();

            if !user.deactivate(actor.audit_id()) {
                debug!(user_id = %id, "User already deactivated");
                return Ok(user);
            }

            self.store(&user, expected).await
        })
        .await
    }

    /// The actor's own record
    ///
    /// Lookup failures are logged and reported as "no profile".
    pub async fn profile(&self, actor: &Actor) -> Option<User> {
        let id = actor.user_id()?;

        match self.find(id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(user_id = %id, error = %e, "Failed to load session profile");
                None
            }
        }
    }

    /// Resolve the identity behind a session token
    pub async fn resolve_actor(&self, id: UserId) -> Result<Actor, DomainError> {
        let user = self.load(id).await?;
        Ok(Actor::from_user(&user))
    }

    async fn create_record(
        &self,
        actor: &Actor,
        request: CreateUserRequest,
        pre_approved: bool,
    ) -> Result<User, DomainError> {
        validate_login_id(&request.login_id)?;
        validate_email(&request.email)?;
        validate_name("firstName", &request.first_name)?;
        validate_optional_name("lastName", request.last_name.as_deref())?;
        validate_optional_name("publicScreenName", request.public_screen_name.as_deref())?;
        validate_password(&request.password)?;

        if with_timeout(
            self.timeout,
            "check login id",
            self.repository.login_id_exists(&request.login_id),
        )
        .await?
        {
            return Err(DomainError::duplicate(
                "loginId",
                format!("Login id '{}' already exists", request.login_id),
            ));
        }

        let password_hash = with_timeout(
            self.timeout,
            "hash password",
            hash_blocking(self.hasher.clone(), request.password),
        )
        .await?;

        let id = with_timeout(self.timeout, "allocate user id", self.repository.next_id()).await?;

        let roles = if request.roles.is_empty() {
            vec![UserRole::User]
        } else {
            request.roles
        };

        let mut user = User::new(
            id,
            request.login_id,
            request.email,
            request.first_name,
            password_hash,
            actor.audit_id(),
        )
        .with_last_name(request.last_name)
        .with_public_screen_name(request.public_screen_name)
        .with_roles(roles)
        .with_source(request.user_source);

        if pre_approved {
            user = user.pre_approved();
        }

        with_timeout(self.timeout, "create user", self.repository.create(user)).await
    }

    async fn find(&self, id: UserId) -> Result<Option<User>, DomainError> {
        with_timeout(self.timeout, "get user", self.repository.get(id)).await
    }

    async fn load(&self, id: UserId) -> Result<User, DomainError> {
        self.find(id).await?.ok_or_else(|| {
            DomainError::not_found(format!("User '{}' not found", id)).with_object_id(id.value())
        })
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

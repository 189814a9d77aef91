//! User infrastructure module
//!
//! Argon2 password hashing, the in-memory repository, the user directory
//! service and the credential workflows.

mod credential;
mod password;
mod repository;
mod service;

pub use credential::{
    CredentialLifecycle, CredentialPolicy, EmailChangeRequest, PasswordChangeRequest,
};
pub use password::{hash_blocking, verify_blocking, Argon2Hasher, PasswordHasher};
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdateUserRequest, UserDirectory};

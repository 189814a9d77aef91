//! User domain
//!
//! Directory users, their status state machine, validation rules, search
//! criteria and the repository trait.

mod entity;
mod repository;
mod search;
mod validation;

pub use entity::{User, UserId, UserRole, UserSource, UserStatus};
pub use repository::UserRepository;
pub use search::{
    Page, SortOrder, UserSearchCriteria, UserSortField, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use validation::{
    validate_email, validate_login_id, validate_name, validate_optional_name, validate_password,
    UserValidationError, MAX_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;

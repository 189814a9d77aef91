//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::entity::UserStatus;
use crate::domain::message::MessageCode;
use crate::domain::DomainError;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Login id cannot be empty")]
    EmptyLoginId,

    #[error("Login id exceeds maximum length of {0} characters")]
    LoginIdTooLong(usize),

    #[error("Login id contains invalid character: '{0}'")]
    InvalidLoginIdCharacter(char),

    #[error("Email address cannot be empty")]
    EmptyEmail,

    #[error("Email address exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("{0} cannot be empty")]
    EmptyName(&'static str),

    #[error("{field} exceeds maximum length of {max} characters")]
    NameTooLong { field: &'static str, max: usize },

    #[error("{0} contains invalid characters")]
    InvalidName(&'static str),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Password must contain at least one letter and one digit")]
    WeakPassword,

    #[error("Unknown role: '{0}'")]
    UnknownRole(String),

    #[error("Unknown status: '{0}'")]
    UnknownStatus(String),

    #[error("Cannot move user from {from} to {to}")]
    InvalidTransition { from: UserStatus, to: UserStatus },
}

impl UserValidationError {
    /// Wire name of the field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyLoginId | Self::LoginIdTooLong(_) | Self::InvalidLoginIdCharacter(_) => {
                "loginId"
            }
            Self::EmptyEmail | Self::EmailTooLong(_) | Self::InvalidEmail(_) => "emailAddress",
            Self::EmptyName(field) | Self::InvalidName(field) => *field,
            Self::NameTooLong { field, .. } => *field,
            Self::PasswordTooShort(_) | Self::PasswordTooLong(_) | Self::WeakPassword => {
                "password"
            }
            Self::UnknownRole(_) => "userRoleList",
            Self::UnknownStatus(_) | Self::InvalidTransition { .. } => "status",
        }
    }

    fn code(&self) -> MessageCode {
        match self {
            Self::EmptyLoginId | Self::EmptyEmail | Self::EmptyName(_) => MessageCode::NoInputData,
            Self::LoginIdTooLong(_) | Self::EmailTooLong(_) | Self::NameTooLong { .. } => {
                MessageCode::InputDataOutOfBound
            }
            Self::PasswordTooShort(_) | Self::PasswordTooLong(_) | Self::WeakPassword => {
                MessageCode::InvalidPassword
            }
            Self::InvalidTransition { .. } => MessageCode::OperNotAllowedForState,
            _ => MessageCode::InvalidInputData,
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::invalid_field(err.field(), err.code(), err.to_string())
    }
}

/// Column bound for login ids and names
pub const MAX_NAME_LENGTH: usize = 1024;
const MAX_EMAIL_LENGTH: usize = 512;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}_][\p{L}\p{N} ,._\-+/@=']*$").expect("name pattern is valid")
});

/// Validate a login id
///
/// Rules:
/// - Cannot be empty
/// - Maximum 1024 characters
/// - Alphanumeric characters plus `_ . @ -`
pub fn validate_login_id(login_id: &str) -> Result<(), UserValidationError> {
    if login_id.is_empty() {
        return Err(UserValidationError::EmptyLoginId);
    }

    if login_id.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::LoginIdTooLong(MAX_NAME_LENGTH));
    }

    for c in login_id.chars() {
        if !c.is_alphanumeric() && !matches!(c, '_' | '.' | '@' | '-') {
            return Err(UserValidationError::InvalidLoginIdCharacter(c));
        }
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a personal or display name; `field` is the wire field name
pub fn validate_name(field: &'static str, name: &str) -> Result<(), UserValidationError> {
    if name.trim().is_empty() {
        return Err(UserValidationError::EmptyName(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong {
            field,
            max: MAX_NAME_LENGTH,
        });
    }

    if !NAME_PATTERN.is_match(name) {
        return Err(UserValidationError::InvalidName(field));
    }

    Ok(())
}

/// Validate an optional name, skipping absent values
pub fn validate_optional_name(
    field: &'static str,
    name: Option<&str>,
) -> Result<(), UserValidationError> {
    match name {
        Some(name) => validate_name(field, name),
        None => Ok(()),
    }
}

/// Validate a password
///
/// Rules:
/// - 8 to 128 characters
/// - At least one letter and one digit
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(UserValidationError::WeakPassword);
    }

    Ok(())
}

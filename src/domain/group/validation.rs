//! Group validation utilities

use thiserror::Error;

use crate::domain::message::MessageCode;
use crate::domain::DomainError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GroupValidationError {
    #[error("Group name cannot be empty")]
    EmptyName,

    #[error("Group name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Group name contains invalid character: '{0}'")]
    InvalidNameCharacter(char),

    #[error("Description exceeds maximum length of {0} characters")]
    DescriptionTooLong(usize),
}

impl From<GroupValidationError> for DomainError {
    fn from(err: GroupValidationError) -> Self {
        let (field, code) = match &err {
            GroupValidationError::EmptyName => ("name", MessageCode::NoInputData),
            GroupValidationError::NameTooLong(_) => ("name", MessageCode::InputDataOutOfBound),
            GroupValidationError::InvalidNameCharacter(_) => {
                ("name", MessageCode::InvalidInputData)
            }
            GroupValidationError::DescriptionTooLong(_) => {
                ("description", MessageCode::InputDataOutOfBound)
            }
        };

        DomainError::invalid_field(field, code, err.to_string())
    }
}

pub const MAX_GROUP_NAME_LENGTH: usize = 1024;
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Validate a group name
///
/// Rules:
/// - Cannot be empty
/// - Maximum 1024 characters
/// - No whitespace or control characters
pub fn validate_group_name(name: &str) -> Result<(), GroupValidationError> {
    if name.is_empty() {
        return Err(GroupValidationError::EmptyName);
    }

    if name.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(GroupValidationError::NameTooLong(MAX_GROUP_NAME_LENGTH));
    }

    if let Some(c) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(GroupValidationError::InvalidNameCharacter(c));
    }

    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), GroupValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(GroupValidationError::DescriptionTooLong(
            MAX_DESCRIPTION_LENGTH,
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_names() {
        assert!(validate_group_name("hadoop-admins").is_ok());
        assert!(validate_group_name("CN=ops,OU=groups").is_ok());

        assert_eq!(validate_group_name(""), Err(GroupValidationError::EmptyName));
        assert_eq!(
            validate_group_name("two words"),
            Err(GroupValidationError::InvalidNameCharacter(' '))
        );
        assert_eq!(
            validate_group_name(&"g".repeat(1025)),
            Err(GroupValidationError::NameTooLong(1024))
        );
    }

    #[test]
    fn test_description_bound() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"d".repeat(4000)).is_ok());
        assert!(validate_description(&"d".repeat(4001)).is_err());
    }

    #[test]
    fn test_conversion_to_domain_error() {
        let err: DomainError = GroupValidationError::DescriptionTooLong(4000).into();
        assert_eq!(err.code(), MessageCode::InputDataOutOfBound);
        assert_eq!(err.field(), Some("description"));
    }
}

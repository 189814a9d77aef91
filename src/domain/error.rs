use thiserror::Error;

use super::message::{MessageCatalog, MessageCode, MessageEntry};

/// Core domain errors
///
/// Every variant resolves to a catalog code; `object_id` and `field` bind the
/// resulting entry to what the caller sent.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        object_id: Option<u64>,
        detail: Option<String>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        code: MessageCode,
    },

    #[error("Duplicate object: {message}")]
    DuplicateObject {
        message: String,
        field: Option<String>,
    },

    #[error("Permission denied: {message}")]
    PermissionDenied {
        message: String,
        object_id: Option<u64>,
        code: MessageCode,
    },

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        object_id: Option<u64>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            object_id: None,
            detail: None,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
            code: MessageCode::InvalidInputData,
        }
    }

    /// Invalid value for a named field, reported under a specific code
    pub fn invalid_field(
        field: impl Into<String>,
        code: MessageCode,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
            code,
        }
    }

    pub fn invalid_password(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some("password".to_string()),
            code: MessageCode::InvalidPassword,
        }
    }

    /// Requested transition is not valid from the object's current state
    pub fn not_allowed_for_state(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some("status".to_string()),
            code: MessageCode::OperNotAllowedForState,
        }
    }

    pub fn duplicate(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DuplicateObject {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn permission_denied(code: MessageCode, message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
            object_id: None,
            code,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            object_id: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Bind the error to the object it refers to
    pub fn with_object_id(mut self, id: u64) -> Self {
        match &mut self {
            Self::NotFound { object_id, .. }
            | Self::PermissionDenied { object_id, .. }
            | Self::Conflict { object_id, .. } => *object_id = Some(id),
            _ => {}
        }
        self
    }

    /// Attach a diagnostic detail, such as the payload that was rejected
    pub fn with_detail(mut self, value: impl Into<String>) -> Self {
        if let Self::NotFound { detail, .. } = &mut self {
            *detail = Some(value.into());
        }
        self
    }

    /// Catalog code this error is reported under
    pub fn code(&self) -> MessageCode {
        match self {
            Self::NotFound { .. } => MessageCode::DataNotFound,
            Self::InvalidInput { code, .. } => *code,
            Self::DuplicateObject { .. } => MessageCode::ErrorDuplicateObject,
            Self::PermissionDenied { code, .. } => *code,
            Self::Conflict { .. } => MessageCode::ErrorStaleState,
            Self::Configuration { .. } => MessageCode::ErrorSystem,
            Self::Timeout { .. } => MessageCode::ErrorTimeout,
            Self::Internal { .. } => MessageCode::ErrorSystem,
        }
    }

    pub fn object_id(&self) -> Option<u64> {
        match self {
            Self::NotFound { object_id, .. }
            | Self::PermissionDenied { object_id, .. }
            | Self::Conflict { object_id, .. } => *object_id,
            _ => None,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } | Self::DuplicateObject { field, .. } => {
                field.as_deref()
            }
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::NotFound { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Configuration errors abort resolution outright and are never retried
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Catalog entry bound to this error's object and field
    pub fn message_entry(&self, catalog: &MessageCatalog) -> MessageEntry {
        catalog.get_for(self.code(), self.object_id(), self.field())
    }
}

//! Message catalog
//!
//! A closed set of error and validation codes. Every failure reported by the
//! directory, the credential workflows and the access gate references one of
//! these entries, optionally bound to the object id and field that caused it.

use std::collections::HashMap;

use serde::Serialize;

/// Version of the code set shipped with this build. Adding a code bumps it.
pub const CATALOG_VERSION: u32 = 2;

/// Stable catalog codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageCode {
    // Common errors
    DataNotFound,
    OperNotAllowedForState,
    OperNotAllowedForEntity,
    OperNoPermission,
    DataNotUpdatable,
    ErrorCreatingObject,
    ErrorDuplicateObject,
    ErrorSystem,
    OperNoExport,
    ErrorStaleState,
    ErrorTimeout,

    // Common validations
    InvalidPassword,
    InvalidInputData,
    NoInputData,
    InputDataOutOfBound,
}

impl MessageCode {
    /// Every registered code, in catalog order
    pub const ALL: [MessageCode; 15] = [
        Self::DataNotFound,
        Self::OperNotAllowedForState,
        Self::OperNotAllowedForEntity,
        Self::OperNoPermission,
        Self::DataNotUpdatable,
        Self::ErrorCreatingObject,
        Self::ErrorDuplicateObject,
        Self::ErrorSystem,
        Self::OperNoExport,
        Self::ErrorStaleState,
        Self::ErrorTimeout,
        Self::InvalidPassword,
        Self::InvalidInputData,
        Self::NoInputData,
        Self::InputDataOutOfBound,
    ];

    /// Stable name, as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataNotFound => "DATA_NOT_FOUND",
            Self::OperNotAllowedForState => "OPER_NOT_ALLOWED_FOR_STATE",
            Self::OperNotAllowedForEntity => "OPER_NOT_ALLOWED_FOR_ENTITY",
            Self::OperNoPermission => "OPER_NO_PERMISSION",
            Self::DataNotUpdatable => "DATA_NOT_UPDATABLE",
            Self::ErrorCreatingObject => "ERROR_CREATING_OBJECT",
            Self::ErrorDuplicateObject => "ERROR_DUPLICATE_OBJECT",
            Self::ErrorSystem => "ERROR_SYSTEM",
            Self::OperNoExport => "OPER_NO_EXPORT",
            Self::ErrorStaleState => "ERROR_STALE_STATE",
            Self::ErrorTimeout => "ERROR_TIMEOUT",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidInputData => "INVALID_INPUT_DATA",
            Self::NoInputData => "NO_INPUT_DATA",
            Self::InputDataOutOfBound => "INPUT_DATA_OUT_OF_BOUND",
        }
    }

    /// Resource bundle key
    pub fn rb_key(&self) -> &'static str {
        match self {
            Self::DataNotFound => "xa.error.data_not_found",
            // Both state and entity denials share one bundle key
            Self::OperNotAllowedForState | Self::OperNotAllowedForEntity => {
                "xa.error.oper_not_allowed_for_state"
            }
            Self::OperNoPermission => "xa.error.oper_no_permission",
            Self::DataNotUpdatable => "xa.error.data_not_updatable",
            Self::ErrorCreatingObject => "xa.error.create_object",
            Self::ErrorDuplicateObject => "xa.error.duplicate_object",
            Self::ErrorSystem => "xa.error.system",
            Self::OperNoExport => "xa.error.oper_no_export",
            Self::ErrorStaleState => "xa.error.stale_state",
            Self::ErrorTimeout => "xa.error.timeout",
            Self::InvalidPassword => "xa.validation.invalid_password",
            Self::InvalidInputData => "xa.validation.invalid_input_data",
            Self::NoInputData => "xa.validation.no_input_data",
            Self::InputDataOutOfBound => "xa.validation.data_out_of_bound",
        }
    }

    /// Default human-readable message
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::DataNotFound => "Data not found",
            Self::OperNotAllowedForState => "Operation not allowed in current state",
            Self::OperNotAllowedForEntity => "Operation not allowed for entity",
            Self::OperNoPermission => "User doesn't have permission to perform this operation",
            Self::DataNotUpdatable => "Data not updatable",
            Self::ErrorCreatingObject => "Error creating object",
            Self::ErrorDuplicateObject => "Error creating duplicate object",
            Self::ErrorSystem => "System Error. Please try later.",
            Self::OperNoExport => "repository is disabled",
            Self::ErrorStaleState => "Object was modified by another request",
            Self::ErrorTimeout => "Request did not complete in time",
            Self::InvalidPassword => "Invalid password",
            Self::InvalidInputData => "Invalid input data",
            Self::NoInputData => "Input data is not provided",
            Self::InputDataOutOfBound => "Input data if out of bound",
        }
    }
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable catalog record, optionally bound to an object and field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEntry {
    name: MessageCode,
    rb_key: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    object_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_name: Option<String>,
}

impl MessageEntry {
    fn new(code: MessageCode) -> Self {
        Self {
            name: code,
            rb_key: code.rb_key(),
            message: code.default_message(),
            object_id: None,
            field_name: None,
        }
    }

    pub fn code(&self) -> MessageCode {
        self.name
    }

    pub fn rb_key(&self) -> &str {
        self.rb_key
    }

    pub fn message(&self) -> &str {
        self.message
    }

    pub fn object_id(&self) -> Option<u64> {
        self.object_id
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }
}

/// Process-wide catalog, built once at startup and shared through the
/// application state
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    version: u32,
    entries: HashMap<MessageCode, MessageEntry>,
}

impl MessageCatalog {
    /// Build the catalog with every registered code
    pub fn new() -> Self {
        let entries = MessageCode::ALL
            .iter()
            .map(|code| (*code, MessageEntry::new(*code)))
            .collect();

        Self {
            version: CATALOG_VERSION,
            entries,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unbound entry for a code
    pub fn get(&self, code: MessageCode) -> MessageEntry {
        self.entries
            .get(&code)
            .cloned()
            .unwrap_or_else(|| MessageEntry::new(code))
    }

    /// Entry bound to the object and field an error refers to
    pub fn get_for(
        &self,
        code: MessageCode,
        object_id: Option<u64>,
        field_name: Option<&str>,
    ) -> MessageEntry {
        let mut entry = self.get(code);
        entry.object_id = object_id;
        entry.field_name = field_name.map(str::to_string);
        entry
    }

    /// Look up an entry by its wire name
    pub fn find(&self, name: &str) -> Option<MessageEntry> {
        self.entries
            .values()
            .find(|entry| entry.name.name() == name)
            .cloned()
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_registers_every_code() {
        let catalog = MessageCatalog::new();

        assert_eq!(catalog.len(), MessageCode::ALL.len());
        assert_eq!(catalog.version(), CATALOG_VERSION);

        for code in MessageCode::ALL {
            assert_eq!(catalog.get(code).code(), code);
        }
    }

    #[test]
    fn test_entry_definitions() {
        let catalog = MessageCatalog::new();

        let entry = catalog.get(MessageCode::DataNotFound);
        assert_eq!(entry.rb_key(), "xa.error.data_not_found");
        assert_eq!(entry.message(), "Data not found");
        assert!(entry.object_id().is_none());
        assert!(entry.field_name().is_none());

        let entry = catalog.get(MessageCode::OperNoPermission);
        assert_eq!(entry.rb_key(), "xa.error.oper_no_permission");
    }

    #[test]
    fn test_state_and_entity_share_bundle_key() {
        assert_eq!(
            MessageCode::OperNotAllowedForState.rb_key(),
            MessageCode::OperNotAllowedForEntity.rb_key()
        );
    }

    #[test]
    fn test_bound_entry() {
        let catalog = MessageCatalog::new();
        let entry = catalog.get_for(MessageCode::InvalidInputData, Some(42), Some("emailAddress"));

        assert_eq!(entry.object_id(), Some(42));
        assert_eq!(entry.field_name(), Some("emailAddress"));

        // Binding never alters the registered entry
        assert!(catalog.get(MessageCode::InvalidInputData).object_id().is_none());
    }

    #[test]
    fn test_find_by_name() {
        let catalog = MessageCatalog::new();

        let entry = catalog.find("ERROR_DUPLICATE_OBJECT").unwrap();
        assert_eq!(entry.code(), MessageCode::ErrorDuplicateObject);
        assert!(catalog.find("NO_SUCH_CODE").is_none());
    }

    #[test]
    fn test_entry_serialization() {
        let catalog = MessageCatalog::new();
        let entry = catalog.get_for(MessageCode::DataNotFound, Some(7), None);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["name"], "DATA_NOT_FOUND");
        assert_eq!(json["rbKey"], "xa.error.data_not_found");
        assert_eq!(json["objectId"], 7);
        assert!(json.get("fieldName").is_none());
    }
}

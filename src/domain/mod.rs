//! Domain layer - Core business rules and entities

pub mod access;
pub mod audit;
pub mod error;
pub mod group;
pub mod message;
pub mod resource;
pub mod user;

pub use access::{AccessControlGate, Actor, Decision, Operation, Target};
pub use audit::{AuditEvent, AuditableRecord};
pub use error::DomainError;
pub use group::{
    Group, GroupId, GroupQuery, GroupRepository, GroupSource, GroupStatus, GroupType,
    GroupValidationError,
};
pub use message::{MessageCatalog, MessageCode, MessageEntry, CATALOG_VERSION};
pub use resource::{
    ConfigSource, ConfigurationResource, ResolvedResource, ResourceLocator, ResourceOrigin,
};
pub use user::{
    Page, SortOrder, User, UserId, UserRepository, UserRole, UserSearchCriteria, UserSortField,
    UserSource, UserStatus, UserValidationError,
};

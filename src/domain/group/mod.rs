//! Group domain module

mod entity;
mod repository;
mod validation;

pub use entity::{Group, GroupId, GroupSource, GroupStatus, GroupType};
pub use repository::{GroupQuery, GroupRepository};
pub use validation::{
    validate_description, validate_group_name, GroupValidationError, MAX_DESCRIPTION_LENGTH,
    MAX_GROUP_NAME_LENGTH,
};

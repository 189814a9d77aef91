//! Wire types shared by every endpoint

pub mod error;
pub mod json;
pub mod params;
pub mod response;

pub use error::ApiError;
pub use json::Json;
pub use params::{Path, Query};
pub use response::{ResponseEnvelope, STATUS_ERROR, STATUS_SUCCESS};

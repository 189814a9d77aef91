//! Infrastructure layer - storage, hashing, tokens and resource files

pub mod audit;
pub mod auth;
pub mod group;
pub mod materializer;
pub mod observability;
pub mod timeout;
pub mod user;

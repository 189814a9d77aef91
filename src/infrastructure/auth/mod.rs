//! Authentication infrastructure module
//!
//! Session tokens issued at login and checked on every request.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};

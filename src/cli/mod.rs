//! CLI module for Security Admin
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API
//! - `materialize`: resolve one configuration resource and print it

pub mod materialize;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::observability::init_tracing;

/// Security Admin - user directory and configuration resource service
#[derive(Parser)]
#[command(name = "security-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Resolve a configuration resource and write its contents out
    Materialize(materialize::MaterializeArgs),
}

/// Load `.env` and the layered configuration, then start logging
///
/// A configuration that fails to load falls back to the built-in defaults.
fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config.logging, &config.observability.tracing);

    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load configuration, using defaults");
    }
    if config.auth.uses_default_secret() {
        warn!("SECURITY: session tokens are signed with the default secret");
    }

    config
}

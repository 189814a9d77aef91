use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
///
/// Layered from `config/default`, `config/local` and `SECADMIN__*`
/// environment variables, in that order.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub materializer: MaterializerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Signing secret used when none is configured
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Session token settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,
}

/// Directory service behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Upper bound for each repository or hasher call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Require the old password for every password change, not only self-service
    #[serde(default)]
    pub require_old_password: bool,
    /// Also require the current password when changing an email
    #[serde(default)]
    pub require_password_for_email_change: bool,
    /// Account seeded through the default-account path at startup
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub login_id: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_admin_first_name")]
    pub first_name: String,
}

/// Configuration resource materialization
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MaterializerConfig {
    /// Directories searched for names that are not materialized
    #[serde(default)]
    pub class_path: Vec<PathBuf>,
    /// Where artifacts are written; the system temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Properties registered at startup, keyed by logical resource name
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

/// One logical resource and its properties
///
/// Property keys usually contain dots, so they are carried as values rather
/// than as table keys.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyConfig {
    pub key: String,
    pub value: String,
}

impl ResourceConfig {
    pub fn property_map(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }
}

fn default_jwt_expiration_hours() -> u64 {
    8
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_admin_first_name() -> String {
    "Admin".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            require_old_password: false,
            require_password_for_email_change: false,
            bootstrap_admin: None,
        }
    }
}

impl AuthConfig {
    /// Whether sessions are signed with the built-in secret
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl DirectoryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SECADMIN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, BootstrapAdminConfig, DirectoryConfig, LogFormat, LoggingConfig,
    MaterializerConfig, PropertyConfig, ResourceConfig, ServerConfig, DEFAULT_JWT_SECRET,
};

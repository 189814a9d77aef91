//! Security Admin
//!
//! Administrative back end of a data-platform security manager:
//! - User directory with approval, deactivation and role management
//! - Credential workflows (password and email change, login)
//! - Group registry
//! - Configuration resource materialization for Hadoop-style clients

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::{DirectoryConfig, MaterializerConfig};
use domain::{Actor, MessageCatalog, UserRole, UserSource};
use infrastructure::{
    auth::{JwtConfig, JwtService},
    group::{GroupService, InMemoryGroupRepository},
    materializer::{ClassPathLocator, ConfigMaterializer, InMemoryConfigSource},
    user::{
        Argon2Hasher, CreateUserRequest, CredentialLifecycle, CredentialPolicy,
        InMemoryUserRepository, UserDirectory,
    },
};
use tracing::info;

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let timeout = config.directory.request_timeout();

    // User directory and credential workflows share one store and hasher
    let user_repository = Arc::new(InMemoryUserRepository::new());
    let password_hasher = Arc::new(Argon2Hasher::new());

    let user_directory = Arc::new(UserDirectory::new(
        user_repository.clone(),
        password_hasher.clone(),
        timeout,
    ));

    let policy = CredentialPolicy {
        require_old_password: config.directory.require_old_password,
        require_password_for_email_change: config.directory.require_password_for_email_change,
    };
    let credentials = Arc::new(CredentialLifecycle::new(
        user_repository,
        password_hasher,
        policy,
        timeout,
    ));

    let group_service = Arc::new(GroupService::new(
        Arc::new(InMemoryGroupRepository::new()),
        timeout,
    ));

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        config.auth.jwt_secret.clone(),
        config.auth.jwt_expiration_hours,
    )));

    let catalog = Arc::new(MessageCatalog::new());
    info!(version = catalog.version(), "Message catalog loaded");

    let materializer = Arc::new(create_materializer(&config.materializer));

    seed_bootstrap_admin(user_directory.as_ref(), &config.directory).await?;

    Ok(AppState {
        user_directory,
        credentials,
        group_service,
        jwt_service,
        catalog,
        materializer,
    })
}

/// Build the resource materializer from configuration
pub fn create_materializer(config: &MaterializerConfig) -> ConfigMaterializer {
    let source = InMemoryConfigSource::new();
    for resource in &config.resources {
        source.register_all(&resource.name, resource.property_map());
    }

    info!(
        resources = config.resources.len(),
        class_path_roots = config.class_path.len(),
        "Configuration materializer ready"
    );

    let locator = ClassPathLocator::new(config.class_path.clone());
    let materializer = ConfigMaterializer::new(Arc::new(source), Arc::new(locator));

    match &config.temp_dir {
        Some(dir) => materializer.with_temp_dir(dir),
        None => materializer,
    }
}

/// Create the configured administrator through the default-account path
async fn seed_bootstrap_admin(
    user_directory: &dyn api::state::UserDirectoryTrait,
    config: &DirectoryConfig,
) -> anyhow::Result<()> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(());
    };

    let request = CreateUserRequest {
        login_id: admin.login_id.clone(),
        email: admin.email.clone(),
        first_name: admin.first_name.clone(),
        last_name: None,
        public_screen_name: None,
        password: admin.password.clone(),
        roles: vec![UserRole::SysAdmin],
        user_source: UserSource::Internal,
    };

    let user = user_directory
        .create_default_account(&Actor::system(), request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {}", e))?;

    info!(
        user_id = %user.id(),
        login_id = %user.login_id(),
        "Bootstrap admin account created"
    );

    Ok(())
}

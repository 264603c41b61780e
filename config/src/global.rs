//! # Process-Wide Configuration Holder
//!
//! Convenience layer for bootstrap code that wants one shared manager
//! without threading a handle through every constructor. Dependency
//! injection of a [`ConfigManager`] clone stays the primary pattern; this
//! module exists for binaries and scripts with a single entry point.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::ConfigError;
use crate::manager::{ConfigManager, ConfigOptions};
use crate::types::{AppConfig, Config, DatabaseConfig, RedisConfig};

static GLOBAL: RwLock<Option<ConfigManager>> = RwLock::new(None);

/// Construct and install the shared manager.
///
/// Fails with [`ConfigError::AlreadyInitialized`] when a manager is already
/// installed; call [`reset`] first to replace it. On success the installed
/// manager is returned for immediate use.
pub fn init(options: ConfigOptions) -> Result<ConfigManager, ConfigError> {
    let mut holder = GLOBAL.write();
    if holder.is_some() {
        return Err(ConfigError::AlreadyInitialized);
    }

    let manager = ConfigManager::new(options);
    *holder = Some(manager.clone());
    Ok(manager)
}

/// The shared manager, lazily installing one with default options.
///
/// Takes no options so repeated callers cannot disagree about them; pass
/// options through [`init`] instead.
pub fn instance() -> ConfigManager {
    if let Some(manager) = GLOBAL.read().clone() {
        return manager;
    }

    let mut holder = GLOBAL.write();
    if let Some(manager) = holder.as_ref() {
        return manager.clone();
    }

    info!("Installing default configuration manager");
    let manager = ConfigManager::new(ConfigOptions::default());
    *holder = Some(manager.clone());
    manager
}

/// Clean up and drop the shared manager.
///
/// Idempotent; the next [`instance`] or [`init`] starts fresh.
pub fn reset() {
    let manager = GLOBAL.write().take();
    if let Some(manager) = manager {
        manager.cleanup();
        info!("Global configuration manager reset");
    }
}

/// Shared-manager form of [`ConfigManager::get_config`].
pub fn get_config() -> Result<Arc<Config>, ConfigError> {
    instance().get_config()
}

/// Shared-manager form of [`ConfigManager::get_app_config`].
pub fn get_app_config() -> Result<AppConfig, ConfigError> {
    instance().get_app_config()
}

/// Shared-manager form of [`ConfigManager::get_database_config`].
pub fn get_database_config() -> Result<DatabaseConfig, ConfigError> {
    instance().get_database_config()
}

/// Shared-manager form of [`ConfigManager::get_redis_config`].
pub fn get_redis_config() -> Result<RedisConfig, ConfigError> {
    instance().get_redis_config()
}

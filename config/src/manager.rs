//! # Configuration Manager
//!
//! Lifecycle facade over the configuration pipeline: load and cache the
//! typed [`Config`], expose domain accessors, deliver reload notifications,
//! and own the hot-reload watcher. The manager is an explicitly constructed,
//! cloneable handle; a process-wide holder built on top of it lives in
//! [`crate::global`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::ConfigError;
use crate::file_loader::{config_file_path, load_config_file};
use crate::hot_reload::ConfigWatcher;
use crate::merge::deep_merge;
use crate::secrets::overrides_from_env;
use crate::types::{AppConfig, Config, ConfigDomain, DatabaseConfig, Environment, RedisConfig};
use crate::validator::SchemaValidator;

/// Construction options for [`ConfigManager`]. Unset fields resolve at
/// construction time:
///
/// - `environment`: `MERIDIAN_ENV`, else development
/// - `config_path`: `MERIDIAN_CONFIG_DIR`, else `config`
/// - `enable_hot_reload`: enabled exactly in development
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub environment: Option<Environment>,
    pub config_path: Option<PathBuf>,
    pub enable_hot_reload: Option<bool>,
}

type ReloadCallback = Arc<dyn Fn(&Arc<Config>) -> anyhow::Result<()> + Send + Sync>;

struct ManagerInner {
    environment: Environment,
    config_path: PathBuf,
    hot_reload: bool,
    validator: SchemaValidator,
    current: RwLock<Option<Arc<Config>>>,
    subscribers: Mutex<Vec<ReloadCallback>>,
    watcher: Mutex<Option<ConfigWatcher>>,
}

/// Cloneable handle to one configuration lifecycle.
///
/// All clones share the same cached [`Config`], subscriber list and watcher;
/// services receive a clone at construction and read through it on demand.
#[derive(Clone)]
pub struct ConfigManager {
    inner: Arc<ManagerInner>,
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("environment", &self.inner.environment)
            .field("config_path", &self.inner.config_path)
            .field("hot_reload", &self.inner.hot_reload)
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    /// Resolve `options` and build an unloaded manager.
    ///
    /// Schemas are read from `<config_path>/schemas` immediately; the
    /// environment files are not touched until [`load`](Self::load).
    pub fn new(options: ConfigOptions) -> Self {
        let environment = options.environment.unwrap_or_else(Environment::detect);
        let config_path = options
            .config_path
            .or_else(|| {
                std::env::var("MERIDIAN_CONFIG_DIR")
                    .ok()
                    .filter(|dir| !dir.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from("config"));
        let hot_reload = options
            .enable_hot_reload
            .unwrap_or(environment == Environment::Development);
        let validator = SchemaValidator::new(&config_path.join("schemas"));

        info!(
            "Configuration manager created for {} environment (root: {:?}, hot reload: {})",
            environment, config_path, hot_reload
        );

        Self {
            inner: Arc::new(ManagerInner {
                environment,
                config_path,
                hot_reload,
                validator,
                current: RwLock::new(None),
                subscribers: Mutex::new(Vec::new()),
                watcher: Mutex::new(None),
            }),
        }
    }

    /// Load the configuration for the manager's environment.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Runs the full sourcing pipeline on first call: read the three domain
    /// files, validate each against its schema, overlay secrets from the
    /// process environment, deserialize into the typed [`Config`], cache it,
    /// and arm the hot-reload watcher when enabled. Subsequent calls return
    /// the cached value without touching the filesystem.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use config::{ConfigManager, ConfigOptions, Environment};
    ///
    /// fn main() -> Result<(), config::ConfigError> {
    ///     let manager = ConfigManager::new(ConfigOptions {
    ///         environment: Some(Environment::Development),
    ///         config_path: Some("config".into()),
    ///         enable_hot_reload: Some(false),
    ///     });
    ///     let config = manager.load()?;
    ///     println!("api base url: {}", config.app.api.base_url);
    ///     Ok(())
    /// }
    /// ```
    ///
    /// ## Error Handling
    /// Any sourcing failure (missing file, parse, schema, shape) propagates
    /// and leaves the cache unloaded; no partial or default configuration is
    /// substituted. A watcher that cannot be armed is logged and skipped
    /// rather than failing the load.
    pub fn load(&self) -> Result<Arc<Config>, ConfigError> {
        if let Some(cached) = self.inner.current.read().clone() {
            debug!("Configuration already loaded, returning cached value");
            return Ok(cached);
        }

        let config = Arc::new(self.inner.run_pipeline()?);
        *self.inner.current.write() = Some(Arc::clone(&config));
        info!("Configuration loaded ({} environment)", self.inner.environment);

        if self.inner.hot_reload {
            self.arm_watcher();
        }

        Ok(config)
    }

    /// Re-run the pipeline regardless of the cache.
    ///
    /// On success the cached value is swapped and every subscriber runs with
    /// the new configuration. On failure the previous value stays current
    /// and no subscriber runs.
    pub fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        info!("Reloading configuration ({} environment)", self.inner.environment);
        let config = self.inner.reload()?;

        // A reload can be the first pipeline run since construction or
        // cleanup, so it arms the watcher just like load() does.
        if self.inner.hot_reload && self.inner.watcher.lock().is_none() {
            self.arm_watcher();
        }

        Ok(config)
    }

    /// Cached configuration, loading it first if necessary.
    pub fn get_config(&self) -> Result<Arc<Config>, ConfigError> {
        self.load()
    }

    /// Application domain section, loading first if necessary.
    pub fn get_app_config(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.get_config()?.app.clone())
    }

    /// Database domain section, loading first if necessary.
    pub fn get_database_config(&self) -> Result<DatabaseConfig, ConfigError> {
        Ok(self.get_config()?.database.clone())
    }

    /// Redis domain section, loading first if necessary.
    pub fn get_redis_config(&self) -> Result<RedisConfig, ConfigError> {
        Ok(self.get_config()?.redis.clone())
    }

    /// Register a callback invoked after every successful [`reload`](Self::reload).
    ///
    /// Callbacks run in registration order with the new configuration; an
    /// `Err` is logged and never stops later callbacks. The list lives until
    /// [`cleanup`](Self::cleanup).
    pub fn on_reload(
        &self,
        callback: impl Fn(&Arc<Config>) -> anyhow::Result<()> + Send + Sync + 'static,
    ) {
        self.inner.subscribers.lock().push(Arc::new(callback));
    }

    /// Environment resolved at construction time.
    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    /// Configuration root resolved at construction time.
    pub fn config_path(&self) -> &Path {
        &self.inner.config_path
    }

    /// Whether file watches are armed after a successful load.
    pub fn hot_reload_enabled(&self) -> bool {
        self.inner.hot_reload
    }

    /// Whether a configuration is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.inner.current.read().is_some()
    }

    /// Drop file watches, clear subscribers and clear the cache.
    ///
    /// Idempotent. The manager stays usable: the next [`load`](Self::load)
    /// or [`reload`](Self::reload) re-runs the pipeline and re-arms watches.
    pub fn cleanup(&self) {
        let watcher = self.inner.watcher.lock().take();
        drop(watcher);
        self.inner.subscribers.lock().clear();
        *self.inner.current.write() = None;
        info!("Configuration manager cleaned up");
    }

    fn arm_watcher(&self) {
        let paths: Vec<PathBuf> = ConfigDomain::ALL
            .into_iter()
            .map(|domain| config_file_path(&self.inner.config_path, self.inner.environment, domain))
            .collect();

        let weak = Arc::downgrade(&self.inner);
        let trigger = move || {
            if let Some(inner) = weak.upgrade() {
                inner.reload_from_watch();
            }
        };

        match ConfigWatcher::start(paths, trigger) {
            Ok(watcher) => {
                info!(
                    "Hot reload armed over {} configuration file(s)",
                    watcher.watched_count()
                );
                let previous = self.inner.watcher.lock().replace(watcher);
                drop(previous);
            }
            Err(error) => warn!("Hot reload unavailable: {}", error),
        }
    }
}

impl ManagerInner {
    fn run_pipeline(&self) -> Result<Config, ConfigError> {
        debug!(
            "Running configuration pipeline ({} environment, root {:?})",
            self.environment, self.config_path
        );

        let app_raw = load_config_file(&self.config_path, self.environment, ConfigDomain::App)?;
        let database_raw =
            load_config_file(&self.config_path, self.environment, ConfigDomain::Database)?;
        let redis_raw = load_config_file(&self.config_path, self.environment, ConfigDomain::Redis)?;

        self.validator
            .validate_all(&app_raw, &database_raw, &redis_raw)?;

        // Secrets are read once per pipeline run so all three domains see a
        // consistent snapshot of the process environment.
        let secrets = overrides_from_env();
        let app: AppConfig = merged_domain(ConfigDomain::App, &app_raw, &secrets)?;
        let database: DatabaseConfig = merged_domain(ConfigDomain::Database, &database_raw, &secrets)?;
        let redis: RedisConfig = merged_domain(ConfigDomain::Redis, &redis_raw, &secrets)?;

        Ok(Config {
            app,
            database,
            redis,
        })
    }

    fn reload(&self) -> Result<Arc<Config>, ConfigError> {
        let config = Arc::new(self.run_pipeline()?);
        *self.current.write() = Some(Arc::clone(&config));
        self.notify_subscribers(&config);
        Ok(config)
    }

    /// Watch-triggered path: skipped once `cleanup` has disarmed the watcher,
    /// and never fails the worker on a bad intermediate file state.
    fn reload_from_watch(&self) {
        if self.watcher.lock().is_none() {
            debug!("Ignoring configuration change after cleanup");
            return;
        }

        match self.reload() {
            Ok(_) => info!("Hot reload applied"),
            Err(error) => {
                error!("Hot reload failed, keeping previous configuration: {}", error);
            }
        }
    }

    fn notify_subscribers(&self, config: &Arc<Config>) {
        // Cloned out first so a callback may register further callbacks
        // without deadlocking on the subscriber list.
        let callbacks: Vec<ReloadCallback> = self.subscribers.lock().clone();
        debug!("Notifying {} reload subscriber(s)", callbacks.len());

        for callback in callbacks {
            if let Err(error) = callback.as_ref()(config) {
                error!("Reload subscriber failed: {}", error);
            }
        }
    }
}

fn merged_domain<T: DeserializeOwned>(
    domain: ConfigDomain,
    raw: &Value,
    secrets: &Map<String, Value>,
) -> Result<T, ConfigError> {
    let merged = match secrets.get(domain.as_str()) {
        Some(overlay) => deep_merge(raw, overlay),
        None => raw.clone(),
    };
    serde_json::from_value(merged).map_err(|source| ConfigError::Shape { domain, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_manager_env() {
        unsafe {
            env::remove_var("MERIDIAN_ENV");
            env::remove_var("MERIDIAN_CONFIG_DIR");
        }
    }

    #[test]
    #[serial]
    fn test_explicit_options_beat_environment_variables() {
        clear_manager_env();
        unsafe {
            env::set_var("MERIDIAN_ENV", "production");
            env::set_var("MERIDIAN_CONFIG_DIR", "/etc/meridian");
        }

        let manager = ConfigManager::new(ConfigOptions {
            environment: Some(Environment::Staging),
            config_path: Some(PathBuf::from("custom/config")),
            enable_hot_reload: Some(true),
        });
        assert_eq!(manager.environment(), Environment::Staging);
        assert_eq!(manager.config_path(), Path::new("custom/config"));
        assert!(manager.hot_reload_enabled());

        clear_manager_env();
    }

    #[test]
    #[serial]
    fn test_environment_variables_fill_unset_options() {
        clear_manager_env();
        unsafe {
            env::set_var("MERIDIAN_ENV", "staging");
            env::set_var("MERIDIAN_CONFIG_DIR", "/srv/meridian/config");
        }

        let manager = ConfigManager::new(ConfigOptions::default());
        assert_eq!(manager.environment(), Environment::Staging);
        assert_eq!(manager.config_path(), Path::new("/srv/meridian/config"));
        assert!(!manager.hot_reload_enabled());

        clear_manager_env();
    }

    #[test]
    #[serial]
    fn test_defaults_without_environment_variables() {
        clear_manager_env();

        let manager = ConfigManager::new(ConfigOptions::default());
        assert_eq!(manager.environment(), Environment::Development);
        assert_eq!(manager.config_path(), Path::new("config"));
        assert!(manager.hot_reload_enabled());
        assert!(!manager.is_loaded());
    }

    #[test]
    #[serial]
    fn test_hot_reload_defaults_off_outside_development() {
        clear_manager_env();

        for environment in [Environment::Staging, Environment::Production] {
            let manager = ConfigManager::new(ConfigOptions {
                environment: Some(environment),
                config_path: Some(PathBuf::from("config")),
                enable_hot_reload: None,
            });
            assert!(!manager.hot_reload_enabled());
        }
    }

    #[test]
    #[serial]
    fn test_empty_config_dir_variable_is_ignored() {
        clear_manager_env();
        unsafe { env::set_var("MERIDIAN_CONFIG_DIR", "") };

        let manager = ConfigManager::new(ConfigOptions::default());
        assert_eq!(manager.config_path(), Path::new("config"));

        clear_manager_env();
    }

    #[test]
    fn test_load_failure_leaves_cache_unloaded() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::new(ConfigOptions {
            environment: Some(Environment::Development),
            config_path: Some(dir.path().to_path_buf()),
            enable_hot_reload: Some(false),
        });

        let err = manager.load().unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(!manager.is_loaded());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let manager = ConfigManager::new(ConfigOptions {
            environment: Some(Environment::Production),
            config_path: Some(PathBuf::from("does/not/exist")),
            enable_hot_reload: Some(false),
        });

        manager.cleanup();
        manager.cleanup();
        assert!(!manager.is_loaded());
    }
}

//! # Configuration System
//!
//! Layered configuration loading for the Meridian platform.
//!
//! This crate provides:
//! - Typed configuration structures for the app, database and redis domains
//! - Environment-scoped JSON file loading (`environments/<environment>/`)
//! - JSON Schema validation with exhaustive violation reporting
//! - Secret overlay from process environment variables
//! - Deep-merge precedence (secrets > file values > serde defaults)
//! - Hot reload with debounced filesystem watches
//!
//! # Best Practices
//!
//! - Construct one [`ConfigManager`] per process and inject clones; the
//!   holder in [`global`] is a convenience for single-entry binaries
//! - Treat `Arc<Config>` snapshots as immutable; reloads swap, never mutate
//! - Keep secrets in the process environment, never in the JSON files
//! - Thread-safe configuration access

pub mod error;
pub mod file_loader;
pub mod global;
pub mod hot_reload;
pub mod manager;
pub mod merge;
pub mod secrets;
pub mod types;
pub mod validator;

pub use error::{ConfigError, SchemaViolation};
pub use file_loader::{config_file_path, load_config_file};
pub use global::{get_app_config, get_config, get_database_config, get_redis_config};
pub use hot_reload::ConfigWatcher;
pub use manager::{ConfigManager, ConfigOptions};
pub use merge::deep_merge;
pub use secrets::overrides_from_env;
pub use types::{
    ApiConfig, AppCacheConfig, AppConfig, BackoffType, Config, ConfigDomain, CorsConfig,
    DatabaseConfig, Environment, ExportQueueConfig, FeatureConfig, IndexingConfig,
    JobBackoffConfig, JobOptionsConfig, LogFormat, LogLevel, LoggingConfig, MigrationConfig,
    PaginationConfig, PoolConfig, PubSubConfig, QueryConfig, QueueConfig, QueuesConfig,
    ReadPreference, RedisCacheConfig, RedisConfig, RedisConnectionConfig, RetryStrategyConfig,
    SearchConfig, SecurityConfig, TimestampFormat, UploadConfig, WriteConcernConfig,
};
pub use validator::SchemaValidator;

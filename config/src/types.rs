//! # Configuration Structures
//!
//! Typed configuration for the three Meridian domains (`app`, `database`,
//! `redis`), plus the [`Environment`] and [`ConfigDomain`] selectors.
//!
//! All structures:
//! - Use `serde` with camelCase field names matching the on-disk JSON
//!   documents (`database.connectionString`, `redis.retryStrategy`, ...)
//! - Default every field through a named `default_*` function so partial
//!   documents deserialize into a complete config
//! - Are handed to callers behind `Arc<Config>` and never mutated in place;
//!   reloads replace the whole aggregate

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Deployment stage selector.
///
/// Selects which on-disk subtree of configuration files is read
/// (`environments/<environment>/`). The closed set is part of the contract;
/// anything else is rejected with [`ConfigError::UnknownEnvironment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Environment {
    /// Local development (hot reload defaults on)
    #[default]
    Development,
    /// Pre-production staging
    Staging,
    /// Production (hot reload defaults off)
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Sniff the environment from `MERIDIAN_ENV`.
    ///
    /// Unset or unrecognized values fall back to `Development`; a bad value
    /// is logged rather than raised because the variable is advisory (an
    /// explicit option goes through `FromStr` and does fail).
    pub fn detect() -> Self {
        match std::env::var("MERIDIAN_ENV") {
            Ok(raw) => match raw.parse() {
                Ok(env) => env,
                Err(_) => {
                    tracing::warn!("Ignoring unrecognized MERIDIAN_ENV value: {:?}", raw);
                    Self::Development
                }
            },
            Err(_) => Self::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// One of the three configuration sub-trees, each with its own JSON document
/// and schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigDomain {
    App,
    Database,
    Redis,
}

impl ConfigDomain {
    /// Validation and load order: app first, redis last.
    pub const ALL: [ConfigDomain; 3] = [ConfigDomain::App, ConfigDomain::Database, ConfigDomain::Redis];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Database => "database",
            Self::Redis => "redis",
        }
    }

    /// File name under `environments/<environment>/`.
    pub fn config_file_name(&self) -> &'static str {
        match self {
            Self::App => "app.config.json",
            Self::Database => "database.config.json",
            Self::Redis => "redis.config.json",
        }
    }

    /// File name under `schemas/`.
    pub fn schema_file_name(&self) -> &'static str {
        match self {
            Self::App => "app.schema.json",
            Self::Database => "database.schema.json",
            Self::Redis => "redis.schema.json",
        }
    }
}

impl std::fmt::Display for ConfigDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root configuration aggregate for the Meridian platform.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Aggregates the three domain configurations produced by the load pipeline
/// (file read, schema validation, secret overlay, deep merge, typed
/// deserialization).
///
/// ## Usage
/// ```rust,no_run
/// use config::{ConfigManager, ConfigOptions};
///
/// fn main() -> Result<(), config::ConfigError> {
///     let manager = ConfigManager::new(ConfigOptions::default());
///     let config = manager.load()?;
///     println!("API base URL: {}", config.app.api.base_url);
///     Ok(())
/// }
/// ```
///
/// ## Immutability
/// Callers receive `Arc<Config>` snapshots. A reload never mutates an
/// existing snapshot; it swaps in a fresh aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Application behavior (API, CORS, features, logging, uploads)
    #[serde(default)]
    pub app: AppConfig,

    /// MongoDB-style storage configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis cache / queue / pub-sub configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

// ---------------------------------------------------------------------------
// App domain
// ---------------------------------------------------------------------------

/// Application-level configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Carries the behavioral knobs of the HTTP-facing application layer: API
/// client behavior, CORS policy, feature flags, logging policy, pagination
/// and cache TTLs, upload constraints, and the secret landing sites for
/// signing material and search credentials.
///
/// ## Fields
/// - `api`: timeouts, retries and rate-limit windows
/// - `cors`: allowed origins and credential policy
/// - `features`: boolean feature gates plus concurrency ceiling
/// - `logging`: level/format/timestamp policy
/// - `pagination`: page size bounds
/// - `cache`: application-side TTL tiers
/// - `uploads`: size and MIME constraints
/// - `security`: JWT and webhook signing secrets (secret-sourced)
/// - `search`: external search API credentials (secret-sourced)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub features: FeatureConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub cache: AppCacheConfig,

    #[serde(default)]
    pub uploads: UploadConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// API behavior: base URL, timeout, retries, rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Base URL for the public API
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry attempts for failed requests
    #[serde(default = "default_api_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between retries in milliseconds
    #[serde(default = "default_api_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Rate-limit window in milliseconds
    #[serde(default = "default_api_rate_limit_window_ms")]
    pub rate_limit_window_ms: u64,

    /// Maximum requests per rate-limit window
    #[serde(default = "default_api_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
}

fn default_api_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_timeout_ms() -> u64 {
    30_000
}

fn default_api_retry_attempts() -> u32 {
    3
}

fn default_api_retry_delay_ms() -> u64 {
    1_000
}

fn default_api_rate_limit_window_ms() -> u64 {
    900_000
}

fn default_api_rate_limit_max_requests() -> u32 {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_ms: default_api_timeout_ms(),
            retry_attempts: default_api_retry_attempts(),
            retry_delay_ms: default_api_retry_delay_ms(),
            rate_limit_window_ms: default_api_rate_limit_window_ms(),
            rate_limit_max_requests: default_api_rate_limit_max_requests(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

/// CORS policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorsConfig {
    /// Origins allowed to call the API
    #[serde(default = "default_cors_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Whether credentialed requests are allowed
    #[serde(default = "default_cors_credentials")]
    pub credentials: bool,

    /// Preflight cache lifetime in seconds
    #[serde(default = "default_cors_max_age_secs")]
    pub max_age_secs: u64,
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_cors_credentials() -> bool {
    true
}

fn default_cors_max_age_secs() -> u64 {
    86_400
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_allowed_origins(),
            credentials: default_cors_credentials(),
            max_age_secs: default_cors_max_age_secs(),
        }
    }
}

/// Feature gates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureConfig {
    #[serde(default = "default_feature_webhooks_enabled")]
    pub webhooks_enabled: bool,

    #[serde(default = "default_feature_export_enabled")]
    pub export_enabled: bool,

    #[serde(default = "default_feature_bulk_operations_enabled")]
    pub bulk_operations_enabled: bool,

    #[serde(default = "default_feature_advanced_search_enabled")]
    pub advanced_search_enabled: bool,

    /// Ceiling on concurrently processed requests
    #[serde(default = "default_feature_max_concurrent_requests")]
    pub max_concurrent_requests: u32,

    #[serde(default = "default_feature_debug_mode")]
    pub debug_mode: bool,
}

fn default_feature_webhooks_enabled() -> bool {
    true
}

fn default_feature_export_enabled() -> bool {
    true
}

fn default_feature_bulk_operations_enabled() -> bool {
    true
}

fn default_feature_advanced_search_enabled() -> bool {
    false
}

fn default_feature_max_concurrent_requests() -> u32 {
    10
}

fn default_feature_debug_mode() -> bool {
    false
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            webhooks_enabled: default_feature_webhooks_enabled(),
            export_enabled: default_feature_export_enabled(),
            bulk_operations_enabled: default_feature_bulk_operations_enabled(),
            advanced_search_enabled: default_feature_advanced_search_enabled(),
            max_concurrent_requests: default_feature_max_concurrent_requests(),
            debug_mode: default_feature_debug_mode(),
        }
    }
}

/// Log severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Timestamp rendering in log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum TimestampFormat {
    #[default]
    Iso,
    Epoch,
}

/// Logging policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    /// Pretty-print structured output (development convenience)
    #[serde(default = "default_logging_pretty_print")]
    pub pretty_print: bool,

    #[serde(default)]
    pub timestamp_format: TimestampFormat,

    /// Log one record per handled request
    #[serde(default = "default_logging_request_logging")]
    pub request_logging: bool,

    /// Log slow-path timing measurements
    #[serde(default = "default_logging_performance_logging")]
    pub performance_logging: bool,
}

fn default_logging_pretty_print() -> bool {
    false
}

fn default_logging_request_logging() -> bool {
    true
}

fn default_logging_performance_logging() -> bool {
    false
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            pretty_print: default_logging_pretty_print(),
            timestamp_format: TimestampFormat::default(),
            request_logging: default_logging_request_logging(),
            performance_logging: default_logging_performance_logging(),
        }
    }
}

/// Pagination bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(default = "default_pagination_default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_pagination_max_page_size")]
    pub max_page_size: u32,
}

fn default_pagination_default_page_size() -> u32 {
    20
}

fn default_pagination_max_page_size() -> u32 {
    100
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_pagination_default_page_size(),
            max_page_size: default_pagination_max_page_size(),
        }
    }
}

/// Application-side cache TTL tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppCacheConfig {
    #[serde(default = "default_app_cache_enabled")]
    pub enabled: bool,

    #[serde(default = "default_app_cache_short_ttl_secs")]
    pub short_ttl_secs: u64,

    #[serde(default = "default_app_cache_medium_ttl_secs")]
    pub medium_ttl_secs: u64,

    #[serde(default = "default_app_cache_long_ttl_secs")]
    pub long_ttl_secs: u64,
}

fn default_app_cache_enabled() -> bool {
    true
}

fn default_app_cache_short_ttl_secs() -> u64 {
    60
}

fn default_app_cache_medium_ttl_secs() -> u64 {
    300
}

fn default_app_cache_long_ttl_secs() -> u64 {
    3_600
}

impl Default for AppCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_app_cache_enabled(),
            short_ttl_secs: default_app_cache_short_ttl_secs(),
            medium_ttl_secs: default_app_cache_medium_ttl_secs(),
            long_ttl_secs: default_app_cache_long_ttl_secs(),
        }
    }
}

/// Upload constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_upload_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Accepted MIME types
    #[serde(default = "default_upload_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,

    /// Spool directory for in-flight uploads
    #[serde(default = "default_upload_temp_dir")]
    pub temp_dir: String,
}

fn default_upload_max_file_size_bytes() -> u64 {
    10_485_760
}

fn default_upload_allowed_mime_types() -> Vec<String> {
    vec![
        "image/png".to_string(),
        "image/jpeg".to_string(),
        "application/pdf".to_string(),
    ]
}

fn default_upload_temp_dir() -> String {
    "/tmp/meridian-uploads".to_string()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_upload_max_file_size_bytes(),
            allowed_mime_types: default_upload_allowed_mime_types(),
            temp_dir: default_upload_temp_dir(),
        }
    }
}

/// Signing material. Populated from the process environment
/// (`JWT_SECRET`, `WEBHOOK_SIGNING_SECRET`), never from config files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// Issued-token lifetime in seconds
    #[serde(default = "default_security_token_ttl_secs")]
    pub token_ttl_secs: u64,

    #[serde(default)]
    pub webhook_signing_secret: Option<String>,
}

fn default_security_token_ttl_secs() -> u64 {
    3_600
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_security_token_ttl_secs(),
            webhook_signing_secret: None,
        }
    }
}

/// External search service credentials and namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// API key, secret-sourced (`SEARCH_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Prefix applied to every index name
    #[serde(default = "default_search_index_prefix")]
    pub index_prefix: String,
}

fn default_search_index_prefix() -> String {
    "meridian".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_prefix: default_search_index_prefix(),
        }
    }
}

// ---------------------------------------------------------------------------
// Database domain
// ---------------------------------------------------------------------------

/// Storage-layer configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Carries connection, pooling, durability and query-policy values for the
/// MongoDB-style document store. The values are produced here and consumed
/// by the storage layer; no connection handling happens in this crate.
///
/// ## Fields
/// - `connection_string`: full connection URI, usually secret-sourced
///   (`MONGODB_URI`)
/// - `pool`: sizing and timeout knobs
/// - `read_preference` / `write_concern`: replica-read and durability policy,
///   carried as opaque values
/// - `migrations` / `indexing` / `query`: operational policy defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Connection URI; `MONGODB_URI` overrides any file-sourced value
    #[serde(default)]
    pub connection_string: Option<String>,

    #[serde(default)]
    pub pool: PoolConfig,

    #[serde(default = "default_database_retry_writes")]
    pub retry_writes: bool,

    #[serde(default = "default_database_retry_reads")]
    pub retry_reads: bool,

    #[serde(default)]
    pub read_preference: ReadPreference,

    #[serde(default)]
    pub write_concern: WriteConcernConfig,

    #[serde(default)]
    pub migrations: MigrationConfig,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

fn default_database_retry_writes() -> bool {
    true
}

fn default_database_retry_reads() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            pool: PoolConfig::default(),
            retry_writes: default_database_retry_writes(),
            retry_reads: default_database_retry_reads(),
            read_preference: ReadPreference::default(),
            write_concern: WriteConcernConfig::default(),
            migrations: MigrationConfig::default(),
            indexing: IndexingConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

/// Connection pool sizing and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    #[serde(default = "default_pool_min_size")]
    pub min_size: u32,

    #[serde(default = "default_pool_max_size")]
    pub max_size: u32,

    #[serde(default = "default_pool_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_pool_socket_timeout_ms")]
    pub socket_timeout_ms: u64,

    #[serde(default = "default_pool_server_selection_timeout_ms")]
    pub server_selection_timeout_ms: u64,
}

fn default_pool_min_size() -> u32 {
    2
}

fn default_pool_max_size() -> u32 {
    10
}

fn default_pool_connect_timeout_ms() -> u64 {
    10_000
}

fn default_pool_socket_timeout_ms() -> u64 {
    45_000
}

fn default_pool_server_selection_timeout_ms() -> u64 {
    5_000
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: default_pool_min_size(),
            max_size: default_pool_max_size(),
            connect_timeout_ms: default_pool_connect_timeout_ms(),
            socket_timeout_ms: default_pool_socket_timeout_ms(),
            server_selection_timeout_ms: default_pool_server_selection_timeout_ms(),
        }
    }
}

/// Replica read routing policy, carried as an opaque value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub enum ReadPreference {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

/// Write durability policy, carried as an opaque value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WriteConcernConfig {
    /// Acknowledgment level ("majority", "1", ...)
    #[serde(default = "default_write_concern_w")]
    pub w: String,

    #[serde(default = "default_write_concern_journal")]
    pub journal: bool,

    #[serde(default = "default_write_concern_wtimeout_ms")]
    pub wtimeout_ms: u64,
}

fn default_write_concern_w() -> String {
    "majority".to_string()
}

fn default_write_concern_journal() -> bool {
    true
}

fn default_write_concern_wtimeout_ms() -> u64 {
    5_000
}

impl Default for WriteConcernConfig {
    fn default() -> Self {
        Self {
            w: default_write_concern_w(),
            journal: default_write_concern_journal(),
            wtimeout_ms: default_write_concern_wtimeout_ms(),
        }
    }
}

/// Migration run policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    #[serde(default = "default_migrations_auto_run")]
    pub auto_run: bool,

    #[serde(default = "default_migrations_validate_before_run")]
    pub validate_before_run: bool,

    #[serde(default = "default_migrations_backup_before_migration")]
    pub backup_before_migration: bool,
}

fn default_migrations_auto_run() -> bool {
    false
}

fn default_migrations_validate_before_run() -> bool {
    true
}

fn default_migrations_backup_before_migration() -> bool {
    true
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            auto_run: default_migrations_auto_run(),
            validate_before_run: default_migrations_validate_before_run(),
            backup_before_migration: default_migrations_backup_before_migration(),
        }
    }
}

/// Index creation policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexingConfig {
    #[serde(default = "default_indexing_auto_create")]
    pub auto_create: bool,

    #[serde(default = "default_indexing_background")]
    pub background: bool,
}

fn default_indexing_auto_create() -> bool {
    true
}

fn default_indexing_background() -> bool {
    true
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            auto_create: default_indexing_auto_create(),
            background: default_indexing_background(),
        }
    }
}

/// Query execution defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryConfig {
    /// Server-side execution ceiling in milliseconds
    #[serde(default = "default_query_max_time_ms")]
    pub max_time_ms: u64,

    #[serde(default = "default_query_allow_disk_use")]
    pub allow_disk_use: bool,

    /// Return plain documents instead of tracked instances
    #[serde(default = "default_query_lean")]
    pub lean: bool,
}

fn default_query_max_time_ms() -> u64 {
    30_000
}

fn default_query_allow_disk_use() -> bool {
    false
}

fn default_query_lean() -> bool {
    true
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_time_ms: default_query_max_time_ms(),
            allow_disk_use: default_query_allow_disk_use(),
            lean: default_query_lean(),
        }
    }
}

impl QueryConfig {
    pub fn max_time(&self) -> Duration {
        Duration::from_millis(self.max_time_ms)
    }
}

// ---------------------------------------------------------------------------
// Redis domain
// ---------------------------------------------------------------------------

/// Cache / queue / pub-sub configuration.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Carries connection parameters, retry curves, per-queue job policies,
/// cache TTL tiers and pub-sub buffering for the Redis-backed subsystems.
/// Connection handling itself lives with the consumers.
///
/// ## Fields
/// - `connection`: host/port/db plus socket behavior; the password is
///   secret-sourced (`REDIS_PASSWORD`)
/// - `retry_strategy`: capped exponential reconnect curve
/// - `queues`: shared job defaults plus the named queues (email, webhook,
///   export)
/// - `cache`: TTL table and key-count bounds
/// - `pubsub`: event buffering policy
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisConfig {
    #[serde(default)]
    pub connection: RedisConnectionConfig,

    #[serde(default)]
    pub retry_strategy: RetryStrategyConfig,

    #[serde(default)]
    pub queues: QueuesConfig,

    #[serde(default)]
    pub cache: RedisCacheConfig,

    #[serde(default)]
    pub pubsub: PubSubConfig,
}

/// Connection parameters and socket behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisConnectionConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,

    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Logical database index
    #[serde(default = "default_redis_db")]
    pub db: u32,

    /// Password, secret-sourced (`REDIS_PASSWORD`)
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_redis_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_redis_enable_ready_check")]
    pub enable_ready_check: bool,

    #[serde(default = "default_redis_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_redis_keep_alive_ms")]
    pub keep_alive_ms: u64,

    #[serde(default = "default_redis_reconnect_on_error")]
    pub reconnect_on_error: bool,
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_db() -> u32 {
    0
}

fn default_redis_max_retries() -> u32 {
    3
}

fn default_redis_enable_ready_check() -> bool {
    true
}

fn default_redis_connect_timeout_ms() -> u64 {
    10_000
}

fn default_redis_keep_alive_ms() -> u64 {
    30_000
}

fn default_redis_reconnect_on_error() -> bool {
    true
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            db: default_redis_db(),
            password: None,
            max_retries: default_redis_max_retries(),
            enable_ready_check: default_redis_enable_ready_check(),
            connect_timeout_ms: default_redis_connect_timeout_ms(),
            keep_alive_ms: default_redis_keep_alive_ms(),
            reconnect_on_error: default_redis_reconnect_on_error(),
        }
    }
}

/// Capped exponential reconnect curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryStrategyConfig {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_retry_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_retry_max_attempts() -> u32 {
    10
}

fn default_retry_initial_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    3_000
}

fn default_retry_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryStrategyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            initial_delay_ms: default_retry_initial_delay_ms(),
            max_delay_ms: default_retry_max_delay_ms(),
            backoff_factor: default_retry_backoff_factor(),
        }
    }
}

impl RetryStrategyConfig {
    /// Delay before the given reconnect attempt (1-based), following the
    /// capped exponential curve. Attempt 1 waits `initial_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.backoff_factor.powi(exponent as i32);
        let delay = (self.initial_delay_ms as f64 * factor).min(self.max_delay_ms as f64);
        Duration::from_millis(delay as u64)
    }
}

/// Backoff flavor for failed queue jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum BackoffType {
    Fixed,
    #[default]
    Exponential,
}

/// Backoff policy for failed queue jobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobBackoffConfig {
    #[serde(default)]
    pub backoff_type: BackoffType,

    #[serde(default = "default_job_backoff_delay_ms")]
    pub delay_ms: u64,
}

fn default_job_backoff_delay_ms() -> u64 {
    2_000
}

impl Default for JobBackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::default(),
            delay_ms: default_job_backoff_delay_ms(),
        }
    }
}

/// Defaults applied to every queued job unless the queue overrides them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobOptionsConfig {
    /// Completed jobs retained before removal
    #[serde(default = "default_job_remove_on_complete")]
    pub remove_on_complete: u32,

    /// Failed jobs retained before removal
    #[serde(default = "default_job_remove_on_fail")]
    pub remove_on_fail: u32,

    #[serde(default = "default_job_attempts")]
    pub attempts: u32,

    #[serde(default)]
    pub backoff: JobBackoffConfig,
}

fn default_job_remove_on_complete() -> u32 {
    100
}

fn default_job_remove_on_fail() -> u32 {
    500
}

fn default_job_attempts() -> u32 {
    3
}

impl Default for JobOptionsConfig {
    fn default() -> Self {
        Self {
            remove_on_complete: default_job_remove_on_complete(),
            remove_on_fail: default_job_remove_on_fail(),
            attempts: default_job_attempts(),
            backoff: JobBackoffConfig::default(),
        }
    }
}

/// Per-queue worker policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    #[serde(default = "default_queue_concurrency")]
    pub concurrency: u32,

    #[serde(default = "default_queue_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_queue_rate_limit_duration_ms")]
    pub rate_limit_duration_ms: u64,

    /// Interval between stalled-job sweeps
    #[serde(default = "default_queue_stalled_interval_ms")]
    pub stalled_interval_ms: u64,

    /// Stall detections before a job is failed
    #[serde(default = "default_queue_max_stalled_count")]
    pub max_stalled_count: u32,
}

fn default_queue_concurrency() -> u32 {
    5
}

fn default_queue_rate_limit_max() -> u32 {
    100
}

fn default_queue_rate_limit_duration_ms() -> u64 {
    60_000
}

fn default_queue_stalled_interval_ms() -> u64 {
    30_000
}

fn default_queue_max_stalled_count() -> u32 {
    1
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            concurrency: default_queue_concurrency(),
            rate_limit_max: default_queue_rate_limit_max(),
            rate_limit_duration_ms: default_queue_rate_limit_duration_ms(),
            stalled_interval_ms: default_queue_stalled_interval_ms(),
            max_stalled_count: default_queue_max_stalled_count(),
        }
    }
}

/// Export queue policy: long-running chunked jobs, so it carries a job
/// timeout and a chunk size on top of the shared queue shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportQueueConfig {
    #[serde(default = "default_export_concurrency")]
    pub concurrency: u32,

    #[serde(default = "default_export_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_queue_rate_limit_duration_ms")]
    pub rate_limit_duration_ms: u64,

    #[serde(default = "default_export_stalled_interval_ms")]
    pub stalled_interval_ms: u64,

    #[serde(default = "default_queue_max_stalled_count")]
    pub max_stalled_count: u32,

    /// Hard ceiling on one export job's runtime
    #[serde(default = "default_export_job_timeout_ms")]
    pub job_timeout_ms: u64,

    /// Rows per emitted chunk
    #[serde(default = "default_export_chunk_size")]
    pub chunk_size: u32,
}

fn default_export_concurrency() -> u32 {
    2
}

fn default_export_rate_limit_max() -> u32 {
    10
}

fn default_export_stalled_interval_ms() -> u64 {
    60_000
}

fn default_export_job_timeout_ms() -> u64 {
    300_000
}

fn default_export_chunk_size() -> u32 {
    1_000
}

impl Default for ExportQueueConfig {
    fn default() -> Self {
        Self {
            concurrency: default_export_concurrency(),
            rate_limit_max: default_export_rate_limit_max(),
            rate_limit_duration_ms: default_queue_rate_limit_duration_ms(),
            stalled_interval_ms: default_export_stalled_interval_ms(),
            max_stalled_count: default_queue_max_stalled_count(),
            job_timeout_ms: default_export_job_timeout_ms(),
            chunk_size: default_export_chunk_size(),
        }
    }
}

/// Named queues plus shared job defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueuesConfig {
    #[serde(default)]
    pub default_job_options: JobOptionsConfig,

    #[serde(default)]
    pub email: QueueConfig,

    #[serde(default = "default_webhook_queue")]
    pub webhook: QueueConfig,

    #[serde(default)]
    pub export: ExportQueueConfig,
}

fn default_webhook_queue() -> QueueConfig {
    QueueConfig {
        concurrency: 10,
        rate_limit_max: 200,
        max_stalled_count: 2,
        ..QueueConfig::default()
    }
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            default_job_options: JobOptionsConfig::default(),
            email: QueueConfig::default(),
            webhook: default_webhook_queue(),
            export: ExportQueueConfig::default(),
        }
    }
}

/// Redis-side cache TTL table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisCacheConfig {
    #[serde(default = "default_redis_cache_default_ttl_secs")]
    pub default_ttl_secs: u64,

    #[serde(default = "default_redis_cache_session_ttl_secs")]
    pub session_ttl_secs: u64,

    #[serde(default = "default_redis_cache_api_response_ttl_secs")]
    pub api_response_ttl_secs: u64,

    #[serde(default = "default_redis_cache_search_results_ttl_secs")]
    pub search_results_ttl_secs: u64,

    /// Eviction threshold on tracked key count
    #[serde(default = "default_redis_cache_max_keys")]
    pub max_keys: u64,

    /// Interval between expiry sweeps
    #[serde(default = "default_redis_cache_check_period_secs")]
    pub check_period_secs: u64,
}

fn default_redis_cache_default_ttl_secs() -> u64 {
    300
}

fn default_redis_cache_session_ttl_secs() -> u64 {
    86_400
}

fn default_redis_cache_api_response_ttl_secs() -> u64 {
    60
}

fn default_redis_cache_search_results_ttl_secs() -> u64 {
    600
}

fn default_redis_cache_max_keys() -> u64 {
    10_000
}

fn default_redis_cache_check_period_secs() -> u64 {
    120
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_redis_cache_default_ttl_secs(),
            session_ttl_secs: default_redis_cache_session_ttl_secs(),
            api_response_ttl_secs: default_redis_cache_api_response_ttl_secs(),
            search_results_ttl_secs: default_redis_cache_search_results_ttl_secs(),
            max_keys: default_redis_cache_max_keys(),
            check_period_secs: default_redis_cache_check_period_secs(),
        }
    }
}

/// Pub-sub event buffering policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PubSubConfig {
    #[serde(default = "default_pubsub_enabled")]
    pub enabled: bool,

    /// Events buffered before a forced flush
    #[serde(default = "default_pubsub_buffer_limit")]
    pub buffer_limit: u32,

    #[serde(default = "default_pubsub_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_pubsub_enabled() -> bool {
    true
}

fn default_pubsub_buffer_limit() -> u32 {
    1_000
}

fn default_pubsub_flush_interval_ms() -> u64 {
    50
}

impl Default for PubSubConfig {
    fn default() -> Self {
        Self {
            enabled: default_pubsub_enabled(),
            buffer_limit: default_pubsub_buffer_limit(),
            flush_interval_ms: default_pubsub_flush_interval_ms(),
        }
    }
}

//! # Configuration File Loading
//!
//! Loads one environment-scoped JSON configuration document per domain from
//! `<config_root>/environments/<environment>/<domain>.config.json`.
//!
//! Returns raw `serde_json::Value`s; shape checking is the validator's job,
//! run immediately afterward by the manager.

use crate::error::ConfigError;
use crate::types::{ConfigDomain, Environment};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolved path of one domain's config file for the given environment.
pub fn config_file_path(
    config_root: &Path,
    environment: Environment,
    domain: ConfigDomain,
) -> PathBuf {
    config_root
        .join("environments")
        .join(environment.as_str())
        .join(domain.config_file_name())
}

/// Load one domain's configuration document.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Reads and parses a single environment-scoped JSON configuration file,
/// leaving the result untyped for schema validation.
///
/// ## Usage
/// ```rust,no_run
/// use config::{load_config_file, ConfigDomain, Environment};
/// use std::path::Path;
///
/// fn main() -> Result<(), config::ConfigError> {
///     let raw = load_config_file(
///         Path::new("config"),
///         Environment::Development,
///         ConfigDomain::App,
///     )?;
///     println!("api section present: {}", raw.get("api").is_some());
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// - Missing file: `ConfigError::FileNotFound` naming the resolved path
/// - Present but unreadable file, or unparseable content:
///   `ConfigError::Parse` wrapping the underlying error and naming the file
pub fn load_config_file(
    config_root: &Path,
    environment: Environment,
    domain: ConfigDomain,
) -> Result<Value, ConfigError> {
    let path = config_file_path(config_root, environment, domain);
    debug!("Loading {} configuration from {}", domain, path.display());

    // Only a genuinely absent file is FileNotFound; a path that exists but
    // cannot be read (wrong permissions, a directory) is a Parse failure.
    let contents = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound { path: path.clone() }
        } else {
            ConfigError::Parse {
                path: path.clone(),
                source: serde_json::Error::io(source),
            }
        }
    })?;

    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

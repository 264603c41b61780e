//! # Configuration Errors
//!
//! Error taxonomy for the configuration pipeline. Every sourcing failure
//! (file, parse, schema, shape) is fatal for the `load`/`reload` call that
//! hit it; no partial or default configuration is ever substituted.

use crate::types::ConfigDomain;
use serde::Serialize;
use std::path::PathBuf;

/// A single schema violation inside one configuration document.
///
/// `path` is a JSON Pointer into the offending document (`/pool/maxSize`);
/// the empty string addresses the document root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// JSON Pointer to the offending value.
    pub path: String,

    /// Constraint description from the schema engine.
    pub message: String,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn render_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration pipeline error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment-scoped config file is missing.
    #[error("Configuration file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read or is not valid JSON.
    #[error("Failed to parse configuration file {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The domain's schema document was never registered (missing or broken
    /// at validator construction time), discovered when validating.
    #[error("No schema registered for {} configuration (expected at {})", .domain, .path.display())]
    SchemaMissing { domain: ConfigDomain, path: PathBuf },

    /// The document failed schema validation. The message enumerates every
    /// violation, not just the first.
    #[error("{} configuration failed schema validation ({} violation(s)): {}", .domain, .violations.len(), render_violations(.violations))]
    SchemaValidation {
        domain: ConfigDomain,
        violations: Vec<SchemaViolation>,
    },

    /// The merged document does not deserialize into the typed config.
    /// Reached only by values the schema never saw (secret overlays).
    #[error("Merged {domain} configuration has an unexpected shape: {source}")]
    Shape {
        domain: ConfigDomain,
        #[source]
        source: serde_json::Error,
    },

    /// An environment name outside the closed set.
    #[error("Unknown environment: {0:?} (expected development, staging or production)")]
    UnknownEnvironment(String),

    /// Registering a filesystem watch failed.
    #[error("Failed to watch {}: {}", .path.display(), .source)]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// The process-wide holder already has a manager installed.
    #[error("Configuration manager already initialized; call reset() first")]
    AlreadyInitialized,
}

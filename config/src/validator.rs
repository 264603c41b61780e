//! # Configuration Validation
//!
//! Validates raw configuration documents against the JSON Schema files
//! discovered in the schema directory at construction time.
//!
//! Missing or broken schema files are non-fatal at construction (logged and
//! skipped); validating a domain without a registered schema fails with
//! `SchemaMissing` at validate time. Validation failures carry *every*
//! violation, not just the first.

use crate::error::{ConfigError, SchemaViolation};
use crate::types::ConfigDomain;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Compiled schema validators for the three configuration domains.
pub struct SchemaValidator {
    schema_dir: PathBuf,
    validators: HashMap<ConfigDomain, jsonschema::Validator>,
    last_errors: Mutex<Vec<SchemaViolation>>,
}

impl SchemaValidator {
    /// Scan `schema_dir` and compile whichever of the three expected schema
    /// documents are present.
    ///
    /// # M-CANONICAL-DOCS
    ///
    /// ## Purpose
    /// Builds the validator set once, at manager construction. An absent,
    /// unreadable or uncompilable schema file only logs a warning here; the
    /// failure surfaces later as `SchemaMissing` when that domain is
    /// validated.
    ///
    /// ## Usage
    /// ```rust,no_run
    /// use config::{ConfigDomain, SchemaValidator};
    /// use std::path::Path;
    ///
    /// let validator = SchemaValidator::new(Path::new("config/schemas"));
    /// if !validator.has_schema(ConfigDomain::App) {
    ///     eprintln!("app schema missing, validation will fail");
    /// }
    /// ```
    pub fn new(schema_dir: &Path) -> Self {
        let mut validators = HashMap::new();

        for domain in ConfigDomain::ALL {
            let path = schema_dir.join(domain.schema_file_name());
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Schema for {} not loaded ({}): {}", domain, path.display(), e);
                    continue;
                }
            };

            let schema: Value = match serde_json::from_str(&contents) {
                Ok(schema) => schema,
                Err(e) => {
                    warn!("Schema for {} is not valid JSON ({}): {}", domain, path.display(), e);
                    continue;
                }
            };

            match jsonschema::validator_for(&schema) {
                Ok(compiled) => {
                    debug!("Registered {} schema from {}", domain, path.display());
                    validators.insert(domain, compiled);
                }
                Err(e) => {
                    warn!("Schema for {} failed to compile ({}): {}", domain, path.display(), e);
                }
            }
        }

        Self {
            schema_dir: schema_dir.to_path_buf(),
            validators,
            last_errors: Mutex::new(Vec::new()),
        }
    }

    /// Whether a compiled schema is registered for the domain.
    pub fn has_schema(&self, domain: ConfigDomain) -> bool {
        self.validators.contains_key(&domain)
    }

    /// Validate one raw domain document against its registered schema.
    ///
    /// Fails with `SchemaMissing` when the domain has no registered schema
    /// and with `SchemaValidation` carrying the full violation list when the
    /// document does not conform.
    pub fn validate(&self, domain: ConfigDomain, value: &Value) -> Result<(), ConfigError> {
        let Some(validator) = self.validators.get(&domain) else {
            return Err(ConfigError::SchemaMissing {
                domain,
                path: self.schema_dir.join(domain.schema_file_name()),
            });
        };

        let violations: Vec<SchemaViolation> = validator
            .iter_errors(value)
            .map(|error| SchemaViolation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        *self.last_errors.lock() = violations.clone();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::SchemaValidation { domain, violations })
        }
    }

    pub fn validate_app(&self, value: &Value) -> Result<(), ConfigError> {
        self.validate(ConfigDomain::App, value)
    }

    pub fn validate_database(&self, value: &Value) -> Result<(), ConfigError> {
        self.validate(ConfigDomain::Database, value)
    }

    pub fn validate_redis(&self, value: &Value) -> Result<(), ConfigError> {
        self.validate(ConfigDomain::Redis, value)
    }

    /// Validate all three documents, failing fast in the order
    /// app -> database -> redis.
    pub fn validate_all(
        &self,
        app: &Value,
        database: &Value,
        redis: &Value,
    ) -> Result<(), ConfigError> {
        self.validate_app(app)?;
        self.validate_database(database)?;
        self.validate_redis(redis)?;
        Ok(())
    }

    /// Violations from the most recent validation run (empty after a pass).
    pub fn last_errors(&self) -> Vec<SchemaViolation> {
        self.last_errors.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_schema(dir: &Path, file_name: &str, schema: &Value) {
        fs::write(dir.join(file_name), serde_json::to_string_pretty(schema).unwrap()).unwrap();
    }

    fn app_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["api", "pagination"],
            "properties": {
                "api": {
                    "type": "object",
                    "properties": {
                        "timeoutMs": { "type": "integer", "minimum": 1 }
                    }
                },
                "pagination": {
                    "type": "object",
                    "properties": {
                        "maxPageSize": { "type": "integer" }
                    }
                }
            }
        })
    }

    #[test]
    fn test_empty_schema_dir_registers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let validator = SchemaValidator::new(dir.path());

        assert!(!validator.has_schema(ConfigDomain::App));
        let result = validator.validate_app(&json!({}));
        match result {
            Err(ConfigError::SchemaMissing { domain, path }) => {
                assert_eq!(domain, ConfigDomain::App);
                assert!(path.ends_with("app.schema.json"));
            }
            other => panic!("Expected SchemaMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_document_passes() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "app.schema.json", &app_schema());
        let validator = SchemaValidator::new(dir.path());

        let document = json!({
            "api": { "timeoutMs": 5000 },
            "pagination": { "maxPageSize": 100 }
        });
        validator.validate_app(&document).unwrap();
        assert!(validator.last_errors().is_empty());
    }

    #[test]
    fn test_all_violations_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(
            dir.path(),
            "app.schema.json",
            &json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "required": ["api", "pagination", "cors"],
                "properties": {
                    "api": {
                        "type": "object",
                        "properties": {
                            "timeoutMs": { "type": "integer" }
                        }
                    }
                }
            }),
        );
        let validator = SchemaValidator::new(dir.path());

        // Two missing required properties plus one type mismatch.
        let document = json!({ "api": { "timeoutMs": "not-a-number" } });
        let err = validator.validate_app(&document).unwrap_err();
        match err {
            ConfigError::SchemaValidation { domain, violations } => {
                assert_eq!(domain, ConfigDomain::App);
                assert_eq!(violations.len(), 3);
                assert_eq!(validator.last_errors().len(), 3);
                let message = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                assert!(message.contains("pagination"));
                assert!(message.contains("cors"));
                assert!(message.contains("/api/timeoutMs"));
            }
            other => panic!("Expected SchemaValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_schema_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("database.schema.json"), "{not json").unwrap();
        let validator = SchemaValidator::new(dir.path());

        assert!(!validator.has_schema(ConfigDomain::Database));
        assert!(matches!(
            validator.validate_database(&json!({})),
            Err(ConfigError::SchemaMissing { .. })
        ));
    }

    #[test]
    fn test_validate_all_fails_fast_in_domain_order() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "app.schema.json", &app_schema());
        write_schema(
            dir.path(),
            "database.schema.json",
            &json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "required": ["pool"]
            }),
        );
        write_schema(
            dir.path(),
            "redis.schema.json",
            &json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object"
            }),
        );
        let validator = SchemaValidator::new(dir.path());

        // Both app and database documents are invalid; app must win.
        let err = validator
            .validate_all(&json!({}), &json!({}), &json!({}))
            .unwrap_err();
        match err {
            ConfigError::SchemaValidation { domain, .. } => assert_eq!(domain, ConfigDomain::App),
            other => panic!("Expected SchemaValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_last_errors_reset_after_pass() {
        let dir = tempfile::tempdir().unwrap();
        write_schema(dir.path(), "app.schema.json", &app_schema());
        let validator = SchemaValidator::new(dir.path());

        assert!(validator.validate_app(&json!({})).is_err());
        assert!(!validator.last_errors().is_empty());

        let document = json!({
            "api": {},
            "pagination": {}
        });
        validator.validate_app(&document).unwrap();
        assert!(validator.last_errors().is_empty());
    }
}

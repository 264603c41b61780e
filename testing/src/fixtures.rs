use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Throwaway configuration tree rooted in a tempdir.
///
/// Layout mirrors a deployed config directory:
///
/// ```text
/// <root>/
///   schemas/{app,database,redis}.schema.json
///   environments/<environment>/{app,database,redis}.config.json
/// ```
pub struct ConfigFixture {
    dir: TempDir,
}

impl ConfigFixture {
    /// Tree with the three schemas and a fully populated development
    /// environment.
    pub fn new() -> Self {
        let fixture = Self::empty();
        fixture.write_schemas();
        fixture.write_environment("development");
        fixture
    }

    /// Bare tempdir with no configuration files at all.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create fixture directory"),
        }
    }

    /// Root of the tree, suitable as a manager's `config_path`.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of one environment-scoped configuration file.
    pub fn config_file(&self, environment: &str, file_name: &str) -> PathBuf {
        self.root()
            .join("environments")
            .join(environment)
            .join(file_name)
    }

    /// Path of one schema file.
    pub fn schema_file(&self, file_name: &str) -> PathBuf {
        self.root().join("schemas").join(file_name)
    }

    /// Write the three standard schemas under `schemas/`.
    pub fn write_schemas(&self) {
        for (file_name, schema) in [
            ("app.schema.json", app_schema()),
            ("database.schema.json", database_schema()),
            ("redis.schema.json", redis_schema()),
        ] {
            self.write_json(&self.schema_file(file_name), &schema);
        }
    }

    /// Write one schema, replacing the standard one.
    pub fn write_schema(&self, file_name: &str, schema: &Value) {
        self.write_json(&self.schema_file(file_name), schema);
    }

    /// Populate `environments/<environment>/` with the three sample
    /// documents.
    pub fn write_environment(&self, environment: &str) {
        self.write_document(environment, "app.config.json", &sample_app_document());
        self.write_document(
            environment,
            "database.config.json",
            &sample_database_document(),
        );
        self.write_document(environment, "redis.config.json", &sample_redis_document());
    }

    /// Write (or overwrite) one environment document.
    pub fn write_document(&self, environment: &str, file_name: &str, document: &Value) {
        self.write_json(&self.config_file(environment, file_name), document);
    }

    /// Write raw bytes, for malformed-content scenarios.
    pub fn write_raw(&self, environment: &str, file_name: &str, contents: &str) {
        let path = self.config_file(environment, file_name);
        self.ensure_parent(&path);
        fs::write(&path, contents).expect("write fixture file");
    }

    /// Delete one environment document.
    pub fn remove_document(&self, environment: &str, file_name: &str) {
        fs::remove_file(self.config_file(environment, file_name)).expect("remove fixture file");
    }

    fn write_json(&self, path: &Path, value: &Value) {
        self.ensure_parent(path);
        let contents = serde_json::to_string_pretty(value).expect("serialize fixture document");
        fs::write(path, contents).expect("write fixture file");
    }

    fn ensure_parent(&self, path: &Path) {
        let parent = path.parent().expect("fixture path has a parent");
        fs::create_dir_all(parent).expect("create fixture directories");
    }
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove every environment variable the configuration pipeline reads.
///
/// Call at the start of `#[serial]` tests that construct managers, so
/// leftovers from other tests cannot leak into option resolution or the
/// secret overlay.
pub fn clear_config_env() {
    for variable in [
        "MERIDIAN_ENV",
        "MERIDIAN_CONFIG_DIR",
        "MONGODB_URI",
        "REDIS_PASSWORD",
        "JWT_SECRET",
        "WEBHOOK_SIGNING_SECRET",
        "SEARCH_API_KEY",
    ] {
        unsafe { std::env::remove_var(variable) };
    }
}

/// Application document with probe values distinct from the serde defaults.
pub fn sample_app_document() -> Value {
    json!({
        "api": {
            "baseUrl": "http://localhost:4000",
            "timeoutMs": 15_000,
            "retryAttempts": 2
        },
        "cors": {
            "allowedOrigins": ["http://localhost:4000", "http://localhost:5173"],
            "credentials": true
        },
        "features": {
            "webhooksEnabled": true,
            "advancedSearchEnabled": true,
            "debugMode": true
        },
        "logging": {
            "level": "debug",
            "format": "text",
            "prettyPrint": true
        },
        "pagination": {
            "defaultPageSize": 25,
            "maxPageSize": 200
        }
    })
}

/// Database document with probe values distinct from the serde defaults.
pub fn sample_database_document() -> Value {
    json!({
        "connectionString": "mongodb://localhost:27017/meridian-test",
        "pool": {
            "minSize": 1,
            "maxSize": 5,
            "connectTimeoutMs": 5_000
        },
        "readPreference": "primaryPreferred",
        "writeConcern": {
            "w": "majority",
            "journal": true
        },
        "query": {
            "maxTimeMs": 10_000,
            "lean": true
        }
    })
}

/// Redis document with probe values distinct from the serde defaults.
pub fn sample_redis_document() -> Value {
    json!({
        "connection": {
            "host": "127.0.0.1",
            "port": 6380,
            "db": 1,
            "maxRetries": 2
        },
        "retryStrategy": {
            "maxAttempts": 4,
            "initialDelayMs": 50,
            "maxDelayMs": 1_000,
            "backoffFactor": 2.0
        },
        "queues": {
            "email": { "concurrency": 3 }
        },
        "cache": {
            "defaultTtlSecs": 120
        },
        "pubsub": {
            "enabled": true,
            "bufferLimit": 25
        }
    })
}

pub fn app_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Application configuration",
        "type": "object",
        "required": ["api", "pagination"],
        "properties": {
            "api": {
                "type": "object",
                "properties": {
                    "baseUrl": { "type": "string", "minLength": 1 },
                    "timeoutMs": { "type": "integer", "minimum": 1 },
                    "retryAttempts": { "type": "integer", "minimum": 0 }
                }
            },
            "logging": {
                "type": "object",
                "properties": {
                    "level": { "enum": ["trace", "debug", "info", "warn", "error"] },
                    "format": { "enum": ["json", "text"] }
                }
            },
            "pagination": {
                "type": "object",
                "properties": {
                    "defaultPageSize": { "type": "integer", "minimum": 1 },
                    "maxPageSize": { "type": "integer", "minimum": 1 }
                }
            }
        }
    })
}

pub fn database_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Database configuration",
        "type": "object",
        "required": ["pool"],
        "properties": {
            "connectionString": { "type": "string", "minLength": 1 },
            "pool": {
                "type": "object",
                "properties": {
                    "minSize": { "type": "integer", "minimum": 0 },
                    "maxSize": { "type": "integer", "minimum": 1 }
                }
            },
            "readPreference": {
                "enum": [
                    "primary",
                    "primaryPreferred",
                    "secondary",
                    "secondaryPreferred",
                    "nearest"
                ]
            }
        }
    })
}

pub fn redis_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "Redis configuration",
        "type": "object",
        "required": ["connection"],
        "properties": {
            "connection": {
                "type": "object",
                "properties": {
                    "host": { "type": "string", "minLength": 1 },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "db": { "type": "integer", "minimum": 0 }
                }
            }
        }
    })
}

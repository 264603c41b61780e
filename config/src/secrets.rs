//! # Secret Overlay Extraction
//!
//! Maps a fixed set of process environment variables onto nested
//! configuration paths, producing the overlay fragment that wins over
//! file-sourced values during the merge step.
//!
//! # Recognized Variables
//! - `MONGODB_URI`: `database.connectionString`
//! - `REDIS_PASSWORD`: `redis.connection.password`
//! - `JWT_SECRET`: `app.security.jwtSecret`
//! - `WEBHOOK_SIGNING_SECRET`: `app.security.webhookSigningSecret`
//! - `SEARCH_API_KEY`: `app.search.apiKey`
//!
//! The fragment is merged in *after* schema validation of the file-sourced
//! documents and is itself never schema-validated; the typed deserialization
//! step is the only check secret values receive.

use serde_json::{Map, Value};
use std::env;
use tracing::debug;

/// Recognized variables and the config paths they land at. The exact names
/// are part of the operational contract with deployment tooling.
const SECRET_MAPPINGS: [(&str, &[&str]); 5] = [
    ("MONGODB_URI", &["database", "connectionString"]),
    ("REDIS_PASSWORD", &["redis", "connection", "password"]),
    ("JWT_SECRET", &["app", "security", "jwtSecret"]),
    (
        "WEBHOOK_SIGNING_SECRET",
        &["app", "security", "webhookSigningSecret"],
    ),
    ("SEARCH_API_KEY", &["app", "search", "apiKey"]),
];

/// Build the secret overlay fragment from the process environment.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Produces a partial, nested configuration fragment from operator-supplied
/// environment variables. Pure read of the environment: no side effects,
/// never fails.
///
/// ## Semantics
/// - Unset variables contribute no key (no null placeholder)
/// - Variables set to an empty string are treated as unset
/// - Unrelated environment variables are ignored
/// - Values are never logged, only the variable names
pub fn overrides_from_env() -> Map<String, Value> {
    let mut overrides = Map::new();

    for (variable, path) in SECRET_MAPPINGS {
        match env::var(variable) {
            Ok(value) if !value.is_empty() => {
                debug!("Secret override from {} -> {}", variable, path.join("."));
                insert_at_path(&mut overrides, path, Value::String(value));
            }
            _ => {}
        }
    }

    overrides
}

fn insert_at_path(target: &mut Map<String, Value>, path: &[&str], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            target.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = target
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_at_path(map, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_secret_env() {
        for (variable, _) in SECRET_MAPPINGS {
            unsafe {
                env::remove_var(variable);
            }
        }
    }

    #[test]
    #[serial]
    fn test_no_secrets_yields_empty_fragment() {
        clear_secret_env();
        let overrides = overrides_from_env();
        assert!(overrides.is_empty());
    }

    #[test]
    #[serial]
    fn test_mongodb_uri_lands_at_nested_path() {
        clear_secret_env();
        unsafe {
            env::set_var("MONGODB_URI", "mongodb://secret-host/meridian");
        }

        let overrides = overrides_from_env();
        assert_eq!(
            overrides["database"]["connectionString"],
            Value::String("mongodb://secret-host/meridian".to_string())
        );
        assert!(overrides.get("app").is_none());
        assert!(overrides.get("redis").is_none());

        clear_secret_env();
    }

    #[test]
    #[serial]
    fn test_multiple_secrets_share_a_subtree() {
        clear_secret_env();
        unsafe {
            env::set_var("JWT_SECRET", "jwt-material");
            env::set_var("SEARCH_API_KEY", "search-material");
            env::set_var("REDIS_PASSWORD", "redis-material");
        }

        let overrides = overrides_from_env();
        assert_eq!(
            overrides["app"]["security"]["jwtSecret"],
            Value::String("jwt-material".to_string())
        );
        assert_eq!(
            overrides["app"]["search"]["apiKey"],
            Value::String("search-material".to_string())
        );
        assert_eq!(
            overrides["redis"]["connection"]["password"],
            Value::String("redis-material".to_string())
        );

        clear_secret_env();
    }

    #[test]
    #[serial]
    fn test_empty_value_treated_as_unset() {
        clear_secret_env();
        unsafe {
            env::set_var("MONGODB_URI", "");
        }

        let overrides = overrides_from_env();
        assert!(overrides.is_empty());

        clear_secret_env();
    }

    #[test]
    #[serial]
    fn test_unrelated_variables_ignored() {
        clear_secret_env();
        unsafe {
            env::set_var("MERIDIAN_UNRELATED_SECRET", "nope");
        }

        let overrides = overrides_from_env();
        assert!(overrides.is_empty());

        unsafe {
            env::remove_var("MERIDIAN_UNRELATED_SECRET");
        }
    }

    #[test]
    fn test_insert_at_path_replaces_non_object_intermediate() {
        let mut target = Map::new();
        target.insert("database".to_string(), Value::String("scalar".to_string()));

        insert_at_path(
            &mut target,
            &["database", "connectionString"],
            Value::String("mongodb://x".to_string()),
        );

        assert_eq!(
            target["database"]["connectionString"],
            Value::String("mongodb://x".to_string())
        );
    }
}

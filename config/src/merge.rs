//! # Configuration Merging
//!
//! Recursively overlays one JSON value onto another.
//!
//! # Precedence Order
//! 1. Overlay (secret fragment, highest priority)
//! 2. Base (file-sourced configuration)
//!
//! Objects merge key-by-key; primitives, arrays and null replace the base
//! value wholesale (arrays are atomic, never merged element-wise).

use serde_json::Value;

/// Merge `overlay` onto `base`, overlay winning at every depth.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Produces the effective configuration value for one domain by overlaying
/// the secret fragment onto the schema-validated file document.
///
/// ## Usage
/// ```rust
/// use config::deep_merge;
/// use serde_json::json;
///
/// let base = json!({ "pool": { "minSize": 2, "maxSize": 10 } });
/// let overlay = json!({ "pool": { "maxSize": 50 } });
///
/// let merged = deep_merge(&base, &overlay);
/// assert_eq!(merged, json!({ "pool": { "minSize": 2, "maxSize": 50 } }));
/// ```
///
/// ## Semantics
/// - Overlay object keys recurse into the matching base sub-object,
///   creating it when absent or non-object
/// - Any non-object overlay value replaces the base value at that key
/// - Keys present only in the base survive untouched
/// - Neither input is mutated; a new value is returned
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, overlay_value) in overlay_map {
                let combined = match merged.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                merged.insert(key.clone(), combined);
            }
            Value::Object(merged)
        }
        _ => overlay.clone(),
    }
}

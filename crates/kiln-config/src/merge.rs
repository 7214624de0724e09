//! Deep merge for bundler configurations.
//!
//! Objects merge key by key, arrays concatenate (base first), scalars are
//! replaced by the override and `null` overrides are ignored. Merging is
//! associative but not commutative: callers put computed defaults first and
//! forced values last.

use serde_json::Value;

use crate::bundler::BundlerConfig;
use crate::error::Result;

/// Merge `update` into `target` in place.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                match target_map.get_mut(key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        if !value.is_null() {
                            target_map.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(update_items)) => {
            target_items.extend(update_items.iter().cloned());
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

/// Merge configuration layers left to right.
///
/// # Example
///
/// ```
/// use kiln_config::{merge_configs, BundlerConfig, Target};
/// use serde_json::json;
///
/// let defaults = BundlerConfig::from_value(json!({ "target": "web" })).unwrap();
/// let user = BundlerConfig::from_value(json!({ "target": "electron-renderer" })).unwrap();
/// let forced = BundlerConfig::from_value(json!({ "target": "electron-preload" })).unwrap();
///
/// let merged = merge_configs([defaults, user, forced]).unwrap();
/// assert_eq!(merged.target, Some(Target::ElectronPreload));
/// ```
pub fn merge_configs<I>(layers: I) -> Result<BundlerConfig>
where
    I: IntoIterator<Item = BundlerConfig>,
{
    let mut merged = Value::Object(serde_json::Map::new());
    for layer in layers {
        merge_values(&mut merged, &layer.to_value()?);
    }
    BundlerConfig::from_value(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_replaced() {
        let mut base = json!({ "devtool": "source-map", "mode": "production" });
        merge_values(&mut base, &json!({ "devtool": "eval-source-map" }));
        assert_eq!(base, json!({ "devtool": "eval-source-map", "mode": "production" }));
    }

    #[test]
    fn arrays_concatenate_base_first() {
        let mut base = json!({ "plugins": [{ "plugin": "define", "definitions": {} }] });
        merge_values(
            &mut base,
            &json!({ "plugins": [{ "plugin": "custom", "name": "x" }] }),
        );
        assert_eq!(base["plugins"].as_array().unwrap().len(), 2);
        assert_eq!(base["plugins"][0]["plugin"], json!("define"));
        assert_eq!(base["plugins"][1]["plugin"], json!("custom"));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut base = json!({ "output": { "path": "/out", "filename": "index.js" } });
        merge_values(&mut base, &json!({ "output": { "filename": "main.js" } }));
        assert_eq!(base, json!({ "output": { "path": "/out", "filename": "main.js" } }));
    }

    #[test]
    fn null_never_erases_a_computed_value() {
        let mut base = json!({ "target": "electron-main" });
        merge_values(&mut base, &json!({ "target": null, "extra": null }));
        assert_eq!(base, json!({ "target": "electron-main" }));
    }

    #[test]
    fn merge_is_associative() {
        let a = json!({ "plugins": [1], "x": { "a": 1 } });
        let b = json!({ "plugins": [2], "x": { "b": 2 } });
        let c = json!({ "plugins": [3], "x": { "a": 3 } });

        let mut left = a.clone();
        merge_values(&mut left, &b);
        merge_values(&mut left, &c);

        let mut bc = b.clone();
        merge_values(&mut bc, &c);
        let mut right = a.clone();
        merge_values(&mut right, &bc);

        assert_eq!(left, right);
    }

    #[test]
    fn merge_is_not_commutative() {
        let mut ab = json!({ "target": "web" });
        merge_values(&mut ab, &json!({ "target": "electron-preload" }));
        let mut ba = json!({ "target": "electron-preload" });
        merge_values(&mut ba, &json!({ "target": "web" }));
        assert_ne!(ab, ba);
    }
}

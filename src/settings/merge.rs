//! Deep-merge semantics for settings documents
//!
//! - Objects: deep-merge by key (recursive)
//! - Arrays: REPLACE (overlay wins entirely)
//! - Scalars: override (overlay wins)

use serde_json::map::Entry;
use serde_json::Value;

/// Deep merge an overlay document onto a base document.
///
/// Merge semantics:
/// - Objects: deep-merge by key (recursive)
/// - Arrays: REPLACE (no element-wise merge, no concatenation)
/// - Scalars: overlay wins
/// - Null: overlay null overrides any base value
///
/// Key order of the base document is preserved; keys only present in the
/// overlay are appended in overlay order.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.entry(key) {
                    Entry::Occupied(mut slot) => {
                        let merged = deep_merge(slot.get_mut().take(), overlay_value);
                        slot.insert(merged);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(overlay_value);
                    }
                }
            }
            Value::Object(base_map)
        }

        (_, overlay) => overlay,
    }
}

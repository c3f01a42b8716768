// Deterministic deep merge of extraction patches into the session draft.

use serde_json::{Map, Value};

/// Merge `patch` into `current`, in place.
///
/// Rules:
/// - objects merge recursively, key by key
/// - arrays replace wholesale (a new ticket list supersedes the old one)
/// - scalars and `null` replace whatever was there
/// - when an object patch lands on a non-object value, the old value is
///   discarded and the patch is merged over an empty object
///
/// The merge is total: it cannot fail, whatever shape the patch has.
pub fn merge_values(current: &mut Value, patch: Value) {
    match patch {
        Value::Object(entries) => {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            if let Some(map) = current.as_object_mut() {
                for (key, incoming) in entries {
                    if incoming.is_object() {
                        let slot = map
                            .entry(key)
                            .or_insert_with(|| Value::Object(Map::new()));
                        merge_values(slot, incoming);
                    } else {
                        map.insert(key, incoming);
                    }
                }
            }
        }
        other => *current = other,
    }
}

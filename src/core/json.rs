use serde_json::{Map, Value};

/// Shallow field merge: every top-level key of `patch` overwrites the same
/// key of `target`; keys absent from the patch are left alone.
///
/// Returns `false` when either side is not a JSON object.
pub fn merge_fields(target: &mut Value, patch: &Value) -> bool {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
            true
        }
        _ => false,
    }
}

/// Fills keys missing from `stored` with the value from `defaults`.
pub fn merge_defaults(defaults: &Value, stored: &Value) -> Value {
    match (defaults, stored) {
        (Value::Object(defaults), Value::Object(stored)) => {
            let mut merged: Map<String, Value> = defaults.clone();
            for (key, value) in stored {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        (defaults, Value::Null) => defaults.clone(),
        (_, stored) => stored.clone(),
    }
}

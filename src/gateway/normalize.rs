//! Usage: Upper-case the first letter of object keys so backend payloads match caller casing.

use serde_json::{Map, Value};

pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        Value::Object(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, child) in entries {
                // Colliding keys (`nome` + `Nome`): the later one in source order wins.
                out.insert(normalize_key(key), normalize_keys(child));
            }
            Value::Object(out)
        }
        scalar => scalar,
    }
}

fn normalize_key(key: String) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            let mut out = String::with_capacity(key.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        _ => key,
    }
}

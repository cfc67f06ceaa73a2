//! Endpoint parameters
//!
//! Parameters are an untyped JSON object supplied by the caller. POST endpoints
//! send them verbatim as the request body; GET endpoints flatten them into a
//! query string using the bracketed nested-key convention (`a[b]=c`, `a[]=1`)
//! understood by the PokitDok server.

use serde_json::{Map, Value};

/// Parameters for a single endpoint call
pub type Params = Map<String, Value>;

/// Flatten parameters into `(key, value)` query pairs.
///
/// Values are left unescaped; percent-encoding happens when the pairs are
/// attached to the request URL.
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }
    pairs
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => pairs.push((key, String::new())),
        Value::Bool(flag) => pairs.push((key, flag.to_string())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Array(items) => {
            let item_key = format!("{key}[]");
            if items.is_empty() {
                pairs.push((item_key, String::new()));
                return;
            }
            for item in items {
                flatten(item_key.clone(), item, pairs);
            }
        },
        Value::Object(fields) => {
            if fields.is_empty() {
                pairs.push((key, String::new()));
                return;
            }
            for (field, item) in fields {
                flatten(format!("{key}[{field}]"), item, pairs);
            }
        },
    }
}

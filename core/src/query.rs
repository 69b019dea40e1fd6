//! Query string encoding.
//!
//! Values are written verbatim: the host API expects reserved characters such
//! as `,` in list filters to arrive literally, so nothing is percent-encoded.
//! Nested objects use bracket keys (`filter[status]=open`) and arrays use
//! indexed keys (`ids[0]=1`).

use serde_json::{Map, Value};

/// A key/value query mapping.
pub type Query = Map<String, Value>;

/// Encode `query` without a leading `?`. An empty mapping yields `""`.
pub fn encode_query(query: &Query) -> String {
    let mut pairs = Vec::new();
    for (key, value) in query {
        push_pairs(&mut pairs, key.clone(), value);
    }
    pairs.join("&")
}

fn push_pairs(pairs: &mut Vec<String>, key: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (child, nested) in map {
                push_pairs(pairs, format!("{key}[{child}]"), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                push_pairs(pairs, format!("{key}[{index}]"), nested);
            }
        }
        Value::Null => pairs.push(format!("{key}=")),
        Value::String(s) => pairs.push(format!("{key}={s}")),
        Value::Bool(b) => pairs.push(format!("{key}={b}")),
        Value::Number(n) => pairs.push(format!("{key}={n}")),
    }
}

/// Append an encoded query to `endpoint`, if there is one.
pub(crate) fn with_query(endpoint: &str, query: &Query) -> String {
    let encoded = encode_query(query);
    if encoded.is_empty() {
        return endpoint.to_string();
    }
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}{encoded}")
}

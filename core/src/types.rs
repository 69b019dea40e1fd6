//! Identifier type shared by intents, events and the normalized graph.
//!
//! # Design
//! The host API hands out both numeric ids (`42`) and string ids (UUIDs).
//! `EntityId` keeps whichever form it was given so an event serializes back
//! to the same JSON the caller supplied, while `Display` provides the string
//! form used in URLs and as normalized table keys.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const I64_MIN_F: f64 = -9_223_372_036_854_775_808.0;
const I64_MAX_F: f64 = 9_223_372_036_854_775_808.0;

/// An entity identifier, either numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// Read an id out of a JSON value. Strings and integral numbers qualify,
    /// including floats with no fractional part (`42.0`). Unsigned ids beyond
    /// `i64::MAX` are kept in their decimal text form.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(n) = n.as_i64() {
                    return Some(EntityId::Number(n));
                }
                if let Some(n) = n.as_u64() {
                    return Some(EntityId::Text(n.to_string()));
                }
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= I64_MIN_F && *f < I64_MAX_F)
                    .map(|f| EntityId::Number(f as i64))
            }
            Value::String(s) => Some(EntityId::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        EntityId::Number(n)
    }
}

impl From<i32> for EntityId {
    fn from(n: i32) -> Self {
        EntityId::Number(i64::from(n))
    }
}

impl From<u32> for EntityId {
    fn from(n: u32) -> Self {
        EntityId::Number(i64::from(n))
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId::Text(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_serializes_as_number() {
        assert_eq!(serde_json::to_value(EntityId::from(7)).unwrap(), json!(7));
    }

    #[test]
    fn text_id_displays_verbatim() {
        let id = EntityId::from("00000000-0000-0000-0000-000000000001");
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn from_json_accepts_integral_floats_and_wide_unsigned_ids() {
        assert_eq!(EntityId::from_json(&json!(42.0)), Some(EntityId::Number(42)));
        assert_eq!(
            EntityId::from_json(&json!(u64::MAX)).map(|id| id.to_string()),
            Some("18446744073709551615".to_string())
        );
    }

    #[test]
    fn from_json_rejects_non_scalar_ids() {
        assert_eq!(EntityId::from_json(&json!(42)), Some(EntityId::Number(42)));
        assert_eq!(EntityId::from_json(&json!("a")), Some(EntityId::from("a")));
        assert_eq!(EntityId::from_json(&json!(1.5)), None);
        assert_eq!(EntityId::from_json(&json!({"id": 1})), None);
        assert_eq!(EntityId::from_json(&Value::Null), None);
    }
}

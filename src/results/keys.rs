//! Primary-key values returned by search backends

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A model's primary key as stored in a search index.
///
/// Backends disagree on key types: Algolia always hands back string
/// `objectID`s while Meilisearch echoes whatever the document held. Joins
/// against the datastore go through [`ScoutKey::join_key`] so `11` and `"11"`
/// pair up with the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoutKey {
    Int(i64),
    Str(String),
}

/// Keys in backend relevance order
pub type OrderedKeySet = Vec<ScoutKey>;

impl ScoutKey {
    /// Read a key out of a JSON document field
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ScoutKey::Int),
            Value::String(s) => Some(ScoutKey::Str(s.clone())),
            _ => None,
        }
    }

    /// Canonical string form used to join index keys to records
    pub fn join_key(&self) -> String {
        self.to_string()
    }

    pub fn to_value(&self) -> Value {
        match self {
            ScoutKey::Int(i) => Value::from(*i),
            ScoutKey::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for ScoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoutKey::Int(i) => write!(f, "{}", i),
            ScoutKey::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ScoutKey {
    fn from(value: i64) -> Self {
        ScoutKey::Int(value)
    }
}

impl From<i32> for ScoutKey {
    fn from(value: i32) -> Self {
        ScoutKey::Int(value.into())
    }
}

impl From<&str> for ScoutKey {
    fn from(value: &str) -> Self {
        ScoutKey::Str(value.to_string())
    }
}

impl From<String> for ScoutKey {
    fn from(value: String) -> Self {
        ScoutKey::Str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        assert_eq!(ScoutKey::from_value(&json!(11)), Some(ScoutKey::Int(11)));
        assert_eq!(ScoutKey::from_value(&json!("11")), Some(ScoutKey::from("11")));
        assert_eq!(ScoutKey::from_value(&json!(1.5)), None);
        assert_eq!(ScoutKey::from_value(&json!(null)), None);
    }

    #[test]
    fn test_int_and_string_keys_join_alike() {
        assert_eq!(ScoutKey::Int(11).join_key(), ScoutKey::from("11").join_key());
        assert_ne!(ScoutKey::Int(11), ScoutKey::from("11"));
    }

    #[test]
    fn test_untagged_serialization() {
        let keys = vec![ScoutKey::Int(1), ScoutKey::from("abc")];
        assert_eq!(serde_json::to_value(&keys).unwrap(), json!([1, "abc"]));
    }
}

//! Raw backend payloads

use crate::error::{Result, ScoutError};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A backend's search answer, exactly as it was received.
///
/// The only structural guarantee is that the payload is a JSON object with a
/// `hits` array; everything else (timings, cursors, totals) is backend specific
/// and handed to after-raw-search callbacks untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawSearchResponse(Map<String, Value>);

impl RawSearchResponse {
    /// Validate a decoded payload
    pub fn from_value(engine: &str, value: Value) -> Result<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ScoutError::parse(
                    engine,
                    format!("expected a JSON object, got {}", type_name(&other)),
                ))
            }
        };

        match map.get("hits") {
            Some(Value::Array(_)) => Ok(Self(map)),
            Some(other) => Err(ScoutError::parse(
                engine,
                format!("`hits` must be an array, got {}", type_name(other)),
            )),
            None => Err(ScoutError::parse(engine, "response has no `hits` field")),
        }
    }

    /// Decode and validate a response body
    pub fn from_text(engine: &str, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ScoutError::parse(engine, format!("invalid JSON: {}", e)))?;
        Self::from_value(engine, value)
    }

    /// The answer of an engine that holds nothing
    pub fn empty() -> Self {
        let mut map = Map::new();
        map.insert("hits".to_string(), json!([]));
        map.insert("nbHits".to_string(), json!(0));
        Self(map)
    }

    pub fn hits(&self) -> &[Value] {
        self.0
            .get("hits")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

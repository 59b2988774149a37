//! REST response decoding
//!
//! The backend returns lists under a named field, either at the top level
//! (`{"orders": [...]}`) or inside a `data` envelope
//! (`{"data": {"orders": [...]}}`). Responses are decoded once here so
//! callers never re-check optional chains.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Result of decoding a list field out of a response body
#[derive(Debug, Clone, PartialEq)]
pub enum ListOutcome<T> {
    /// Well-formed list (possibly empty)
    Ok(Vec<T>),
    /// Field absent or null
    Empty,
    /// Field present but not a list of `T`
    Malformed(String),
}

impl<T: DeserializeOwned> ListOutcome<T> {
    /// Decode `field` from `body`
    pub fn decode(body: &Value, field: &str) -> Self {
        match find_field(body, field) {
            None | Some(Value::Null) => ListOutcome::Empty,
            Some(value @ Value::Array(_)) => match Vec::<T>::deserialize(value) {
                Ok(items) => ListOutcome::Ok(items),
                Err(e) => ListOutcome::Malformed(format!("{}: {}", field, e)),
            },
            Some(other) => ListOutcome::Malformed(format!(
                "{}: expected a list, got {}",
                field,
                json_kind(other)
            )),
        }
    }
}

impl<T> ListOutcome<T> {
    /// Items to store, `None` when the list must not overwrite local state.
    /// `Empty` yields an empty list.
    pub fn into_items(self) -> Option<Vec<T>> {
        match self {
            ListOutcome::Ok(items) => Some(items),
            ListOutcome::Empty => Some(Vec::new()),
            ListOutcome::Malformed(_) => None,
        }
    }
}

/// Look up `field` at the top level, then under `data`
pub fn find_field<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field)
        .or_else(|| body.get("data").and_then(|data| data.get(field)))
}

/// Decode a single object stored under `field`
pub fn decode_object<T: DeserializeOwned>(
    body: &Value,
    field: &str,
) -> Result<Option<T>, serde_json::Error> {
    match find_field(body, field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value).map(Some),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

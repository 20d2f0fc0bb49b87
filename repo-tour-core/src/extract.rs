//! Best-effort recovery of a JSON object from generated text.
//!
//! Two ordered attempts:
//! 1. parse the trimmed text as-is;
//! 2. parse the slice from the first `{` through the last `}`.
//!
//! This handles objects wrapped in prose or code fences. It is not a bracket
//! matcher: text containing two separate objects yields a slice that fails to parse.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ExtractError;

/// A recovered top-level JSON object.
pub type StructuredObject = Map<String, Value>;

pub fn extract(raw: &str) -> Result<StructuredObject, ExtractError> {
    let direct = match parse_object(raw.trim()) {
        Ok(object) => return Ok(object),
        Err(e) => e,
    };
    debug!(error = %direct, "Direct JSON parse failed, trying embedded object");

    let start = raw.find('{');
    let end = raw.rfind('}');
    let slice = match (start, end) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => return Err(ExtractError::NoObjectDelimiters { direct }),
    };

    parse_object(slice).map_err(|slice| ExtractError::SliceInvalid { direct, slice })
}

fn parse_object(text: &str) -> Result<StructuredObject, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(format!("expected a JSON object, found {}", kind_of(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

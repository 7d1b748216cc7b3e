//! Conversion of caller data into a Tera rendering context.

use serde::Serialize;
use serde_json::Value;

use crate::error::RenderError;

/// Build a [`tera::Context`] from any serializable value.
///
/// `null` (including `()` and `None`) yields an empty context, an object
/// becomes the top-level variables, anything else is rejected.
pub fn to_tera_context<T: Serialize + ?Sized>(data: &T) -> Result<tera::Context, RenderError> {
    match serde_json::to_value(data)? {
        Value::Null => Ok(tera::Context::new()),
        value @ Value::Object(_) => Ok(tera::Context::from_value(value)?),
        other => Err(RenderError::InvalidData { kind: kind_of(&other) }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

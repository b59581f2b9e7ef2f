//! Schema-free conversion between [`Value`] and `serde_json::Value`.
//!
//! JSON has no byte strings and no non-text object keys, so the conversion to
//! JSON is fallible for some values: bytes become base64url text and integer
//! keys their decimal form, while non-finite reals and other keys are
//! rejected. The conversion from JSON is total.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use crate::{Mapping, Value};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonError {
    #[error("non-finite number {0} has no JSON representation")]
    NonFinite(f64),
    #[error("{0} mapping key has no JSON representation")]
    UnsupportedKey(&'static str),
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (Value::Text(k), Value::from(v)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

/// Converts a value to JSON without schema guidance.
pub fn to_json(value: &Value) -> Result<serde_json::Value, JsonError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Real(f) => real_to_json(*f)?,
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(b) => serde_json::Value::String(URL_SAFE_NO_PAD.encode(b)),
        Value::Sequence(items) => serde_json::Value::Array(
            items.iter().map(to_json).collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(m) => {
            let mut obj = serde_json::Map::with_capacity(m.len());
            for (k, v) in m {
                let key = match k {
                    Value::Text(s) => s.clone(),
                    Value::Int(n) => n.to_string(),
                    other => return Err(JsonError::UnsupportedKey(other.kind_name())),
                };
                obj.insert(key, to_json(v)?);
            }
            serde_json::Value::Object(obj)
        }
    })
}

/// Finite reals only; JSON has no NaN or infinities.
pub fn real_to_json(f: f64) -> Result<serde_json::Value, JsonError> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or(JsonError::NonFinite(f))
}

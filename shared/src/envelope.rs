//! Response envelope normalisation.
//!
//! The backend wraps payloads in one of two shapes depending on the endpoint:
//!
//! ```text
//! { "data": { "<field>": ... } }   // nested
//! { "<field>": ... }               // flat
//! ```
//!
//! Every client call goes through [`unwrap_field`] or [`unwrap_list`] so the
//! ambiguity lives in exactly one place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("response envelope has no '{0}' field")]
    MissingField(String),

    #[error("field '{field}' has an unexpected shape: {source}")]
    Malformed {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Which wrapper a response used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    Nested,
    Flat,
}

/// Find `field` in either envelope shape, nested form first.
pub fn locate_field<'a>(body: &'a Value, field: &str) -> Option<(EnvelopeShape, &'a Value)> {
    if let Some(value) = body.get("data").and_then(|data| data.get(field)) {
        if !value.is_null() {
            return Some((EnvelopeShape::Nested, value));
        }
    }
    match body.get(field) {
        Some(value) if !value.is_null() => Some((EnvelopeShape::Flat, value)),
        _ => None,
    }
}

/// Deserialize `field` out of either envelope shape
pub fn unwrap_field<T: DeserializeOwned>(body: &Value, field: &str) -> Result<T, EnvelopeError> {
    let (_, value) =
        locate_field(body, field).ok_or_else(|| EnvelopeError::MissingField(field.to_string()))?;
    serde_json::from_value(value.clone()).map_err(|source| EnvelopeError::Malformed {
        field: field.to_string(),
        source,
    })
}

/// Like [`unwrap_field`] for collections, but a missing field is an empty list.
///
/// A field that is present with the wrong shape is still an error.
pub fn unwrap_list<T: DeserializeOwned>(body: &Value, field: &str) -> Result<Vec<T>, EnvelopeError> {
    match unwrap_field(body, field) {
        Ok(items) => Ok(items),
        Err(EnvelopeError::MissingField(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Build a response body in the given shape
pub fn wrap<T: Serialize>(shape: EnvelopeShape, field: &str, payload: &T) -> Value {
    let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
    let mut inner = Map::new();
    inner.insert(field.to_string(), payload);
    match shape {
        EnvelopeShape::Flat => Value::Object(inner),
        EnvelopeShape::Nested => {
            let mut outer = Map::new();
            outer.insert("data".to_string(), Value::Object(inner));
            Value::Object(outer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_and_flat_shapes_decode_the_same() {
        let nested = json!({"data": {"students": [{"id": "s1"}]}});
        let flat = json!({"students": [{"id": "s1"}]});

        let a: Vec<Value> = unwrap_field(&nested, "students").unwrap();
        let b: Vec<Value> = unwrap_field(&flat, "students").unwrap();
        assert_eq!(a, b);

        assert_eq!(locate_field(&nested, "students").unwrap().0, EnvelopeShape::Nested);
        assert_eq!(locate_field(&flat, "students").unwrap().0, EnvelopeShape::Flat);
    }

    #[test]
    fn test_nested_null_falls_back_to_flat() {
        let body = json!({"data": {"bus": null}, "bus": {"id": "b1"}});
        let bus: Value = unwrap_field(&body, "bus").unwrap();
        assert_eq!(bus["id"], "b1");
    }

    #[test]
    fn test_missing_field() {
        let body = json!({"data": {"other": 1}});
        let err = unwrap_field::<Value>(&body, "route").unwrap_err();
        assert!(matches!(err, EnvelopeError::MissingField(ref f) if f == "route"));

        let list: Vec<Value> = unwrap_list(&body, "routes").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_malformed_list_is_an_error() {
        let body = json!({"routes": "not a list"});
        let err = unwrap_list::<Value>(&body, "routes").unwrap_err();
        assert!(matches!(err, EnvelopeError::Malformed { .. }));
    }

    #[test]
    fn test_wrap_round_trips_through_unwrap() {
        let body = wrap(EnvelopeShape::Nested, "count", &3u32);
        assert_eq!(body, json!({"data": {"count": 3}}));
        assert_eq!(unwrap_field::<u32>(&body, "count").unwrap(), 3);

        let body = wrap(EnvelopeShape::Flat, "count", &4u32);
        assert_eq!(body, json!({"count": 4}));
    }
}

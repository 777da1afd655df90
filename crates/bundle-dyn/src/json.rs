//! Conversion between `Value` and `serde_json::Value`.
//!
//! JSON carries no source locations, so converted values have none and
//! locations are dropped on the way out.

use crate::{Mapping, Number, Value, ValueKind};

impl Value {
    /// Convert a JSON value into a location-free `Value`.
    ///
    /// Integers that fit in `i64` stay integers; everything else numeric
    /// becomes a float.
    pub fn from_json(json: serde_json::Value) -> Value {
        let kind = match json {
            serde_json::Value::Null => ValueKind::Nil,
            serde_json::Value::Bool(b) => ValueKind::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ValueKind::Number(Number::Int(i)),
                None => ValueKind::Number(Number::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            serde_json::Value::String(s) => ValueKind::String(s),
            serde_json::Value::Array(items) => {
                ValueKind::Sequence(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(entries) => ValueKind::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect::<Mapping>(),
            ),
        };
        Value::new(kind)
    }

    /// Convert to JSON. `Invalid` and non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.kind {
            ValueKind::Invalid | ValueKind::Nil => serde_json::Value::Null,
            ValueKind::Bool(b) => serde_json::Value::Bool(*b),
            ValueKind::Number(Number::Int(i)) => serde_json::Value::from(*i),
            ValueKind::Number(Number::Float(x)) => serde_json::Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ValueKind::String(s) => serde_json::Value::String(s.clone()),
            ValueKind::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            ValueKind::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_kinds() {
        let value = Value::from_json(json!({
            "name": "etl",
            "retries": 3,
            "ratio": 0.5,
            "enabled": true,
            "tags": null,
            "tasks": ["a", "b"]
        }));

        assert_eq!(value.get("name").and_then(Value::as_str), Some("etl"));
        assert_eq!(value.get("retries").and_then(Value::as_int), Some(3));
        assert_eq!(value.get("ratio").and_then(Value::as_float), Some(0.5));
        assert_eq!(value.get("enabled").and_then(Value::as_bool), Some(true));
        assert!(value.get("tags").is_some_and(Value::is_nil));
        assert_eq!(value.get("tasks").map(Value::len), Some(2));
    }

    #[test]
    fn test_to_json_keeps_key_order() {
        let json = json!({"z": 1, "a": [true, null], "m": {"k": "v"}});
        let value = Value::from_json(json.clone());
        assert_eq!(value.to_json(), json);

        let keys: Vec<String> = value.to_json().as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_invalid_serializes_as_null() {
        assert_eq!(Value::invalid().to_json(), serde_json::Value::Null);
    }
}

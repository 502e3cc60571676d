//! Conversion between plain JSON and Firestore's typed-value encoding.
//!
//! Plain `{"streak": 3}` travels as `{"streak": {"integerValue": "3"}}`.

use serde_json::{Map, Number, Value};

use crate::error::{RemoteError, RemoteResult};

/// Encode a JSON object as a Firestore `fields` map
///
/// # Errors
///
/// Returns `Serialization` when `value` is not an object
pub fn encode_fields(value: &Value) -> RemoteResult<Map<String, Value>> {
    let Value::Object(map) = value else {
        return Err(RemoteError::Serialization);
    };
    Ok(map
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect())
}

#[must_use]
pub fn encode_value(value: &Value) -> Value {
    let mut typed = Map::new();
    match value {
        Value::Null => {
            typed.insert("nullValue".to_string(), Value::Null);
        }
        Value::Bool(b) => {
            typed.insert("booleanValue".to_string(), Value::Bool(*b));
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                typed.insert("integerValue".to_string(), Value::String(i.to_string()));
            } else if let Some(u) = n.as_u64() {
                typed.insert("integerValue".to_string(), Value::String(u.to_string()));
            } else {
                typed.insert("doubleValue".to_string(), Value::Number(n.clone()));
            }
        }
        Value::String(s) => {
            typed.insert("stringValue".to_string(), Value::String(s.clone()));
        }
        Value::Array(items) => {
            let values = items.iter().map(encode_value).collect();
            let mut array = Map::new();
            array.insert("values".to_string(), Value::Array(values));
            typed.insert("arrayValue".to_string(), Value::Object(array));
        }
        Value::Object(map) => {
            let fields = map
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect();
            let mut inner = Map::new();
            inner.insert("fields".to_string(), Value::Object(fields));
            typed.insert("mapValue".to_string(), Value::Object(inner));
        }
    }
    Value::Object(typed)
}

/// Decode a Firestore `fields` map back into a plain JSON object
///
/// # Errors
///
/// Returns `Serialization` if any field carries an unknown or malformed type
pub fn decode_fields(fields: &Map<String, Value>) -> RemoteResult<Value> {
    let mut out = Map::new();
    for (key, typed) in fields {
        out.insert(key.clone(), decode_value(typed)?);
    }
    Ok(Value::Object(out))
}

/// Decode a single typed value
///
/// # Errors
///
/// Returns `Serialization` if the value is not a recognised typed value
pub fn decode_value(typed: &Value) -> RemoteResult<Value> {
    let Value::Object(map) = typed else {
        return Err(RemoteError::Serialization);
    };
    let Some((kind, inner)) = map.iter().next() else {
        return Err(RemoteError::Serialization);
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or(RemoteError::Serialization),
        "integerValue" => decode_integer(inner),
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or(RemoteError::Serialization),
            _ => Err(RemoteError::Serialization),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or(RemoteError::Serialization),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<RemoteResult<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields),
            None => Ok(Value::Object(Map::new())),
        },
        "geoPointValue" => Ok(inner.clone()),
        _ => Err(RemoteError::Serialization),
    }
}

fn decode_integer(inner: &Value) -> RemoteResult<Value> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(|i| Value::Number(i.into()))
            .map_err(|_| RemoteError::Serialization),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(inner.clone()),
        _ => Err(RemoteError::Serialization),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_habit_like_document() {
        let doc = json!({
            "name": "Read",
            "streak": 3,
            "reminder": true,
            "reminderHour": null,
            "customFrequencyDays": ["Mon", "Wed"]
        });

        let fields = encode_fields(&doc).unwrap();

        assert_eq!(fields["name"], json!({"stringValue": "Read"}));
        assert_eq!(fields["streak"], json!({"integerValue": "3"}));
        assert_eq!(fields["reminder"], json!({"booleanValue": true}));
        assert_eq!(fields["reminderHour"], json!({"nullValue": null}));
        assert_eq!(
            fields["customFrequencyDays"],
            json!({"arrayValue": {"values": [{"stringValue": "Mon"}, {"stringValue": "Wed"}]}})
        );
    }

    #[test]
    fn test_encode_rejects_non_object() {
        assert_eq!(encode_fields(&json!([1, 2])), Err(RemoteError::Serialization));
    }

    #[test]
    fn test_decode_server_document() {
        let fields = json!({
            "lastCompletedDate": {"integerValue": "1760000000000"},
            "ratio": {"doubleValue": 0.5},
            "createdAt": {"timestampValue": "2026-01-01T00:00:00Z"},
            "empty": {"arrayValue": {}},
            "nested": {"mapValue": {"fields": {"ok": {"booleanValue": false}}}}
        });

        let decoded = decode_fields(fields.as_object().unwrap()).unwrap();

        assert_eq!(decoded["lastCompletedDate"], json!(1_760_000_000_000_i64));
        assert_eq!(decoded["ratio"], json!(0.5));
        assert_eq!(decoded["createdAt"], json!("2026-01-01T00:00:00Z"));
        assert_eq!(decoded["empty"], json!([]));
        assert_eq!(decoded["nested"], json!({"ok": false}));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let fields = json!({"x": {"mysteryValue": 1}});
        assert_eq!(
            decode_fields(fields.as_object().unwrap()),
            Err(RemoteError::Serialization)
        );
    }

    #[test]
    fn test_encoded_document_decodes_to_itself() {
        let doc = json!({"id": "h1", "streak": 0, "tags": [{"a": 1.25}]});
        let fields = encode_fields(&doc).unwrap();
        assert_eq!(decode_fields(&fields).unwrap(), doc);
    }
}

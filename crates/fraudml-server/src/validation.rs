use fraudml_core::{FEATURE_NAMES, NUM_FEATURES};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::ServiceError;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const INVALID_NUMBER: &str = "A valid number is required.";

/// Per-field validation messages, kept in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<(&'static str, &'static str)>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push((field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, m)| *m)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(f, _)| *f)
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, message) in &self.0 {
            map.serialize_entry(field, &[message])?;
        }
        map.end()
    }
}

/// Type name reported when the body is valid JSON but not an object.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn parse_number(value: &Value) -> Result<f64, &'static str> {
    let parsed = match value {
        Value::Null => return Err(NOT_NULL),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).ok_or(INVALID_NUMBER)
}

/// Parse a request body into the feature vector in schema order.
///
/// Unknown keys are ignored. Every schema field is checked so the error
/// lists all problems at once.
pub fn parse_features(body: &[u8]) -> Result<[f64; NUM_FEATURES], ServiceError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ServiceError::MalformedJson(e.to_string()))?;
    let object = match &value {
        Value::Object(map) => map,
        other => return Err(ServiceError::NotAnObject(json_type_name(other))),
    };

    let mut features = [0.0; NUM_FEATURES];
    let mut errors = FieldErrors::default();
    for (slot, &name) in features.iter_mut().zip(FEATURE_NAMES.iter()) {
        match object.get(name) {
            None => errors.push(name, REQUIRED),
            Some(v) => match parse_number(v) {
                Ok(x) => *slot = x,
                Err(message) => errors.push(name, message),
            },
        }
    }

    if errors.is_empty() {
        Ok(features)
    } else {
        Err(ServiceError::Validation(errors))
    }
}

//! Generic catalog records with checked field access

use super::{CatalogError, CatalogResult};
use serde_json::{Map, Value};

/// One JSON object returned by the catalog
///
/// Nothing is validated up front. Each accessor reports a missing or
/// mistyped field as [`CatalogError::MalformedResponse`].
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    fields: Map<String, Value>,
}

impl CatalogRecord {
    /// Wrap a JSON value that must be an object
    pub fn from_value(value: Value) -> CatalogResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CatalogError::MalformedResponse(format!(
                "expected object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Wrap a JSON value that must be an array of objects
    pub fn list(value: Value) -> CatalogResult<Vec<Self>> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            other => Err(CatalogError::MalformedResponse(format!(
                "expected array, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Integer field; numeric strings are accepted
    pub fn int(&self, key: &str) -> CatalogResult<i64> {
        self.opt_int(key)?
            .ok_or_else(|| malformed(key, "is null"))
    }

    /// Integer field that may be null (but must be present)
    pub fn opt_int(&self, key: &str) -> CatalogResult<Option<i64>> {
        match self.require(key)? {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| malformed(key, "is not an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| malformed(key, "is not a numeric string")),
            _ => Err(malformed(key, "is not a number")),
        }
    }

    pub fn text(&self, key: &str) -> CatalogResult<String> {
        self.opt_text(key)?
            .ok_or_else(|| malformed(key, "is null"))
    }

    /// String field that may be null (but must be present)
    pub fn opt_text(&self, key: &str) -> CatalogResult<Option<String>> {
        match self.require(key)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(malformed(key, "is not a string")),
        }
    }

    /// Boolean field; also accepts 0/1 and "true"/"false"
    pub fn flag(&self, key: &str) -> CatalogResult<bool> {
        match self.require(key)? {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(malformed(key, "is not a boolean")),
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(malformed(key, "is not a boolean")),
            },
            _ => Err(malformed(key, "is not a boolean")),
        }
    }

    fn require(&self, key: &str) -> CatalogResult<&Value> {
        self.fields
            .get(key)
            .ok_or_else(|| malformed(key, "is missing"))
    }
}

fn malformed(key: &str, problem: &str) -> CatalogError {
    CatalogError::MalformedResponse(format!("field '{}' {}", key, problem))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

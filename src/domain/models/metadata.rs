use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

pub const MAX_METADATA_ENTRIES: usize = 64;
pub const MAX_METADATA_KEY_LEN: usize = 64;
pub const MAX_METADATA_DEPTH: usize = 8;

/// A single metadata value: a scalar, or an arbitrary JSON document for
/// structured payloads. Scalars are tried first when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl MetadataValue {
    fn validate(&self, key: &str) -> Result<(), DomainError> {
        match self {
            MetadataValue::Float(v) if !v.is_finite() => Err(DomainError::invalid_input(
                format!("metadata '{}' holds a non-finite number", key),
            )),
            MetadataValue::Json(value) if json_depth(value) > MAX_METADATA_DEPTH => {
                Err(DomainError::invalid_input(format!(
                    "metadata '{}' is nested deeper than {} levels",
                    key, MAX_METADATA_DEPTH
                )))
            }
            _ => Ok(()),
        }
    }
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}

impl From<serde_json::Value> for MetadataValue {
    fn from(v: serde_json::Value) -> Self {
        MetadataValue::Json(v)
    }
}

/// Free-form per-entity metadata, checked at the entity boundary by
/// [`Metadata::validate`] before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetadataValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.len() > MAX_METADATA_ENTRIES {
            return Err(DomainError::invalid_input(format!(
                "metadata has {} entries, at most {} are allowed",
                self.0.len(),
                MAX_METADATA_ENTRIES
            )));
        }

        for (key, value) in &self.0 {
            validate_key(key)?;
            value.validate(key)?;
        }

        Ok(())
    }

    /// Serialized form stored in relational columns; `None` when empty.
    pub fn to_json_string(&self) -> Result<Option<String>, DomainError> {
        if self.0.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&self.0)
            .map(Some)
            .map_err(|e| DomainError::internal(format!("Failed to encode metadata: {}", e)))
    }
}

fn validate_key(key: &str) -> Result<(), DomainError> {
    if key.trim().is_empty() {
        return Err(DomainError::invalid_input("metadata key must not be empty"));
    }
    if key.chars().count() > MAX_METADATA_KEY_LEN {
        return Err(DomainError::invalid_input(format!(
            "metadata key '{}' is longer than {} characters",
            key, MAX_METADATA_KEY_LEN
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(DomainError::invalid_input(format!(
            "metadata key {:?} contains control characters",
            key
        )));
    }
    Ok(())
}

fn json_depth(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) => 1 + items.iter().map(json_depth).max().unwrap_or(0),
        serde_json::Value::Object(map) => 1 + map.values().map(json_depth).max().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_prefers_scalars() {
        let metadata: Metadata =
            serde_json::from_str(r#"{"flag": true, "count": 3, "ratio": 0.5, "label": "x", "tags": ["a"]}"#)
                .unwrap();

        assert_eq!(metadata.get("flag"), Some(&MetadataValue::Bool(true)));
        assert_eq!(metadata.get("count"), Some(&MetadataValue::Integer(3)));
        assert_eq!(metadata.get("ratio"), Some(&MetadataValue::Float(0.5)));
        assert_eq!(metadata.get("label"), Some(&MetadataValue::Text("x".to_string())));
        assert_eq!(metadata.get("tags"), Some(&MetadataValue::Json(json!(["a"]))));
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        assert!(Metadata::new().with("", 1i64).validate().is_err());
        assert!(Metadata::new().with("a\u{7}b", 1i64).validate().is_err());
        assert!(Metadata::new().with("k".repeat(65), 1i64).validate().is_err());
        assert!(Metadata::new().with("k".repeat(64), 1i64).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_floats() {
        assert!(Metadata::new().with("score", f64::NAN).validate().is_err());
        assert!(Metadata::new().with("score", f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_validate_limits_entries_and_depth() {
        let mut metadata = Metadata::new();
        for i in 0..=MAX_METADATA_ENTRIES {
            metadata.insert(format!("k{}", i), i as i64);
        }
        assert!(metadata.validate().is_err());

        let deep = json!([[[[[[[[[1]]]]]]]]]);
        assert!(Metadata::new().with("deep", deep).validate().is_err());
        let shallow = json!({"a": {"b": [1, 2]}});
        assert!(Metadata::new().with("shallow", shallow).validate().is_ok());
    }

    #[test]
    fn test_json_string_roundtrip_keeps_values() {
        let metadata = Metadata::new().with("lang", "en").with("weight", 2i64);
        let json = metadata.to_json_string().unwrap().unwrap();

        assert_eq!(json, r#"{"lang":"en","weight":2}"#);
        assert_eq!(serde_json::from_str::<Metadata>(&json).unwrap(), metadata);
    }

    #[test]
    fn test_empty_metadata_is_stored_as_null() {
        assert_eq!(Metadata::new().to_json_string().unwrap(), None);
    }
}

//! Dynamic Document Model
//!
//! Loosely-typed values as produced by a schema-less document decoder.
//! Administrative command responses arrive in this shape; the typed
//! decoders in this module tree walk them without a full schema.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Untyped key-value payload of one command response.
///
/// Ordered so that every pass over the same document visits keys in the
/// same order, which keeps floating-point sums reproducible.
pub type RawDocument = BTreeMap<String, DocValue>;

/// A single dynamically-typed value
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    /// High-precision decimal kept in its textual form
    Decimal(String),
    String(String),
    Array(Vec<DocValue>),
    Document(RawDocument),
}

impl DocValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DocValue::Null)
    }

    /// Borrow the nested document, if this value is one
    pub fn as_document(&self) -> Option<&RawDocument> {
        match self {
            DocValue::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Short name of the variant, used in log lines
    pub fn type_name(&self) -> &'static str {
        match self {
            DocValue::Null => "null",
            DocValue::Bool(_) => "bool",
            DocValue::Int32(_) => "int32",
            DocValue::Int64(_) => "int64",
            DocValue::UInt32(_) => "uint32",
            DocValue::UInt64(_) => "uint64",
            DocValue::Float32(_) => "float32",
            DocValue::Float64(_) => "float64",
            DocValue::Decimal(_) => "decimal",
            DocValue::String(_) => "string",
            DocValue::Array(_) => "array",
            DocValue::Document(_) => "document",
        }
    }
}

impl From<serde_json::Value> for DocValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DocValue::Null,
            serde_json::Value::Bool(b) => DocValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    DocValue::UInt64(u)
                } else if let Some(i) = n.as_i64() {
                    DocValue::Int64(i)
                } else {
                    // Always Some without arbitrary_precision
                    n.as_f64().map(DocValue::Float64).unwrap_or(DocValue::Null)
                }
            }
            serde_json::Value::String(s) => DocValue::String(s),
            serde_json::Value::Array(items) => {
                DocValue::Array(items.into_iter().map(DocValue::from).collect())
            }
            serde_json::Value::Object(map) => DocValue::Document(
                map.into_iter().map(|(k, v)| (k, DocValue::from(v))).collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for DocValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(DocValue::from)
    }
}

/// Parse a JSON text into a top-level document.
///
/// Returns `None` when the text is valid JSON but not an object.
pub fn document_from_json(text: &str) -> Result<Option<RawDocument>, serde_json::Error> {
    let value: DocValue = serde_json::from_str(text)?;
    Ok(match value {
        DocValue::Document(doc) => Some(doc),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_numbers_keep_their_kind() {
        let doc = document_from_json(r#"{"a": 3, "b": -4, "c": 1.5}"#)
            .unwrap()
            .unwrap();

        assert_eq!(doc["a"], DocValue::UInt64(3));
        assert_eq!(doc["b"], DocValue::Int64(-4));
        assert_eq!(doc["c"], DocValue::Float64(1.5));
    }

    #[test]
    fn test_nested_objects_become_documents() {
        let doc = document_from_json(r#"{"pool": {"h:1": {"inUse": 0}}}"#)
            .unwrap()
            .unwrap();

        let pool = doc["pool"].as_document().unwrap();
        assert!(pool["h:1"].as_document().is_some());
    }

    #[test]
    fn test_non_object_top_level() {
        assert_eq!(document_from_json("[1, 2]").unwrap(), None);
        assert!(document_from_json("{not json").is_err());
    }
}

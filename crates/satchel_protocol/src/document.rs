//! JSON documents keyed by id.

use crate::error::{ProtocolError, ProtocolResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A JSON-shaped record with a unique string `id`.
///
/// Documents are the unit of storage and synchronization. Collections do
/// not enforce any schema beyond the `id` field; everything else in the
/// object is opaque to the sync layer.
///
/// Construction validates the `id` once, so every `Document` held by the
/// cache or the queue is known to be addressable.
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    /// Creates a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a JSON object or its `id`
    /// field is missing, empty, or not a string.
    pub fn new(value: Value) -> ProtocolResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ProtocolError::NotAnObject(json_kind(&value)))?;

        match object.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(Self(value)),
            _ => Err(ProtocolError::MissingId),
        }
    }

    /// Creates a document by serializing an arbitrary record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the serialized form
    /// lacks a usable `id`.
    pub fn from_record<T: Serialize>(record: &T) -> ProtocolResult<Self> {
        Self::new(serde_json::to_value(record)?)
    }

    /// Decodes the document back into a typed record.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the record shape.
    pub fn to_record<T: DeserializeOwned>(&self) -> ProtocolResult<T> {
        Ok(serde_json::from_value(self.0.clone())?)
    }

    /// Returns the document id.
    pub fn id(&self) -> &str {
        // Validated at construction.
        self.0.get("id").and_then(Value::as_str).unwrap_or("")
    }

    /// Returns the underlying JSON value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consumes the document, returning the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Decodes a JSON array into a list of documents.
    ///
    /// This is the shape the remote endpoint returns for a fetch-all.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not an array or any element is
    /// not a valid document.
    pub fn array_from_value(value: Value) -> ProtocolResult<Vec<Self>> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::new).collect(),
            other => Err(ProtocolError::UnexpectedShape(format!(
                "expected array of documents, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

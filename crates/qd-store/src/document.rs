//! Documents as the store delivers them.

use chrono::{DateTime, Utc};
use qd_core::enums::Collection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;
use crate::timestamp::{TimestampFields, normalize_timestamps};

/// Top-level fields of a document.
pub type Fields = serde_json::Map<String, Value>;

/// A stored document: store-assigned id plus its fields. The id is not part
/// of the fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Map into an entity: copy the fields, attach the id, normalize the
    /// timestamp fields against `now`, then deserialize.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Decode` if the normalized fields do not fit `T`.
    pub fn decode<T: DeserializeOwned>(
        &self,
        collection: Collection,
        timestamps: &TimestampFields,
        now: DateTime<Utc>,
    ) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".into(), Value::String(self.id.clone()));
        normalize_timestamps(&mut fields, timestamps, now);
        serde_json::from_value(Value::Object(fields)).map_err(|e| StoreError::Decode {
            collection,
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Serialize a payload into document fields.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if `value` fails to serialize, or
/// `StoreError::Other` if it does not serialize to a JSON object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Other(anyhow::anyhow!(
            "expected an object payload, got {other}"
        ))),
    }
}

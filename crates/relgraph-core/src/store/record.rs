//! Stored records.

use serde_json::{Map, Value};

use super::key::RecordKey;

/// One stored entity: its flat field map plus the store identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Canonical store key.
    pub key: RecordKey,
    /// Identity value as written, injected as the synthetic identity.
    pub identity: Value,
    /// Field values, including the identity field.
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record keyed by the value of `identity_field`.
    ///
    /// Returns `None` when the field is absent or cannot be a key.
    pub fn keyed_by(identity_field: &str, fields: Map<String, Value>) -> Option<Self> {
        let identity = fields.get(identity_field)?.clone();
        let key = RecordKey::from_value(&identity)?;
        Some(Self {
            key,
            identity,
            fields,
        })
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Canonical key of a field value, if it holds a usable one.
    pub fn key_of(&self, field: &str) -> Option<RecordKey> {
        self.get(field).and_then(RecordKey::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_keyed_by_identity() {
        let record = Record::keyed_by("id", fields(json!({"id": 3, "user_id": 1}))).unwrap();
        assert_eq!(record.key, RecordKey::new("3"));
        assert_eq!(record.identity, json!(3));
        assert_eq!(record.key_of("user_id"), Some(RecordKey::new("1")));
    }

    #[test]
    fn test_missing_or_null_identity() {
        assert!(Record::keyed_by("id", fields(json!({"name": "x"}))).is_none());
        assert!(Record::keyed_by("id", fields(json!({"id": null}))).is_none());
    }

    #[test]
    fn test_null_foreign_key_has_no_key() {
        let record = Record::keyed_by("id", fields(json!({"id": 1, "user_id": null}))).unwrap();
        assert!(record.key_of("user_id").is_none());
        assert!(record.key_of("missing").is_none());
    }
}

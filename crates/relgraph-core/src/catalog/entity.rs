//! Entity type definitions.

use serde::{Deserialize, Serialize};

/// Identity field used when a type does not name one.
pub const DEFAULT_IDENTITY_FIELD: &str = "id";

fn default_identity_field() -> String {
    DEFAULT_IDENTITY_FIELD.to_string()
}

/// An entity type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity type name (unique within schema).
    pub name: String,
    /// Name of the identity field records are keyed by.
    #[serde(default = "default_identity_field")]
    pub identity_field: String,
}

impl EntityDef {
    /// Create a new entity definition.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identity_field: identity_field.into(),
        }
    }

    /// Create an entity keyed by `id`.
    pub fn keyed_by_id(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_IDENTITY_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_defaults_to_id() {
        let entity: EntityDef = serde_json::from_str(r#"{"name":"users"}"#).unwrap();
        assert_eq!(entity, EntityDef::keyed_by_id("users"));
        assert_eq!(entity.identity_field, "id");
    }
}

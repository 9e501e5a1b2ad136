//! Relation schema: entity types plus the relation fields declared on them.

use serde::{Deserialize, Serialize};

use super::entity::{EntityDef, DEFAULT_IDENTITY_FIELD};
use super::relation::RelationDef;

/// Read-only view of declared entity types and their relations.
///
/// Implementations must be deterministic: `relations_from` returns the same
/// relations in the same (declaration) order on every call. The resolver
/// never mutates the schema and looks it up lazily, per query.
pub trait SchemaAccessor {
    /// Get an entity definition by name.
    fn entity(&self, name: &str) -> Option<&EntityDef>;

    /// Relations declared on `entity`, in declaration order.
    fn relations_from(&self, entity: &str) -> Vec<&RelationDef>;

    /// Look up one relation declared on `entity`.
    fn relation(&self, entity: &str, name: &str) -> Option<&RelationDef> {
        self.relations_from(entity)
            .into_iter()
            .find(|r| r.name == name)
    }

    /// Identity field of `entity`, `id` when the type is not declared.
    fn identity_field(&self, entity: &str) -> &str {
        self.entity(entity)
            .map(|e| e.identity_field.as_str())
            .unwrap_or(DEFAULT_IDENTITY_FIELD)
    }
}

/// An in-memory schema, deserializable from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Entity definitions.
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    /// Relation definitions, in declaration order.
    #[serde(default)]
    pub relations: Vec<RelationDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the schema, replacing one with the same name.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.retain(|e| e.name != entity.name);
        self.entities.push(entity);
        self
    }

    /// Add a relation to the schema, replacing one with the same source and name.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        match self
            .relations
            .iter_mut()
            .find(|r| r.from_entity == relation.from_entity && r.name == relation.name)
        {
            Some(existing) => *existing = relation,
            None => self.relations.push(relation),
        }
        self
    }
}

impl SchemaAccessor for Schema {
    fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .iter()
            .filter(|r| r.from_entity == entity)
            .collect()
    }
}

//! Relation definitions between entity types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a relation field.
///
/// The set is closed: every resolution strategy matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// Forward one-to-one: at most one related record holds our key.
    OneToOne,
    /// Forward one-to-many: every related record holding our key.
    OneToMany,
    /// Inverse: we hold the foreign key of a single parent.
    BelongsTo,
}

impl RelationKind {
    /// Check if the relation attaches a sequence rather than a single record.
    pub fn is_plural(self) -> bool {
        matches!(self, RelationKind::OneToMany)
    }

    /// Value attached when nothing is related: `null` or `[]`.
    pub fn empty_value(self) -> Value {
        if self.is_plural() {
            Value::Array(Vec::new())
        } else {
            Value::Null
        }
    }
}

/// A relation field declared on an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation field name (unique within its source entity).
    pub name: String,
    /// Entity type declaring the relation.
    pub from_entity: String,
    /// Related entity type.
    pub to_entity: String,
    /// Relation kind.
    pub kind: RelationKind,
    /// Foreign key field. Lives on `to_entity` for forward relations and on
    /// `from_entity` for `BelongsTo`.
    pub foreign_key: String,
    /// Field on `from_entity` matched against the foreign key of forward
    /// relations. Defaults to the identity field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_key: Option<String>,
    /// Field on `to_entity` the foreign key of a `BelongsTo` points at.
    /// Defaults to the identity field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
}

impl RelationDef {
    fn new(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        kind: RelationKind,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            kind,
            foreign_key: foreign_key.into(),
            local_key: None,
            owner_key: None,
        }
    }

    /// Create a one-to-one relation (`foreign_key` lives on `to_entity`).
    pub fn one_to_one(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(name, from_entity, to_entity, RelationKind::OneToOne, foreign_key)
    }

    /// Create a one-to-many relation (`foreign_key` lives on `to_entity`).
    pub fn one_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(name, from_entity, to_entity, RelationKind::OneToMany, foreign_key)
    }

    /// Create a belongs-to relation (`foreign_key` lives on `from_entity`).
    pub fn belongs_to(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(name, from_entity, to_entity, RelationKind::BelongsTo, foreign_key)
    }

    /// Set the local key of a forward relation.
    pub fn with_local_key(mut self, key: impl Into<String>) -> Self {
        self.local_key = Some(key.into());
        self
    }

    /// Set the owner key of a belongs-to relation.
    pub fn with_owner_key(mut self, key: impl Into<String>) -> Self {
        self.owner_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_to_many_relation() {
        let rel = RelationDef::one_to_many("posts", "users", "posts", "user_id");

        assert_eq!(rel.kind, RelationKind::OneToMany);
        assert!(rel.kind.is_plural());
        assert_eq!(rel.kind.empty_value(), Value::Array(vec![]));
        assert!(rel.local_key.is_none());
    }

    #[test]
    fn test_belongs_to_relation() {
        let rel = RelationDef::belongs_to("author", "posts", "users", "user_id")
            .with_owner_key("uuid");

        assert_eq!(rel.kind, RelationKind::BelongsTo);
        assert_eq!(rel.kind.empty_value(), Value::Null);
        assert_eq!(rel.owner_key.as_deref(), Some("uuid"));
    }

    #[test]
    fn test_deserialize_snake_case_kind() {
        let rel: RelationDef = serde_json::from_str(
            r#"{"name":"phone","from_entity":"users","to_entity":"phones",
                "kind":"one_to_one","foreign_key":"user_id"}"#,
        )
        .unwrap();
        assert_eq!(rel, RelationDef::one_to_one("phone", "users", "phones", "user_id"));
    }
}

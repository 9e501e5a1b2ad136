//! Turns hydrated record trees into owned JSON objects.

use serde_json::{Map, Value};

use crate::catalog::SchemaAccessor;
use crate::config::LoaderConfig;

use super::resolver::{Attached, Hydrated};

/// Deep-copies hydrated records and injects the synthetic identity.
pub struct Materializer<'a, C: ?Sized> {
    schema: &'a C,
    config: &'a LoaderConfig,
}

impl<'a, C: SchemaAccessor + ?Sized> Materializer<'a, C> {
    pub fn new(schema: &'a C, config: &'a LoaderConfig) -> Self {
        Self { schema, config }
    }

    /// Materialize a sequence of roots.
    pub fn materialize_all(&self, hydrated: &[Hydrated<'_>]) -> Vec<Value> {
        hydrated.iter().map(|h| self.materialize(h)).collect()
    }

    /// Materialize one record and everything attached below it.
    ///
    /// Field precedence, lowest first: stored fields, empty values for
    /// unloaded relations (when enabled), attached relations. The synthetic
    /// identity is written last.
    pub fn materialize(&self, hydrated: &Hydrated<'_>) -> Value {
        let mut object: Map<String, Value> = hydrated.record.fields.clone();

        if self.config.fill_unloaded_relations {
            for relation in self.schema.relations_from(&hydrated.entity) {
                object.insert(relation.name.clone(), relation.kind.empty_value());
            }
        }

        for (name, attached) in &hydrated.relations {
            let value = match attached {
                Attached::One(Some(related)) => self.materialize(related),
                Attached::One(None) => Value::Null,
                Attached::Many(related) => Value::Array(self.materialize_all(related)),
            };
            object.insert(name.clone(), value);
        }

        object.insert(
            self.config.synthetic_id_field.clone(),
            hydrated.record.identity.clone(),
        );

        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, RelationDef, Schema};
    use crate::store::{EntityStore, MemoryStore, RecordKey};
    use serde_json::json;

    fn create_test_schema() -> Schema {
        Schema::new()
            .with_entity(EntityDef::keyed_by_id("users"))
            .with_entity(EntityDef::keyed_by_id("posts"))
            .with_relation(RelationDef::one_to_one("phone", "users", "phones", "user_id"))
            .with_relation(RelationDef::one_to_many("posts", "users", "posts", "user_id"))
    }

    fn setup_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert_value("users", "id", json!({"id": 1, "name": "Ada", "tags": ["x"]}))
            .unwrap();
        store
            .insert_value("posts", "id", json!({"id": 3, "user_id": 1}))
            .unwrap();
        store
    }

    #[test]
    fn test_injects_synthetic_id_at_every_level() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let config = LoaderConfig::default();
        let user = store.get("users", &RecordKey::new("1")).unwrap();
        let post = store.get("posts", &RecordKey::new("3")).unwrap();

        let hydrated = Hydrated {
            entity: "users".into(),
            record: user,
            relations: vec![(
                "posts".into(),
                Attached::Many(vec![Hydrated {
                    entity: "posts".into(),
                    record: post,
                    relations: vec![],
                }]),
            )],
        };

        let value = Materializer::new(&schema, &config).materialize(&hydrated);
        assert_eq!(
            value,
            json!({
                "$id": 1, "id": 1, "name": "Ada", "tags": ["x"],
                "posts": [{ "$id": 3, "id": 3, "user_id": 1 }]
            })
        );
    }

    #[test]
    fn test_unrequested_relations_are_omitted_by_default() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let config = LoaderConfig::default();
        let user = store.get("users", &RecordKey::new("1")).unwrap();

        let hydrated = Hydrated {
            entity: "users".into(),
            record: user,
            relations: vec![("phone".into(), Attached::One(None))],
        };

        let value = Materializer::new(&schema, &config).materialize(&hydrated);
        assert_eq!(value["phone"], Value::Null);
        assert!(value.get("posts").is_none());
    }

    #[test]
    fn test_fill_unloaded_relations() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let config = LoaderConfig::default()
            .with_fill_unloaded_relations(true)
            .with_synthetic_id_field("_key");
        let user = store.get("users", &RecordKey::new("1")).unwrap();

        let hydrated = Hydrated {
            entity: "users".into(),
            record: user,
            relations: vec![],
        };

        let value = Materializer::new(&schema, &config).materialize(&hydrated);
        assert_eq!(value["phone"], Value::Null);
        assert_eq!(value["posts"], json!([]));
        assert_eq!(value["_key"], json!(1));
        assert!(value.get("$id").is_none());
    }

    #[test]
    fn test_output_is_a_deep_copy() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let config = LoaderConfig::default();
        let user = store.get("users", &RecordKey::new("1")).unwrap();

        let hydrated = Hydrated {
            entity: "users".into(),
            record: user,
            relations: vec![],
        };
        let mut value = Materializer::new(&schema, &config).materialize(&hydrated);
        value["tags"][0] = json!("changed");

        assert_eq!(user.get("tags"), Some(&json!(["x"])));
    }
}

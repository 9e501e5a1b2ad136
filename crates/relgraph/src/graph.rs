//! Shared graph handle: schema, lock-protected store and loader config.

use parking_lot::{RwLock, RwLockReadGuard};
use relgraph_core::{
    Error as CoreError, LoaderConfig, MemoryStore, Query, RecordKey, Schema, SchemaAccessor,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;

/// A relation schema plus a normalized in-memory store.
///
/// Writes take the store's write lock; reads go through a [`Snapshot`],
/// which holds the read lock for as long as it lives. Every query run on one
/// snapshot sees the same store contents.
#[derive(Debug)]
pub struct Graph {
    schema: Schema,
    store: RwLock<MemoryStore>,
    config: LoaderConfig,
}

impl Graph {
    /// Create an empty graph over `schema` with the default config.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            store: RwLock::new(MemoryStore::new()),
            config: LoaderConfig::default(),
        }
    }

    /// Set the loader config used by snapshot queries.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Insert one flat record of a declared entity type.
    ///
    /// An existing record with the same identity is replaced in place.
    pub fn insert(&self, entity: &str, record: Value) -> Result<RecordKey> {
        let identity_field = self.identity_field_of(entity)?;
        let key = self.store.write().insert_value(entity, identity_field, record)?;
        Ok(key)
    }

    /// Insert several records of one type under a single write lock.
    pub fn insert_many<I>(&self, entity: &str, records: I) -> Result<Vec<RecordKey>>
    where
        I: IntoIterator<Item = Value>,
    {
        let identity_field = self.identity_field_of(entity)?;
        let mut store = self.store.write();

        let keys = records
            .into_iter()
            .map(|record| store.insert_value(entity, identity_field, record))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!(entity = %entity, count = keys.len(), "inserted records");
        Ok(keys)
    }

    /// Load a `{ "entity": [record, ...], ... }` document.
    ///
    /// Returns the number of records written.
    pub fn load_json(&self, data: Value) -> Result<usize> {
        let Value::Object(tables) = data else {
            return Err(CoreError::InvalidData(
                "data must be an object of entity tables".to_string(),
            )
            .into());
        };

        let mut total = 0;
        for (entity, records) in tables {
            let Value::Array(records) = records else {
                return Err(CoreError::InvalidData(format!(
                    "table '{}' must be an array of records",
                    entity
                ))
                .into());
            };
            total += self.insert_many(&entity, records)?.len();
        }

        info!(records = total, "loaded data");
        Ok(total)
    }

    /// Number of stored records of one type.
    pub fn len(&self, entity: &str) -> usize {
        self.store.read().len(entity)
    }

    /// Check if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    /// Take a consistent read view of the store.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            graph: self,
            store: self.store.read(),
        }
    }

    fn identity_field_of(&self, entity: &str) -> Result<&str> {
        if self.schema.entity(entity).is_none() {
            return Err(CoreError::UnknownEntity(entity.to_string()).into());
        }
        Ok(self.schema.identity_field(entity))
    }
}

/// A read view of a [`Graph`]'s store.
pub struct Snapshot<'g> {
    graph: &'g Graph,
    store: RwLockReadGuard<'g, MemoryStore>,
}

impl<'g> Snapshot<'g> {
    /// Start an eager-loading query over `entity`.
    pub fn query(&self, entity: &str) -> Query<'_, MemoryStore, Schema> {
        Query::new(&*self.store, &self.graph.schema, entity).with_config(self.graph.config.clone())
    }

    /// The store as seen by this snapshot.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

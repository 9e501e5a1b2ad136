//! In-memory store: one insertion-ordered table per entity type.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::key::RecordKey;
use super::record::Record;
use super::EntityStore;
use crate::error::Error;

#[derive(Debug, Default, Clone)]
struct Table {
    records: Vec<Record>,
    index: HashMap<RecordKey, usize>,
}

/// A normalized, flat entity store held in memory.
///
/// Records are kept in insertion order. Writing an identity that already
/// exists replaces the record in place, keeping its position.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a flat record keyed by `identity_field`.
    pub fn insert(
        &mut self,
        entity: &str,
        identity_field: &str,
        fields: Map<String, Value>,
    ) -> Result<RecordKey, Error> {
        let record =
            Record::keyed_by(identity_field, fields).ok_or_else(|| Error::MissingIdentity {
                entity: entity.to_string(),
                field: identity_field.to_string(),
            })?;
        let key = record.key.clone();

        let table = self.tables.entry(entity.to_string()).or_default();
        match table.index.get(&key) {
            Some(&position) => {
                debug!(entity = %entity, key = %key, "replacing existing record");
                table.records[position] = record;
            }
            None => {
                table.index.insert(key.clone(), table.records.len());
                table.records.push(record);
            }
        }

        Ok(key)
    }

    /// Insert a JSON object keyed by `identity_field`.
    pub fn insert_value(
        &mut self,
        entity: &str,
        identity_field: &str,
        value: Value,
    ) -> Result<RecordKey, Error> {
        match value {
            Value::Object(fields) => self.insert(entity, identity_field, fields),
            other => Err(Error::InvalidData(format!(
                "record of type '{}' must be a JSON object, got {}",
                entity, other
            ))),
        }
    }

    /// Number of records of one type.
    pub fn len(&self, entity: &str) -> usize {
        self.tables.get(entity).map_or(0, |t| t.records.len())
    }

    /// Check if the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(|t| t.records.is_empty())
    }
}

impl EntityStore for MemoryStore {
    fn records<'a>(&'a self, entity: &str) -> Box<dyn Iterator<Item = &'a Record> + 'a> {
        match self.tables.get(entity) {
            Some(table) => Box::new(table.records.iter()),
            None => Box::new(std::iter::empty()),
        }
    }

    fn get(&self, entity: &str, key: &RecordKey) -> Option<&Record> {
        let table = self.tables.get(entity)?;
        table.index.get(key).map(|&i| &table.records[i])
    }

    fn count(&self, entity: &str) -> usize {
        self.len(entity)
    }
}

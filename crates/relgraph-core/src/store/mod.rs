//! Read access to the normalized entity store.
//!
//! The resolver reads entities only through [`EntityStore`]; [`MemoryStore`]
//! is the in-memory implementation used by the facade, the CLI and tests.

mod key;
mod memory;
mod record;

pub use key::RecordKey;
pub use memory::MemoryStore;
pub use record::Record;

/// Read-only access to stored entities, grouped by entity type.
pub trait EntityStore {
    /// All records of a type, in insertion order.
    fn records<'a>(&'a self, entity: &str) -> Box<dyn Iterator<Item = &'a Record> + 'a>;

    /// Look up a record by its identity key.
    fn get(&self, entity: &str, key: &RecordKey) -> Option<&Record>;

    /// Number of records of a type.
    fn count(&self, entity: &str) -> usize {
        self.records(entity).count()
    }

    /// Records whose `field` holds `key`, in insertion order.
    fn scan_by_field<'a>(
        &'a self,
        entity: &str,
        field: &str,
        key: &RecordKey,
    ) -> Vec<&'a Record> {
        self.records(entity)
            .filter(|r| r.key_of(field).as_ref() == Some(key))
            .collect()
    }
}

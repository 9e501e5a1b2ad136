//! Join strategies for matching related records by key.
//!
//! - NestedLoop: scan the related table for every lookup, O(M) each
//! - HashJoin: build a key -> records index once per call, O(1) lookups
//!
//! Both return matches in store insertion order.

use std::collections::HashMap;

use tracing::debug;

use crate::store::{EntityStore, Record, RecordKey};

/// Join strategy selection for one related table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Linear scan per lookup, no setup cost.
    NestedLoop,
    /// Hash index built on first use and reused for the rest of the call.
    HashJoin,
}

impl JoinStrategy {
    /// Use a hash join once the related table outgrows `threshold`.
    pub fn select(table_len: usize, threshold: usize) -> Self {
        if table_len > threshold {
            JoinStrategy::HashJoin
        } else {
            JoinStrategy::NestedLoop
        }
    }
}

/// Records of one type bucketed by the key held in one field.
pub struct KeyIndex<'s> {
    buckets: HashMap<RecordKey, Vec<&'s Record>>,
}

impl<'s> KeyIndex<'s> {
    /// Build phase: scan `entity` once.
    pub fn build<S>(store: &'s S, entity: &str, field: &str) -> Self
    where
        S: EntityStore + ?Sized,
    {
        let mut buckets: HashMap<RecordKey, Vec<&'s Record>> = HashMap::new();
        for record in store.records(entity) {
            if let Some(key) = record.key_of(field) {
                buckets.entry(key).or_default().push(record);
            }
        }
        Self { buckets }
    }

    /// Lookup phase.
    pub fn get(&self, key: &RecordKey) -> &[&'s Record] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Call-local join state: hash indexes keyed by (entity, field).
pub struct JoinCache<'s> {
    threshold: usize,
    indexes: HashMap<(String, String), KeyIndex<'s>>,
}

impl<'s> JoinCache<'s> {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            indexes: HashMap::new(),
        }
    }

    /// Records of `entity` whose `field` holds `key`.
    pub fn matching<S>(
        &mut self,
        store: &'s S,
        entity: &str,
        field: &str,
        key: &RecordKey,
    ) -> Vec<&'s Record>
    where
        S: EntityStore + ?Sized,
    {
        let cache_key = (entity.to_string(), field.to_string());
        if let Some(index) = self.indexes.get(&cache_key) {
            return index.get(key).to_vec();
        }

        match JoinStrategy::select(store.count(entity), self.threshold) {
            JoinStrategy::NestedLoop => store.scan_by_field(entity, field, key),
            JoinStrategy::HashJoin => {
                debug!(entity = %entity, field = %field, "building hash join index");
                let index = KeyIndex::build(store, entity, field);
                let matched = index.get(key).to_vec();
                self.indexes.insert(cache_key, index);
                matched
            }
        }
    }

    /// Number of hash indexes built so far.
    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }
}

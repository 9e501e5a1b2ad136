//! relgraph-core: relation eager loading over a normalized entity store.
//!
//! Records live flat, one table per entity type, and reference each other
//! through foreign-key fields. A [`Query`] follows declared relations from a
//! set of root records and returns nested, self-contained JSON trees.

pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod store;

pub use catalog::{EntityDef, RelationDef, RelationKind, Schema, SchemaAccessor};
pub use config::LoaderConfig;
pub use error::{Error, Result};
pub use query::{Depth, InclusionTree, Query};
pub use store::{EntityStore, MemoryStore, Record, RecordKey};

pub use relgraph_lang as lang;

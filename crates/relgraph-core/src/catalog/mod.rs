//! Relation schema for relgraph.
//!
//! The catalog describes entity types, their identity fields and the relation
//! fields declared between them. The resolver consumes it only through
//! [`SchemaAccessor`].

mod entity;
mod relation;
mod schema;

pub use entity::{EntityDef, DEFAULT_IDENTITY_FIELD};
pub use relation::{RelationDef, RelationKind};
pub use schema::{Schema, SchemaAccessor};

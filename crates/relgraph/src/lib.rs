//! relgraph: eager loading of related records over a normalized in-memory
//! store.
//!
//! # Example
//!
//! ```
//! use relgraph::{EntityDef, Graph, RelationDef, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .with_entity(EntityDef::keyed_by_id("users"))
//!     .with_entity(EntityDef::keyed_by_id("posts"))
//!     .with_relation(RelationDef::one_to_many("posts", "users", "posts", "user_id"))
//!     .with_relation(RelationDef::belongs_to("user", "posts", "users", "user_id"));
//!
//! let graph = Graph::new(schema);
//! graph.insert("users", json!({ "id": 1, "name": "Ada" })).unwrap();
//! graph.insert("posts", json!({ "id": 10, "user_id": 1 })).unwrap();
//!
//! let snapshot = graph.snapshot();
//! let post = snapshot.query("posts").with("user.posts").first().unwrap();
//! assert_eq!(post["user"]["name"], "Ada");
//! assert_eq!(post["user"]["posts"][0]["$id"], 10);
//! ```

mod error;
mod fixture;
mod graph;

pub use error::{Error, Result};
pub use fixture::Fixture;
pub use graph::{Graph, Snapshot};

pub use relgraph_core::lang::{parse_path, ParseError};
pub use relgraph_core::catalog::{EntityDef, RelationDef, RelationKind, Schema, SchemaAccessor};
pub use relgraph_core::query::{Depth, Query};
pub use relgraph_core::store::{EntityStore, MemoryStore, RecordKey};
pub use relgraph_core::LoaderConfig;

pub use relgraph_core as core;

//! JSON fixtures: a schema, flat entity tables and an optional config.
//!
//! ```json
//! {
//!   "schema": {
//!     "entities": [{ "name": "users" }, { "name": "posts" }],
//!     "relations": [
//!       { "name": "posts", "from_entity": "users", "to_entity": "posts",
//!         "kind": "one_to_many", "foreign_key": "user_id" }
//!     ]
//!   },
//!   "data": { "users": [{ "id": 1 }], "posts": [{ "id": 2, "user_id": 1 }] },
//!   "config": { "fill_unloaded_relations": true }
//! }
//! ```

use std::path::Path;

use relgraph_core::{LoaderConfig, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::graph::Graph;

/// A self-contained graph description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub schema: Schema,
    /// Records per entity type, in insertion order.
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub config: Option<LoaderConfig>,
}

impl Fixture {
    /// Parse a fixture document.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and parse a fixture file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&source)
    }

    /// Build a graph and load every table into it.
    pub fn into_graph(self) -> Result<Graph> {
        let graph = Graph::new(self.schema).with_config(self.config.unwrap_or_default());
        graph.load_json(Value::Object(self.data))?;
        Ok(graph)
    }
}

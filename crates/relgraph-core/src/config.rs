//! Loader configuration.

use serde::{Deserialize, Serialize};

/// Default name of the injected synthetic identity key.
pub const DEFAULT_SYNTHETIC_ID_FIELD: &str = "$id";

/// Settings that shape how relations are resolved and materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Key under which each materialized entity carries its store identity.
    pub synthetic_id_field: String,

    /// Materialize relations that were not requested as `null` / `[]`
    /// instead of omitting them.
    pub fill_unloaded_relations: bool,

    /// Optional cap on the ancestor chain a recursive request may build,
    /// even when its depth is unbounded. Reaching it behaves like depth
    /// exhaustion. `None` leaves unbounded requests to the ancestor guard.
    pub max_recursion_depth: Option<usize>,

    /// Related tables larger than this are matched through a hash index
    /// built once per resolution call.
    pub hash_join_threshold: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            synthetic_id_field: DEFAULT_SYNTHETIC_ID_FIELD.to_string(),
            fill_unloaded_relations: false,
            max_recursion_depth: None,
            hash_join_threshold: 64,
        }
    }
}

impl LoaderConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the synthetic identity key.
    pub fn with_synthetic_id_field(mut self, field: impl Into<String>) -> Self {
        self.synthetic_id_field = field.into();
        self
    }

    /// Fill relations that were not requested with their empty value.
    pub fn with_fill_unloaded_relations(mut self, fill: bool) -> Self {
        self.fill_unloaded_relations = fill;
        self
    }

    /// Cap the ancestor chain of recursive requests.
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = Some(depth);
        self
    }

    /// Set the table size above which hash joins are used.
    pub fn with_hash_join_threshold(mut self, threshold: usize) -> Self {
        self.hash_join_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.synthetic_id_field, "$id");
        assert!(!config.fill_unloaded_relations);
        assert_eq!(config.max_recursion_depth, None);
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{ "fill_unloaded_relations": true }"#).unwrap();
        assert!(config.fill_unloaded_relations);
        assert_eq!(config.synthetic_id_field, "$id");
        assert_eq!(config.hash_join_threshold, 64);
        assert_eq!(config.max_recursion_depth, None);

        let capped: LoaderConfig =
            serde_json::from_str(r#"{ "max_recursion_depth": 8 }"#).unwrap();
        assert_eq!(capped.max_recursion_depth, Some(8));
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::new()
            .with_synthetic_id_field("_key")
            .with_max_recursion_depth(3)
            .with_hash_join_threshold(0);
        assert_eq!(config.synthetic_id_field, "_key");
        assert_eq!(config.max_recursion_depth, Some(3));
        assert_eq!(config.hash_join_threshold, 0);
    }
}

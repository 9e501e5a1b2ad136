//! Query surface: collect relation requests, then resolve and materialize.

use relgraph_lang::PathExpr;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::catalog::SchemaAccessor;
use crate::config::LoaderConfig;
use crate::store::{EntityStore, Record, RecordKey};

use super::materializer::Materializer;
use super::resolver::GraphResolver;
use super::tree::{Depth, InclusionTree, InclusionTreeBuilder, Load};

/// Which roots a query starts from.
#[derive(Debug, Clone)]
enum RootFilter {
    All,
    Key(RecordKey),
    /// `where_key` was given a value that cannot be a key.
    Nothing,
}

/// An eager-loading query over one entity type.
///
/// ```
/// use relgraph_core::catalog::{EntityDef, RelationDef, Schema};
/// use relgraph_core::store::MemoryStore;
/// use relgraph_core::query::Query;
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .with_entity(EntityDef::keyed_by_id("users"))
///     .with_entity(EntityDef::keyed_by_id("posts"))
///     .with_relation(RelationDef::one_to_many("posts", "users", "posts", "user_id"));
///
/// let mut store = MemoryStore::new();
/// store.insert_value("users", "id", json!({"id": 1})).unwrap();
/// store.insert_value("posts", "id", json!({"id": 2, "user_id": 1})).unwrap();
///
/// let user = Query::new(&store, &schema, "users").with("posts").first().unwrap();
/// assert_eq!(user["posts"][0]["id"], 2);
/// ```
pub struct Query<'s, S: ?Sized, C: ?Sized> {
    store: &'s S,
    schema: &'s C,
    config: LoaderConfig,
    entity: String,
    loads: Vec<Load>,
    roots: RootFilter,
}

impl<'s, S, C> Query<'s, S, C>
where
    S: EntityStore + ?Sized,
    C: SchemaAccessor + ?Sized,
{
    /// Create a query over `entity` with the default config.
    pub fn new(store: &'s S, schema: &'s C, entity: impl Into<String>) -> Self {
        Self {
            store,
            schema,
            config: LoaderConfig::default(),
            entity: entity.into(),
            loads: Vec::new(),
            roots: RootFilter::All,
        }
    }

    /// Replace the loader config.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Request relation paths: `"posts"`, `"posts.comments|likes"`,
    /// `"posts.*"`, `"*"`, or a list of those.
    pub fn with(mut self, expr: impl Into<PathExpr>) -> Self {
        let paths = expr.into().paths();
        if !paths.is_empty() {
            self.loads.push(Load::Paths(paths));
        }
        self
    }

    /// Request every relation of the root type, one level deep.
    pub fn with_all(mut self) -> Self {
        self.loads.push(Load::All);
        self
    }

    /// Request every relation at every level reached, up to `depth`.
    pub fn with_all_recursive(mut self, depth: impl Into<Depth>) -> Self {
        self.loads.push(Load::AllRecursive(depth.into()));
        self
    }

    /// Request the named relations at every level reached, up to `depth`.
    pub fn with_recursive<I, N>(mut self, names: I, depth: impl Into<Depth>) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.loads.push(Load::Recursive {
            names: names.into_iter().map(Into::into).collect(),
            depth: depth.into(),
        });
        self
    }

    /// Restrict the query to one identity.
    ///
    /// A value that cannot be a key (null, array, object) matches nothing.
    pub fn where_key(mut self, id: impl Into<Value>) -> Self {
        self.roots = match RecordKey::from_value(&id.into()) {
            Some(key) => RootFilter::Key(key),
            None => RootFilter::Nothing,
        };
        self
    }

    /// Entity type this query starts from.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// The canonical inclusion tree for the requests recorded so far.
    pub fn inclusion_tree(&self) -> InclusionTree {
        InclusionTreeBuilder::new(self.schema).build(&self.entity, &self.loads)
    }

    /// Resolve every matching root.
    #[instrument(level = "debug", skip_all, fields(entity = %self.entity))]
    pub fn get(&self) -> Vec<Value> {
        match &self.roots {
            RootFilter::All => self.run(self.store.records(&self.entity)),
            RootFilter::Key(key) => self.run(self.store.get(&self.entity, key)),
            RootFilter::Nothing => Vec::new(),
        }
    }

    /// Alias of [`Query::get`].
    pub fn all(&self) -> Vec<Value> {
        self.get()
    }

    /// Resolve the first matching root in insertion order, or `None`.
    #[instrument(level = "debug", skip_all, fields(entity = %self.entity))]
    pub fn first(&self) -> Option<Value> {
        let root = match &self.roots {
            RootFilter::All => self.store.records(&self.entity).next(),
            RootFilter::Key(key) => self.store.get(&self.entity, key),
            RootFilter::Nothing => None,
        };
        self.run(root).into_iter().next()
    }

    /// Resolve the root with identity `id`, or `None`.
    pub fn find(&self, id: impl Into<Value>) -> Option<Value> {
        let id = id.into();
        let key = RecordKey::from_value(&id)?;
        self.run(self.store.get(&self.entity, &key)).into_iter().next()
    }

    fn run<I>(&self, roots: I) -> Vec<Value>
    where
        I: IntoIterator<Item = &'s Record>,
    {
        let tree = self.inclusion_tree();
        debug!(relations = ?tree.paths(), "resolving inclusion tree");

        let mut resolver = GraphResolver::new(self.store, self.schema, &self.config);
        let hydrated = resolver.resolve(&self.entity, roots, &tree);

        Materializer::new(self.schema, &self.config).materialize_all(&hydrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, RelationDef, Schema};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn create_test_schema() -> Schema {
        Schema::new()
            .with_entity(EntityDef::keyed_by_id("users"))
            .with_entity(EntityDef::keyed_by_id("posts"))
            .with_relation(RelationDef::one_to_many("posts", "users", "posts", "user_id"))
            .with_relation(RelationDef::belongs_to("user", "posts", "users", "user_id"))
    }

    fn setup_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_value("users", "id", json!({"id": 1})).unwrap();
        store.insert_value("users", "id", json!({"id": 2})).unwrap();
        store.insert_value("posts", "id", json!({"id": 3, "user_id": 2})).unwrap();
        store
    }

    #[test]
    fn test_get_returns_every_root() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let users = Query::new(&store, &schema, "users").with("posts").get();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["posts"], json!([]));
        assert_eq!(users[1]["posts"][0]["id"], json!(3));
        assert_eq!(users, Query::new(&store, &schema, "users").with("posts").all());
    }

    #[test]
    fn test_first_and_find() {
        let (schema, store) = (create_test_schema(), setup_test_store());

        let first = Query::new(&store, &schema, "users").first().unwrap();
        assert_eq!(first, json!({"$id": 1, "id": 1}));

        let found = Query::new(&store, &schema, "users").with("posts").find(2).unwrap();
        assert_eq!(found["posts"][0]["$id"], json!(3));

        assert!(Query::new(&store, &schema, "users").find(9).is_none());
        assert!(Query::new(&store, &schema, "users").find(Value::Null).is_none());
    }

    #[test]
    fn test_where_key() {
        let (schema, store) = (create_test_schema(), setup_test_store());

        let users = Query::new(&store, &schema, "users").where_key("2").get();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], json!(2));

        assert!(Query::new(&store, &schema, "users")
            .where_key(Value::Null)
            .first()
            .is_none());
    }

    #[test]
    fn test_where_key_non_key_value_matches_nothing() {
        let (schema, mut store) = (create_test_schema(), setup_test_store());
        store.insert_value("users", "id", json!({"id": "\u{0}"})).unwrap();

        let query = Query::new(&store, &schema, "users").where_key(Value::Null);
        assert!(query.get().is_empty());
        assert!(query.first().is_none());
        assert!(Query::new(&store, &schema, "users")
            .where_key(json!([1]))
            .get()
            .is_empty());

        let nul = Query::new(&store, &schema, "users").where_key("\u{0}").get();
        assert_eq!(nul, vec![json!({"$id": "\u{0}", "id": "\u{0}"})]);
    }

    #[test]
    fn test_with_accepts_hyphenated_and_unicode_names() {
        let schema = Schema::new()
            .with_entity(EntityDef::keyed_by_id("users"))
            .with_entity(EntityDef::keyed_by_id("posts"))
            .with_relation(RelationDef::one_to_many("blog-posts", "users", "posts", "user_id"))
            .with_relation(RelationDef::one_to_many("café", "users", "posts", "user_id"));
        let mut store = MemoryStore::new();
        store.insert_value("users", "id", json!({"id": 1})).unwrap();
        store.insert_value("posts", "id", json!({"id": 2, "user_id": 1})).unwrap();

        let post = json!([{"$id": 2, "id": 2, "user_id": 1}]);
        let user = Query::new(&store, &schema, "users").with("blog-posts").first().unwrap();
        assert_eq!(user["blog-posts"], post);
        assert!(user.get("café").is_none());

        let user = Query::new(&store, &schema, "users").with("café").first().unwrap();
        assert_eq!(user["café"], post);

        let both = Query::new(&store, &schema, "users").with("blog-posts|café").first();
        assert_eq!(both, Query::new(&store, &schema, "users").with("*").first());
    }

    #[test]
    fn test_unknown_root_type_is_empty() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        assert!(Query::new(&store, &schema, "ghosts").with("*").get().is_empty());
        assert!(Query::new(&store, &schema, "ghosts").first().is_none());
    }

    #[test]
    fn test_malformed_expression_requests_nothing() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let query = Query::new(&store, &schema, "users").with("").with("posts..");

        assert!(query.inclusion_tree().is_empty());
        assert_eq!(query.first().unwrap(), json!({"$id": 1, "id": 1}));
    }

    #[test]
    fn test_inclusion_tree_reflects_loads() {
        let (schema, store) = (create_test_schema(), setup_test_store());
        let query = Query::new(&store, &schema, "posts")
            .with("user.posts")
            .with_recursive(["user"], 2usize);

        assert_eq!(query.entity(), "posts");
        assert_eq!(query.inclusion_tree().paths(), vec!["user+", "user.posts"]);
    }
}

//! Inclusion trees: the canonical, deduplicated form of every relation a
//! query asked for.
//!
//! Recursive requests are not unrolled here. A recursive node carries its
//! [`Recursion`] rule and the resolver expands one more level lazily, per
//! related type, while it walks the data.

use relgraph_lang::{PathSegment, RelationPath};
use tracing::debug;

use crate::catalog::{RelationDef, SchemaAccessor};

/// Depth limit of a recursive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Recurse until the data runs out (bounded by the ancestor guard).
    #[default]
    Unbounded,
    /// Recurse at most this many further levels.
    Limit(usize),
}

impl Depth {
    /// Check if no further level may be expanded.
    pub fn is_exhausted(self) -> bool {
        self == Depth::Limit(0)
    }

    /// Depth left one level further down.
    pub fn decrement(self) -> Depth {
        match self {
            Depth::Unbounded => Depth::Unbounded,
            Depth::Limit(n) => Depth::Limit(n.saturating_sub(1)),
        }
    }

    /// The deeper of two limits.
    pub fn max(self, other: Depth) -> Depth {
        match (self, other) {
            (Depth::Limit(a), Depth::Limit(b)) => Depth::Limit(a.max(b)),
            _ => Depth::Unbounded,
        }
    }
}

impl From<usize> for Depth {
    fn from(limit: usize) -> Self {
        Depth::Limit(limit)
    }
}

impl From<Option<usize>> for Depth {
    fn from(limit: Option<usize>) -> Self {
        limit.map_or(Depth::Unbounded, Depth::Limit)
    }
}

/// Which relations a recursive request follows at every level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationScope {
    /// Every declared relation.
    All,
    /// Only relations with these names.
    Only(Vec<String>),
}

impl RelationScope {
    /// Check if the scope follows relation `name`.
    pub fn admits(&self, name: &str) -> bool {
        match self {
            RelationScope::All => true,
            RelationScope::Only(names) => names.iter().any(|n| n == name),
        }
    }

    fn union(&mut self, other: &RelationScope) {
        match other {
            RelationScope::All => *self = RelationScope::All,
            RelationScope::Only(more) => {
                if let RelationScope::Only(names) = self {
                    for name in more {
                        if !names.contains(name) {
                            names.push(name.clone());
                        }
                    }
                }
            }
        }
    }
}

/// Recursion rule carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recursion {
    pub scope: RelationScope,
    /// Levels left below the records attached at this node.
    pub remaining: Depth,
}

impl Recursion {
    pub fn new(scope: RelationScope, remaining: Depth) -> Self {
        Self { scope, remaining }
    }

    /// The rule one level further down.
    pub fn next(&self) -> Recursion {
        Recursion {
            scope: self.scope.clone(),
            remaining: self.remaining.decrement(),
        }
    }

    fn union(&mut self, other: &Recursion) {
        self.scope.union(&other.scope);
        self.remaining = self.remaining.max(other.remaining);
    }
}

/// One requested relation and what to load below it.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeNode {
    /// Resolved relation declaration.
    pub relation: RelationDef,
    /// Explicitly requested relations on the related type.
    pub children: InclusionTree,
    /// Set when the node expands itself at every level it reaches.
    pub recursion: Option<Recursion>,
}

impl IncludeNode {
    pub fn new(relation: RelationDef) -> Self {
        Self {
            relation,
            children: InclusionTree::new(),
            recursion: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.relation.name
    }

    pub fn is_recursive(&self) -> bool {
        self.recursion.is_some()
    }

    fn absorb(&mut self, other: IncludeNode) {
        self.children.merge(other.children);
        if let Some(theirs) = other.recursion {
            self.recursion = Some(match self.recursion.take() {
                Some(mut mine) => {
                    mine.union(&theirs);
                    mine
                }
                None => theirs,
            });
        }
    }
}

/// Set of requested relations on one entity type, unique by name.
///
/// Nodes keep first-insertion order so materialized output is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InclusionTree {
    nodes: Vec<IncludeNode>,
}

impl InclusionTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncludeNode> {
        self.nodes.iter()
    }

    /// Get a node by relation name.
    pub fn get(&self, name: &str) -> Option<&IncludeNode> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Check if a relation is requested at this level.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a node, merging it into an existing one of the same name.
    pub fn insert(&mut self, node: IncludeNode) {
        match self.nodes.iter_mut().find(|n| n.name() == node.name()) {
            Some(existing) => existing.absorb(node),
            None => self.nodes.push(node),
        }
    }

    /// Set union with another tree over the same entity type.
    pub fn merge(&mut self, other: InclusionTree) {
        for node in other.nodes {
            self.insert(node);
        }
    }

    fn entry(&mut self, relation: &RelationDef) -> &mut IncludeNode {
        let position = match self.nodes.iter().position(|n| n.name() == relation.name) {
            Some(position) => position,
            None => {
                self.nodes.push(IncludeNode::new(relation.clone()));
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[position]
    }

    /// Render the tree as sorted flat paths, recursive nodes marked with `+`.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths("", &mut out);
        out.sort();
        out
    }

    fn collect_paths(&self, prefix: &str, out: &mut Vec<String>) {
        for node in &self.nodes {
            let mut path = format!("{}{}", prefix, node.name());
            if node.children.is_empty() {
                if node.is_recursive() {
                    path.push('+');
                }
                out.push(path);
            } else {
                if node.is_recursive() {
                    out.push(format!("{}+", path));
                }
                path.push('.');
                node.children.collect_paths(&path, out);
            }
        }
    }
}

/// One relation request as recorded by the query surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load {
    /// Parsed `with(...)` paths.
    Paths(Vec<RelationPath>),
    /// `withAll()`: every root relation, one level.
    All,
    /// `withAllRecursive(depth)`.
    AllRecursive(Depth),
    /// `withRecursive(names, depth)`.
    Recursive { names: Vec<String>, depth: Depth },
}

/// Builds an [`InclusionTree`] for a root type from a list of [`Load`]s.
///
/// Relation names are checked against the schema at the position they
/// appear; unknown names are dropped silently.
pub struct InclusionTreeBuilder<'a, C: SchemaAccessor + ?Sized> {
    schema: &'a C,
}

impl<'a, C: SchemaAccessor + ?Sized> InclusionTreeBuilder<'a, C> {
    /// Create a builder over a schema.
    pub fn new(schema: &'a C) -> Self {
        Self { schema }
    }

    /// Merge every load into one tree rooted at `entity`.
    pub fn build(&self, entity: &str, loads: &[Load]) -> InclusionTree {
        let mut tree = InclusionTree::new();

        for load in loads {
            match load {
                Load::Paths(paths) => {
                    for path in paths {
                        self.insert_path(&mut tree, entity, path.segments());
                    }
                }
                Load::All => self.insert_path(&mut tree, entity, &[PathSegment::Wildcard]),
                Load::AllRecursive(depth) => {
                    let rule = Recursion::new(RelationScope::All, *depth);
                    tree.merge(self.recursive_level(entity, &rule));
                }
                Load::Recursive { names, depth } => {
                    let rule = Recursion::new(RelationScope::Only(names.clone()), *depth);
                    tree.merge(self.recursive_level(entity, &rule));
                }
            }
        }

        tree
    }

    /// Insert one path below `entity`.
    pub fn insert_path(&self, tree: &mut InclusionTree, entity: &str, segments: &[PathSegment]) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };

        match first {
            PathSegment::Wildcard => {
                for relation in self.schema.relations_from(entity) {
                    self.insert_relation(tree, relation, rest);
                }
            }
            PathSegment::Relation(name) => match self.schema.relation(entity, name) {
                Some(relation) => self.insert_relation(tree, relation, rest),
                None => {
                    debug!(entity = %entity, relation = %name, "ignoring unknown relation");
                }
            },
        }
    }

    fn insert_relation(&self, tree: &mut InclusionTree, relation: &RelationDef, rest: &[PathSegment]) {
        let node = tree.entry(relation);
        self.insert_path(&mut node.children, &relation.to_entity, rest);
    }

    /// One level of a recursive request on `entity`: a node per admitted
    /// relation, each carrying `rule`.
    pub fn recursive_level(&self, entity: &str, rule: &Recursion) -> InclusionTree {
        let mut tree = InclusionTree::new();
        for relation in self.schema.relations_from(entity) {
            if rule.scope.admits(&relation.name) {
                let mut node = IncludeNode::new(relation.clone());
                node.recursion = Some(rule.clone());
                tree.insert(node);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{EntityDef, RelationDef, Schema};
    use relgraph_lang::parse_path;

    fn create_test_schema() -> Schema {
        Schema::new()
            .with_entity(EntityDef::keyed_by_id("users"))
            .with_entity(EntityDef::keyed_by_id("posts"))
            .with_entity(EntityDef::keyed_by_id("comments"))
            .with_entity(EntityDef::keyed_by_id("likes"))
            .with_relation(RelationDef::one_to_many("posts", "users", "posts", "user_id"))
            .with_relation(RelationDef::one_to_many("comments", "posts", "comments", "post_id"))
            .with_relation(RelationDef::one_to_many("likes", "posts", "likes", "post_id"))
            .with_relation(RelationDef::belongs_to("user", "posts", "users", "user_id"))
            .with_relation(RelationDef::one_to_many("likes", "comments", "likes", "comment_id"))
    }

    fn paths(sources: &[&str]) -> Load {
        Load::Paths(sources.iter().flat_map(|s| parse_path(s).unwrap()).collect())
    }

    #[test]
    fn test_nested_path() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build("users", &[paths(&["posts.comments"])]);

        assert_eq!(tree.paths(), vec!["posts.comments"]);
        let posts = tree.get("posts").unwrap();
        assert_eq!(posts.relation.to_entity, "posts");
        assert!(!posts.is_recursive());
    }

    #[test]
    fn test_reinsert_is_idempotent() {
        let schema = create_test_schema();
        let builder = InclusionTreeBuilder::new(&schema);
        let once = builder.build("users", &[paths(&["posts.comments"])]);
        let twice = builder.build("users", &[paths(&["posts.comments", "posts", "posts.comments"])]);

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn test_pipe_array_and_wildcard_agree() {
        let schema = create_test_schema();
        let builder = InclusionTreeBuilder::new(&schema);

        let piped = builder.build("users", &[paths(&["posts.comments|likes|user"])]);
        let listed = builder.build(
            "users",
            &[paths(&["posts.comments", "posts.likes", "posts.user"])],
        );
        let wildcard = builder.build("users", &[paths(&["posts.*"])]);

        assert_eq!(piped.paths(), listed.paths());
        assert_eq!(piped.paths(), wildcard.paths());
    }

    #[test]
    fn test_unknown_relations_are_dropped() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema)
            .build("users", &[paths(&["unknown", "posts.nope", "posts.comments"])]);

        assert_eq!(tree.paths(), vec!["posts.comments"]);
    }

    #[test]
    fn test_with_all_is_one_level() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build("posts", &[Load::All]);

        assert_eq!(tree.paths(), vec!["comments", "likes", "user"]);
        assert!(tree.iter().all(|n| n.children.is_empty() && !n.is_recursive()));
    }

    #[test]
    fn test_mid_path_wildcard_applies_rest() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build("users", &[paths(&["posts.*.likes"])]);

        // only comments declares `likes` below the wildcard
        assert_eq!(
            tree.paths(),
            vec!["posts.comments.likes", "posts.likes", "posts.user"]
        );
    }

    #[test]
    fn test_all_recursive_marks_root_level() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build("users", &[Load::AllRecursive(Depth::Limit(2))]);

        let posts = tree.get("posts").unwrap();
        assert_eq!(
            posts.recursion,
            Some(Recursion::new(RelationScope::All, Depth::Limit(2)))
        );
        assert!(posts.children.is_empty());
    }

    #[test]
    fn test_named_recursive_filters_relations() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build(
            "posts",
            &[Load::Recursive {
                names: vec!["user".into(), "comments".into(), "missing".into()],
                depth: Depth::Unbounded,
            }],
        );

        assert_eq!(tree.paths(), vec!["comments+", "user+"]);
    }

    #[test]
    fn test_explicit_and_recursive_merge() {
        let schema = create_test_schema();
        let tree = InclusionTreeBuilder::new(&schema).build(
            "users",
            &[paths(&["posts.comments"]), Load::AllRecursive(Depth::Limit(0))],
        );

        let posts = tree.get("posts").unwrap();
        assert!(posts.is_recursive());
        assert!(posts.children.contains("comments"));
    }

    #[test]
    fn test_recursion_union_widens() {
        let mut rule = Recursion::new(RelationScope::Only(vec!["user".into()]), Depth::Limit(1));
        rule.union(&Recursion::new(
            RelationScope::Only(vec!["children".into()]),
            Depth::Limit(3),
        ));
        assert_eq!(
            rule,
            Recursion::new(
                RelationScope::Only(vec!["user".into(), "children".into()]),
                Depth::Limit(3)
            )
        );

        rule.union(&Recursion::new(RelationScope::All, Depth::Unbounded));
        assert_eq!(rule, Recursion::new(RelationScope::All, Depth::Unbounded));
    }

    #[test]
    fn test_depth_arithmetic() {
        assert!(Depth::Limit(0).is_exhausted());
        assert!(!Depth::Unbounded.is_exhausted());
        assert_eq!(Depth::Limit(2).decrement(), Depth::Limit(1));
        assert_eq!(Depth::Unbounded.decrement(), Depth::Unbounded);
        assert_eq!(Depth::from(None), Depth::Unbounded);
        assert_eq!(Depth::from(Some(4usize)), Depth::Limit(4));
    }
}

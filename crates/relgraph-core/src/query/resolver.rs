//! Graph resolver: walks stored records along an inclusion tree and
//! attaches related records.
//!
//! The resolver borrows records from the store snapshot and produces a
//! [`Hydrated`] tree; nothing is cloned until materialization.
//!
//! Recursive nodes are unrolled lazily: when a recursive node attaches a
//! record, the next level is built from the related type's declared
//! relations. Descent stops when
//! - the node's remaining depth is exhausted,
//! - the record already appears on the current branch (ancestor guard), or
//! - the branch reaches `max_recursion_depth`, when one is configured.
//!
//! A stopped record is still attached, with its in-scope relations set to
//! `null` / `[]`.

use tracing::{debug, warn};

use crate::catalog::{RelationDef, RelationKind, SchemaAccessor};
use crate::config::LoaderConfig;
use crate::store::{EntityStore, Record, RecordKey};

use super::join::JoinCache;
use super::tree::{IncludeNode, InclusionTree, InclusionTreeBuilder, Recursion};

/// A record with its requested relations attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated<'s> {
    /// Entity type of the record.
    pub entity: String,
    pub record: &'s Record,
    /// Attached relations, in inclusion-tree order.
    pub relations: Vec<(String, Attached<'s>)>,
}

impl<'s> Hydrated<'s> {
    /// Get an attached relation by name.
    pub fn relation(&self, name: &str) -> Option<&Attached<'s>> {
        self.relations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, attached)| attached)
    }
}

/// Value attached for one relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Attached<'s> {
    /// Singular relation: the related record or explicit `null`.
    One(Option<Box<Hydrated<'s>>>),
    /// Plural relation: related records in store order, possibly empty.
    Many(Vec<Hydrated<'s>>),
}

impl<'s> Attached<'s> {
    /// The empty value for a relation kind.
    pub fn empty(kind: RelationKind) -> Self {
        if kind.is_plural() {
            Attached::Many(Vec::new())
        } else {
            Attached::One(None)
        }
    }
}

#[derive(Debug)]
struct Ancestor {
    entity: String,
    key: RecordKey,
}

/// Resolves inclusion trees against one consistent store view.
pub struct GraphResolver<'s, S: ?Sized, C: ?Sized> {
    store: &'s S,
    schema: &'s C,
    max_depth: Option<usize>,
    joins: JoinCache<'s>,
    cap_reported: bool,
}

impl<'s, S, C> GraphResolver<'s, S, C>
where
    S: EntityStore + ?Sized,
    C: SchemaAccessor + ?Sized,
{
    /// Create a resolver over a store snapshot and schema.
    pub fn new(store: &'s S, schema: &'s C, config: &LoaderConfig) -> Self {
        Self {
            store,
            schema,
            max_depth: config.max_recursion_depth,
            joins: JoinCache::new(config.hash_join_threshold),
            cap_reported: false,
        }
    }

    /// Hydrate `roots` of type `entity` along `tree`.
    pub fn resolve<I>(&mut self, entity: &str, roots: I, tree: &InclusionTree) -> Vec<Hydrated<'s>>
    where
        I: IntoIterator<Item = &'s Record>,
    {
        let mut chain = Vec::new();
        let hydrated: Vec<_> = roots
            .into_iter()
            .map(|record| self.hydrate(entity, record, tree, &mut chain))
            .collect();
        debug!(
            entity = %entity,
            roots = hydrated.len(),
            hash_indexes = self.joins.index_count(),
            "resolved inclusion tree"
        );
        hydrated
    }

    fn hydrate(
        &mut self,
        entity: &str,
        record: &'s Record,
        tree: &InclusionTree,
        chain: &mut Vec<Ancestor>,
    ) -> Hydrated<'s> {
        chain.push(Ancestor {
            entity: entity.to_string(),
            key: record.key.clone(),
        });

        let mut relations = Vec::with_capacity(tree.len());
        for node in tree.iter() {
            if node.relation.from_entity != entity {
                debug!(entity = %entity, relation = %node.name(), "skipping relation of another type");
                continue;
            }
            let attached = self.attach(record, node, chain);
            relations.push((node.name().to_string(), attached));
        }

        chain.pop();

        Hydrated {
            entity: entity.to_string(),
            record,
            relations,
        }
    }

    fn attach(
        &mut self,
        record: &'s Record,
        node: &IncludeNode,
        chain: &mut Vec<Ancestor>,
    ) -> Attached<'s> {
        let relation = &node.relation;
        // next level of a recursive node, built on first use
        let mut expanded: Option<InclusionTree> = None;

        match relation.kind {
            RelationKind::BelongsTo => {
                let owner = self.lookup_owner(record, relation);
                Attached::One(owner.map(|r| Box::new(self.descend(node, r, &mut expanded, chain))))
            }
            RelationKind::OneToOne => {
                let child = self.lookup_children(record, relation).into_iter().next();
                Attached::One(child.map(|r| Box::new(self.descend(node, r, &mut expanded, chain))))
            }
            RelationKind::OneToMany => {
                let children = self.lookup_children(record, relation);
                Attached::Many(
                    children
                        .into_iter()
                        .map(|r| self.descend(node, r, &mut expanded, chain))
                        .collect(),
                )
            }
        }
    }

    fn descend(
        &mut self,
        node: &IncludeNode,
        record: &'s Record,
        expanded: &mut Option<InclusionTree>,
        chain: &mut Vec<Ancestor>,
    ) -> Hydrated<'s> {
        let target = node.relation.to_entity.as_str();

        let Some(recursion) = &node.recursion else {
            return self.hydrate(target, record, &node.children, chain);
        };

        if self.should_stop(recursion, target, record, chain) {
            let mut hydrated = self.hydrate(target, record, &node.children, chain);
            self.stub_scope(&mut hydrated, recursion);
            return hydrated;
        }

        let schema = self.schema;
        let tree = expanded.get_or_insert_with(|| {
            let mut tree = node.children.clone();
            tree.merge(InclusionTreeBuilder::new(schema).recursive_level(target, &recursion.next()));
            tree
        });
        self.hydrate(target, record, tree, chain)
    }

    fn should_stop(
        &mut self,
        recursion: &Recursion,
        entity: &str,
        record: &Record,
        chain: &[Ancestor],
    ) -> bool {
        if recursion.remaining.is_exhausted() {
            return true;
        }

        if chain
            .iter()
            .any(|a| a.entity == entity && a.key == record.key)
        {
            debug!(entity = %entity, key = %record.key, "record repeats an ancestor, not descending");
            return true;
        }

        if let Some(max_depth) = self.max_depth.filter(|&max| chain.len() >= max) {
            if !self.cap_reported {
                warn!(
                    entity = %entity,
                    max_depth,
                    "recursive relation reached the recursion cap"
                );
                self.cap_reported = true;
            }
            return true;
        }

        false
    }

    /// Attach `null` / `[]` for every in-scope relation not already present.
    fn stub_scope(&self, hydrated: &mut Hydrated<'s>, recursion: &Recursion) {
        for relation in self.schema.relations_from(&hydrated.entity) {
            if recursion.scope.admits(&relation.name) && hydrated.relation(&relation.name).is_none() {
                hydrated
                    .relations
                    .push((relation.name.clone(), Attached::empty(relation.kind)));
            }
        }
    }

    /// Parent record of a `BelongsTo` relation.
    fn lookup_owner(&mut self, record: &Record, relation: &RelationDef) -> Option<&'s Record> {
        let key = record.key_of(&relation.foreign_key)?;

        match relation.owner_key.as_deref() {
            Some(owner_key) if owner_key != self.schema.identity_field(&relation.to_entity) => self
                .joins
                .matching(self.store, &relation.to_entity, owner_key, &key)
                .into_iter()
                .next(),
            _ => self.store.get(&relation.to_entity, &key),
        }
    }

    /// Related records of a forward relation, in store order.
    fn lookup_children(&mut self, record: &Record, relation: &RelationDef) -> Vec<&'s Record> {
        let key = match relation.local_key.as_deref() {
            Some(local_key) => record.key_of(local_key),
            None => Some(record.key.clone()),
        };

        match key {
            Some(key) => {
                self.joins
                    .matching(self.store, &relation.to_entity, &relation.foreign_key, &key)
            }
            None => Vec::new(),
        }
    }
}

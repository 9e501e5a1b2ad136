//! Eager loading of related records.
//!
//! A [`Query`] records `with`-style requests, folds them into an
//! [`InclusionTree`], hydrates the roots with [`GraphResolver`] and turns the
//! result into owned JSON with [`Materializer`].

mod builder;
mod join;
mod materializer;
mod resolver;
mod tree;

pub use builder::Query;
pub use join::{JoinCache, JoinStrategy, KeyIndex};
pub use materializer::Materializer;
pub use resolver::{Attached, GraphResolver, Hydrated};
pub use tree::{Depth, IncludeNode, InclusionTree, InclusionTreeBuilder, Load, Recursion, RelationScope};

//! relgraph path language
//!
//! This crate parses the relation inclusion expressions accepted by
//! `Query::with` into flat [`RelationPath`]s.
//!
//! # Syntax
//!
//! ```text
//! posts                  one relation
//! posts.comments         nested relation
//! posts.comments|likes   siblings under a shared prefix
//! *                      every relation declared on the root type
//! posts.*                every relation declared on the type behind `posts`
//! ```
//!
//! # Usage
//!
//! ```rust
//! use relgraph_lang::{parse_path, PathExpr};
//!
//! // Strict: malformed input is an error with a span.
//! let paths = parse_path("posts.comments|likes").unwrap();
//! assert_eq!(paths.len(), 2);
//!
//! // Total: malformed input contributes nothing.
//! let paths = PathExpr::from(vec!["posts", "oops..", "phone"]).paths();
//! assert_eq!(paths.len(), 2);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod span;

pub use error::ParseError;
pub use parser::parse_path;
pub use path::{parse_paths, PathExpr, PathSegment, RelationPath};
pub use span::Span;

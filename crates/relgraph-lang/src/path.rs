//! Parsed relation paths and the expression forms accepted by `with`.

use std::fmt;

use tracing::debug;

use crate::parser::parse_path;

/// One step of a relation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named relation field.
    Relation(String),
    /// `*`: every relation declared on the type reached at this level.
    Wildcard,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Relation(name) => f.write_str(name),
            PathSegment::Wildcard => f.write_str("*"),
        }
    }
}

/// A flat relation path from the root type to a leaf, e.g. `posts.comments`.
///
/// Paths carry no recursion or depth modifiers; those are applied when the
/// inclusion tree is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationPath {
    segments: Vec<PathSegment>,
}

impl RelationPath {
    /// Create a path from its segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Build a path of named relations.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| PathSegment::Relation(n.into()))
                .collect(),
        )
    }

    /// The single-segment wildcard path `*`.
    pub fn wildcard() -> Self {
        Self::new(vec![PathSegment::Wildcard])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A relation inclusion expression as handed to `with`: one string or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    Single(String),
    Many(Vec<String>),
}

impl PathExpr {
    /// Parse into flat paths.
    ///
    /// Total: every malformed string contributes no paths and is logged at
    /// debug level, so `with("")` or `with("a..b")` requests nothing.
    pub fn paths(&self) -> Vec<RelationPath> {
        match self {
            PathExpr::Single(source) => parse_paths([source.as_str()]),
            PathExpr::Many(sources) => parse_paths(sources.iter().map(String::as_str)),
        }
    }
}

impl From<&str> for PathExpr {
    fn from(value: &str) -> Self {
        PathExpr::Single(value.to_string())
    }
}

impl From<String> for PathExpr {
    fn from(value: String) -> Self {
        PathExpr::Single(value)
    }
}

impl From<&String> for PathExpr {
    fn from(value: &String) -> Self {
        PathExpr::Single(value.clone())
    }
}

impl From<Vec<String>> for PathExpr {
    fn from(value: Vec<String>) -> Self {
        PathExpr::Many(value)
    }
}

impl From<Vec<&str>> for PathExpr {
    fn from(value: Vec<&str>) -> Self {
        PathExpr::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for PathExpr {
    fn from(value: &[&str]) -> Self {
        PathExpr::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PathExpr {
    fn from(value: [&str; N]) -> Self {
        PathExpr::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Parse several path expressions, dropping malformed ones.
///
/// The result is deduplicated while keeping first-seen order.
pub fn parse_paths<'a, I>(sources: I) -> Vec<RelationPath>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut paths: Vec<RelationPath> = Vec::new();

    for source in sources {
        match parse_path(source) {
            Ok(parsed) => {
                for path in parsed {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
            }
            Err(e) => {
                debug!(expression = %source, error = %e, "ignoring malformed relation path");
            }
        }
    }

    paths
}

//! Recursive descent parser for relation path expressions.
//!
//! Grammar:
//!
//! ```text
//! path    := segment ( "." segment )*
//! segment := atom ( "|" atom )*
//! atom    := IDENT | "*"
//! ```
//!
//! A segment with several alternatives fans the path out, so
//! `posts.comments|likes` yields `posts.comments` and `posts.likes`.

use crate::error::ParseError;
use crate::lexer::{Lexer, SpannedToken, Token};
use crate::path::{PathSegment, RelationPath};
use crate::span::Span;

/// Parser for a single relation path expression.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    source: &'source str,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            source,
        }
    }

    /// Parse the whole expression into its flat paths.
    pub fn parse_expression(&mut self) -> Result<Vec<RelationPath>, ParseError> {
        if self.lexer.peek().is_none() {
            return Err(ParseError::new("empty relation path", Span::at(0))
                .with_hint("name at least one relation, or use '*'"));
        }

        let mut levels: Vec<Vec<PathSegment>> = Vec::new();

        loop {
            levels.push(self.parse_segment()?);

            match self.lexer.next_token() {
                None => break,
                Some(tok) => {
                    let tok = tok?;
                    if tok.token != Token::Dot {
                        return Err(ParseError::new(
                            format!("expected '.' or '|', found {}", tok.token.describe()),
                            tok.span,
                        ));
                    }
                }
            }
        }

        Ok(expand(levels))
    }

    /// Parse `atom ( "|" atom )*`.
    fn parse_segment(&mut self) -> Result<Vec<PathSegment>, ParseError> {
        let mut alternatives = vec![self.parse_atom()?];

        while let Some(Ok(SpannedToken {
            token: Token::Pipe, ..
        })) = self.lexer.peek()
        {
            self.next_token()?; // consume |
            let atom = self.parse_atom()?;
            if !alternatives.contains(&atom) {
                alternatives.push(atom);
            }
        }

        Ok(alternatives)
    }

    fn parse_atom(&mut self) -> Result<PathSegment, ParseError> {
        let tok = self.next_token()?;
        match tok.token {
            Token::Ident(name) => Ok(PathSegment::Relation(name)),
            Token::Star => Ok(PathSegment::Wildcard),
            other => Err(ParseError::new(
                format!("expected relation name or '*', found {}", other.describe()),
                tok.span,
            )),
        }
    }

    /// Get the next token or error if EOF.
    fn next_token(&mut self) -> Result<SpannedToken, ParseError> {
        self.lexer.next_token().unwrap_or_else(|| {
            Err(ParseError::new(
                "unexpected end of relation path",
                Span::at(self.source.len()),
            ))
        })
    }
}

/// Cartesian product of per-level alternatives, in source order.
fn expand(levels: Vec<Vec<PathSegment>>) -> Vec<RelationPath> {
    let mut prefixes: Vec<Vec<PathSegment>> = vec![Vec::new()];

    for alternatives in levels {
        let mut next = Vec::with_capacity(prefixes.len() * alternatives.len());
        for prefix in &prefixes {
            for segment in &alternatives {
                let mut path = prefix.clone();
                path.push(segment.clone());
                next.push(path);
            }
        }
        prefixes = next;
    }

    prefixes.into_iter().map(RelationPath::new).collect()
}

/// Parse one relation path expression strictly.
pub fn parse_path(source: &str) -> Result<Vec<RelationPath>, ParseError> {
    Parser::new(source).parse_expression()
}

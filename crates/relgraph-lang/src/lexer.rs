//! Lexer for relation path expressions using logos.

use crate::error::ParseError;
use crate::span::Span;
use logos::Logos;

/// Token types for relation path expressions.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Nesting separator.
    #[token(".")]
    Dot,
    /// Sibling separator.
    #[token("|")]
    Pipe,
    /// All relations declared at this level.
    #[token("*")]
    Star,

    /// Relation name: any run of characters other than `.`, `|`, `*` and
    /// whitespace, so `blog-posts` and `café` are single names.
    #[regex(r"[^.|*\s]+", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Token {
    /// Short human-readable form used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Dot => "'.'".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Ident(name) => format!("'{}'", name),
        }
    }
}

/// A token with its span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer that produces spanned tokens.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
    peeked: Option<Option<Result<SpannedToken, ParseError>>>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
            peeked: None,
        }
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Result<SpannedToken, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = Some(self.next_inner());
        }
        self.peeked.as_ref().and_then(|o| o.as_ref())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            peeked
        } else {
            self.next_inner()
        }
    }

    fn next_inner(&mut self) -> Option<Result<SpannedToken, ParseError>> {
        let result = self.inner.next()?;
        let span: Span = self.inner.span().into();
        Some(match result {
            Ok(token) => Ok(SpannedToken { token, span }),
            Err(()) => Err(ParseError::new(
                format!("unexpected character '{}'", self.inner.slice()),
                span,
            )
            .with_hint("'.', '|' and '*' are reserved in relation paths")),
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<SpannedToken, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

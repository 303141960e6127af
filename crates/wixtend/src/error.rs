//! Error types for wixtend

use std::fmt;
use thiserror::Error;

/// Position in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl Pos {
    pub const fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

/// Span representing a range in source text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn at(pos: Pos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub const fn empty() -> Self {
        Self {
            start: Pos::new(0, 0, 0),
            end: Pos::new(0, 0, 0),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.start.line == 0 && self.end.line == 0
    }
}

/// Error kind for detailed categorization
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    // xml syntax
    UnexpectedEof,
    InvalidToken,
    MismatchedTag { expected: String, found: String },
    DuplicateAttribute { name: String },
    UnterminatedMarkup,
    InvalidEntity,
    InvalidUtf8,
    TrailingContent,
    MissingRoot,

    // document shape
    UnexpectedRoot { expected: String, found: String },
    MissingElement { parent: String, name: String },
    AmbiguousElement { parent: String, name: String, count: usize },
    MissingAttribute { element: String, name: String },
}

impl ErrorKind {
    /// Whether the error comes from an unexpected document shape rather than
    /// malformed XML.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedRoot { .. }
                | Self::MissingElement { .. }
                | Self::AmbiguousElement { .. }
                | Self::MissingAttribute { .. }
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::MismatchedTag { expected, found } => {
                write!(f, "mismatched closing tag: expected </{expected}>, found </{found}>")
            }
            Self::DuplicateAttribute { name } => write!(f, "duplicate attribute: {name}"),
            Self::UnterminatedMarkup => write!(f, "unterminated markup"),
            Self::InvalidEntity => write!(f, "invalid xml entity"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::TrailingContent => write!(f, "content after root element"),
            Self::MissingRoot => write!(f, "no root element"),
            Self::UnexpectedRoot { expected, found } => {
                write!(f, "expected root element <{expected}>, found <{found}>")
            }
            Self::MissingElement { parent, name } => {
                write!(f, "element <{parent}> has no <{name}> child")
            }
            Self::AmbiguousElement {
                parent,
                name,
                count,
            } => write!(
                f,
                "element <{parent}> has {count} <{name}> children, expected exactly one"
            ),
            Self::MissingAttribute { element, name } => {
                write!(f, "element <{element}> has no '{name}' attribute")
            }
        }
    }
}

/// Main error type for wixtend
#[derive(Error, Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    span: Span,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            span,
            message,
        }
    }

    /// Error about the document shape; carries no source position
    pub fn structural(kind: ErrorKind) -> Self {
        Self::new(kind, Span::empty())
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Create error at specific position
    pub fn at(kind: ErrorKind, pos: Pos) -> Self {
        Self::new(kind, Span::at(pos))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.span.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "error at {}: {}", self.span.start, self.message)
        }
    }
}

/// Result type alias for wixtend
pub type Result<T> = std::result::Result<T, Error>;

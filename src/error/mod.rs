//! Error handling and diagnostics for the Rubby front end
//!
//! This module provides the error types shared by the lexer and the parser,
//! plus diagnostic formatting for the command-line tool.

use std::fmt;

pub mod diagnostic;

pub use diagnostic::Diagnostic;

/// Result type alias for Rubby operations
pub type RubbyResult<T> = Result<T, RubbyError>;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Optional filename
    pub filename: Option<String>,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize, filename: Option<String>) -> Self {
        Self {
            line,
            column,
            filename,
        }
    }

    /// Create a source location without a filename
    pub fn at(line: usize, column: usize) -> Self {
        Self::new(line, column, None)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref filename) = self.filename {
            write!(f, "{}:{}:{}", filename, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Main error type for the Rubby front end
///
/// Both lexing and parsing are all-or-nothing: either variant ends the current
/// pass and no partial token stream or tree is returned alongside it.
#[derive(Debug, Clone, PartialEq)]
pub enum RubbyError {
    /// No lexer rule matched, or a string/comment/interpolation was left open
    LexerError {
        message: String,
        location: SourceLocation,
    },
    /// A token could not extend the statement being parsed
    ParseError {
        message: String,
        location: SourceLocation,
        /// Source text of the offending token
        found: String,
        /// Productions that could have accepted a token here
        expected: Vec<String>,
    },
    /// Internal error (should not happen in normal operation)
    InternalError {
        message: String,
    },
}

impl RubbyError {
    /// Create a new lexer error
    pub fn lexer_error(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::LexerError {
            message: message.into(),
            location,
        }
    }

    /// Create a parse error for a token no live production accepts
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: &[&str],
        location: SourceLocation,
    ) -> Self {
        let found = found.into();
        let expected: Vec<String> = expected.iter().map(|e| e.to_string()).collect();
        let message = match expected.as_slice() {
            [] => format!("Unexpected {}", found),
            [only] => format!("Expected {}, found {}", only, found),
            [init @ .., last] => format!("Expected {} or {}, found {}", init.join(", "), last, found),
        };

        Self::ParseError {
            message,
            location,
            found,
            expected,
        }
    }

    /// Create a new internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the error kind as a string
    pub fn kind(&self) -> &str {
        match self {
            Self::LexerError { .. } => "Lexer Error",
            Self::ParseError { .. } => "Parse Error",
            Self::InternalError { .. } => "Internal Error",
        }
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        match self {
            Self::LexerError { message, .. }
            | Self::ParseError { message, .. }
            | Self::InternalError { message } => message,
        }
    }

    /// Get the source location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::LexerError { location, .. } | Self::ParseError { location, .. } => Some(location),
            Self::InternalError { .. } => None,
        }
    }

    /// Productions a parse error would have accepted, empty for other kinds
    pub fn expected(&self) -> &[String] {
        match self {
            Self::ParseError { expected, .. } => expected,
            _ => &[],
        }
    }
}

impl fmt::Display for RubbyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = self.location() {
            write!(f, "{}: {} at {}", self.kind(), self.message(), location)
        } else {
            write!(f, "{}: {}", self.kind(), self.message())
        }
    }
}

impl std::error::Error for RubbyError {}

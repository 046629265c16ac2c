//! Token definitions for the Rubby language
//!
//! This module defines all token types produced by lexical analysis.

use crate::error::SourceLocation;
use std::fmt;

/// A token in the Rubby language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    /// Raw source text the token was scanned from
    pub lexeme: String,
    pub location: SourceLocation,
    /// Whether whitespace or a comment came directly before this token
    pub spaced: bool,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: String, location: SourceLocation) -> Self {
        Self {
            token_type,
            lexeme,
            location,
            spaced: false,
        }
    }

    /// Mark whether the token follows whitespace
    pub fn with_spacing(mut self, spaced: bool) -> Self {
        self.spaced = spaced;
        self
    }

    /// Whitespace and comments never reach the parser
    pub fn is_trivia(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace | TokenType::Comment(_))
    }

    /// Human readable description used in parse errors
    pub fn describe(&self) -> String {
        match &self.token_type {
            TokenType::Newline => "newline".to_string(),
            TokenType::Indent => "indent".to_string(),
            TokenType::Dedent => "dedent".to_string(),
            TokenType::Eof => "end of input".to_string(),
            TokenType::StringFragment(s) => format!("string {:?}", s),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

/// Token types in the Rubby language
///
/// Kinds that need a payload carry it directly, so a decoded value can never
/// be missing or of the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Literals
    Literal(Literal),
    /// Unescaped text of one string segment
    StringFragment(String),
    InterpolationStart, // #{
    InterpolationEnd,   // }

    // Names
    Identifier(String),
    Constant(String),
    Keyword(Keyword),

    Operator(Operator),

    // Punctuation
    Dot,          // .
    ColonColon,   // ::
    DefinedOp,    // ??
    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    Comma,        // ,
    At,           // @
    Arrow,        // ->
    BlockArrow,   // &>
    Colon,        // :

    // Trivia
    Comment(String),
    Whitespace,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

/// Keywords in the Rubby language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Class,
    Module,
}

impl Keyword {
    /// Get keyword from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "class" => Some(Self::Class),
            "module" => Some(Self::Module),
            _ => None,
        }
    }

    /// Get string representation of keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric literal token values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
}

/// Broad operator families, as grouped by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Arithmetic,
    Comparison,
    Assignment,
    Bitwise,
    Logical,
    Range,
}

/// One variant per operator lexeme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Arithmetic
    Plus,     // +
    Minus,    // -
    Star,     // *
    Slash,    // /
    Percent,  // %
    StarStar, // **

    // Comparison
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=
    Spaceship,    // <=>
    CaseEqual,    // ===

    // Assignment
    Assign,         // =
    PlusAssign,     // +=
    MinusAssign,    // -=
    StarAssign,     // *=
    SlashAssign,    // /=
    PercentAssign,  // %=
    StarStarAssign, // **=

    // Bitwise
    Ampersand,  // &
    Pipe,       // |
    Caret,      // ^
    Tilde,      // ~
    ShiftLeft,  // <<
    ShiftRight, // >>

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Range
    DotDot,    // ..
    DotDotDot, // ...
}

impl Operator {
    /// Source spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::StarStar => "**",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::Spaceship => "<=>",
            Self::CaseEqual => "===",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::StarAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::StarStarAssign => "**=",
            Self::Ampersand => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::DotDot => "..",
            Self::DotDotDot => "...",
        }
    }

    /// Category the lexer files this operator under
    pub fn category(&self) -> OperatorCategory {
        match self {
            Self::Plus | Self::Minus | Self::Star | Self::Slash | Self::Percent | Self::StarStar => {
                OperatorCategory::Arithmetic
            }
            Self::Equal
            | Self::NotEqual
            | Self::Greater
            | Self::Less
            | Self::GreaterEqual
            | Self::LessEqual
            | Self::Spaceship
            | Self::CaseEqual => OperatorCategory::Comparison,
            Self::Assign
            | Self::PlusAssign
            | Self::MinusAssign
            | Self::StarAssign
            | Self::SlashAssign
            | Self::PercentAssign
            | Self::StarStarAssign => OperatorCategory::Assignment,
            Self::Ampersand | Self::Pipe | Self::Caret | Self::Tilde | Self::ShiftLeft | Self::ShiftRight => {
                OperatorCategory::Bitwise
            }
            Self::AndAnd | Self::OrOr | Self::Bang => OperatorCategory::Logical,
            Self::DotDot | Self::DotDotDot => OperatorCategory::Range,
        }
    }

    /// Operators accepted in prefix position: `+ - ! ~` plus the splat `*`
    /// and block-pass `&` markers
    ///
    /// Only the arithmetic, bitwise and logical families have prefix forms.
    pub fn is_unary(&self) -> bool {
        match self.category() {
            OperatorCategory::Arithmetic => matches!(self, Self::Plus | Self::Minus | Self::Star),
            OperatorCategory::Bitwise => matches!(self, Self::Tilde | Self::Ampersand),
            OperatorCategory::Logical => matches!(self, Self::Bang),
            OperatorCategory::Comparison | OperatorCategory::Assignment | OperatorCategory::Range => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(Literal::Integer(n)) => write!(f, "integer {}", n),
            Self::Literal(Literal::Float(x)) => write!(f, "float {}", x),
            Self::StringFragment(s) => write!(f, "string {:?}", s),
            Self::InterpolationStart => write!(f, "#{{"),
            Self::InterpolationEnd => write!(f, "}}"),
            Self::Identifier(name) => write!(f, "identifier '{}'", name),
            Self::Constant(name) => write!(f, "constant '{}'", name),
            Self::Keyword(kw) => write!(f, "keyword '{}'", kw),
            Self::Operator(op) => write!(f, "{}", op),
            Self::Dot => write!(f, "."),
            Self::ColonColon => write!(f, "::"),
            Self::DefinedOp => write!(f, "??"),
            Self::LeftBracket => write!(f, "["),
            Self::RightBracket => write!(f, "]"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBrace => write!(f, "{{"),
            Self::RightBrace => write!(f, "}}"),
            Self::Comma => write!(f, ","),
            Self::At => write!(f, "@"),
            Self::Arrow => write!(f, "->"),
            Self::BlockArrow => write!(f, "&>"),
            Self::Colon => write!(f, ":"),
            Self::Comment(text) => write!(f, "comment {:?}", text),
            Self::Whitespace => write!(f, "whitespace"),
            Self::Newline => write!(f, "newline"),
            Self::Indent => write!(f, "indent"),
            Self::Dedent => write!(f, "dedent"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

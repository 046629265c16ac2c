//! # Rubby Language Front End
//!
//! Lexer and parser for Rubby, a small Ruby-flavored language with:
//! - indentation-delimited bodies for classes, modules, methods and blocks
//! - `name -> (params)` method definitions and `&> (params)` blocks
//! - whitespace-sensitive calls (`foo -1` passes an argument, `foo - 1` subtracts)
//!
//! ## Architecture
//!
//! - `lexer`: Tokenization driven by a stack of lexer modes
//! - `parser`: Precedence-climbing parser producing the AST
//! - `error`: Error handling and diagnostics
//!
//! Indentation is turned into `Indent`/`Dedent` tokens by a layout pass that
//! runs between the two; [`parse_tokens`] accepts its output directly.

pub mod error;
pub mod lexer;
pub mod parser;

// Re-export commonly used types
pub use error::{Diagnostic, RubbyError, RubbyResult, SourceLocation};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{Ast, Node, Parser};

/// Version of the Rubby front end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tokenize Rubby source, dropping whitespace and comments
pub fn tokenize(source: &str, filename: Option<&str>) -> RubbyResult<Vec<Token>> {
    Lexer::new(source, filename).tokenize()
}

/// Lex and parse a Rubby program
///
/// Source without indented bodies parses as-is. Programs that use them need
/// their layout tokens spliced in first; see [`parse_tokens`].
pub fn parse(source: &str, filename: Option<&str>) -> RubbyResult<Ast> {
    let tokens = tokenize(source, filename)?;
    parse_tokens(tokens)
}

/// Parse an already-tokenized program
pub fn parse_tokens(tokens: Vec<Token>) -> RubbyResult<Ast> {
    Parser::new(tokens).parse()
}

//! Lexical analysis module
//!
//! This module handles tokenization of Rubby source code.

pub mod scanner;
pub mod state;
pub mod token;

pub use scanner::Lexer;
pub use state::{Flag, LexerState, Mode};
pub use token::{Keyword, Literal, Operator, OperatorCategory, Token, TokenType};

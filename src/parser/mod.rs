//! Parser module
//!
//! This module handles parsing tokens into an Abstract Syntax Tree (AST).

pub mod ast;
pub mod parser;
pub mod precedence;

pub use ast::{
    Argument, Ast, Block, BlockHeader, Call, Class, ClassHeader, HashElement, Method, MethodHeader, Module,
    ModuleHeader, Node,
};
pub use parser::Parser;
pub use precedence::{binary_binding, Associativity};

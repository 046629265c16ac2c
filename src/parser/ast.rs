//! Abstract Syntax Tree definitions
//!
//! This module defines the AST node types for the Rubby language. Every node
//! owns its children outright, so a parsed tree has no sharing and no cycles.
//!
//! Constructs whose trailing indented body is parsed after their header (classes,
//! modules, methods, blocks) are built through a header value that is consumed
//! once the body is known, rather than patched in place.

use crate::lexer::Operator;

/// Root AST node representing a complete program
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    pub statements: Vec<Node>,
}

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    IntegerLit(i64),
    FloatLit(f64),
    /// A string without interpolation, fragments already joined
    SimpleStringLit(String),
    /// `#{expr}` inside a double-quoted string
    Interpolation(Box<Node>),
    /// Alternating string and interpolation parts, starting and ending with
    /// a (possibly empty) `SimpleStringLit`
    InterpolatedString(Vec<Node>),
    ConstantRef(String),
    /// `:name`, `:Name` or `:"string"`; wraps a string-like node
    SymbolLit(Box<Node>),
    ArrayLit(Vec<Node>),
    HashLit(Vec<HashElement>),
    Call(Call),
    Block(Block),
    Method(Method),
    Class(Class),
    Module(Module),
    UnaryOp {
        operator: Operator,
        operand: Box<Node>,
    },
    BinaryOp {
        operator: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Explicit parentheses, kept so the tree mirrors the source
    Group(Box<Node>),
}

/// `key: value` inside a hash literal
#[derive(Debug, Clone, PartialEq)]
pub struct HashElement {
    pub key: Node,
    pub value: Node,
}

/// Method call, optionally followed by a block
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Node>,
    pub block: Option<Block>,
}

/// `&> (params)` with an indented body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub params: Vec<Argument>,
    pub body: Vec<Node>,
}

/// `name -> (params)` with an indented body
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Argument>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Box<Node>,
    pub superclass: Option<Box<Node>>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: Box<Node>,
    pub body: Vec<Node>,
}

/// Formal parameter of a method or block
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// `name`
    Plain(String),
    /// `*name`
    Splat(String),
    /// `name = default`
    Default { name: String, default: Node },
    /// `name: value`
    Keyword { name: String, value: Node },
}

impl Argument {
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(name) | Self::Splat(name) => name,
            Self::Default { name, .. } | Self::Keyword { name, .. } => name,
        }
    }
}

// ===== Deferred attachment =====

/// `class Name [< Superclass]` before its body has been parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHeader {
    name: Node,
    superclass: Option<Node>,
}

impl ClassHeader {
    pub fn new(name: Node, superclass: Option<Node>) -> Self {
        Self { name, superclass }
    }

    pub fn finish(self, body: Vec<Node>) -> Class {
        Class {
            name: Box::new(self.name),
            superclass: self.superclass.map(Box::new),
            body,
        }
    }
}

/// `module Name` before its body has been parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleHeader {
    name: Node,
}

impl ModuleHeader {
    pub fn new(name: Node) -> Self {
        Self { name }
    }

    pub fn finish(self, body: Vec<Node>) -> Module {
        Module {
            name: Box::new(self.name),
            body,
        }
    }
}

/// `name ->` before its parameter list and body have been parsed
#[derive(Debug, Clone, PartialEq)]
pub struct MethodHeader {
    name: String,
    params: Vec<Argument>,
}

impl MethodHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(self, params: Vec<Argument>) -> Self {
        Self { params, ..self }
    }

    pub fn finish(self, body: Vec<Node>) -> Method {
        Method {
            name: self.name,
            params: self.params,
            body,
        }
    }
}

/// `&> (params)` before its body has been parsed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockHeader {
    params: Vec<Argument>,
}

impl BlockHeader {
    pub fn new(params: Vec<Argument>) -> Self {
        Self { params }
    }

    pub fn finish(self, body: Vec<Node>) -> Block {
        Block {
            params: self.params,
            body,
        }
    }
}

impl Call {
    pub fn new(name: impl Into<String>, args: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            args,
            block: None,
        }
    }

    /// Attach the trailing block
    pub fn with_block(self, block: Block) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }
}

// ===== Construction helpers =====

impl Node {
    pub fn integer(value: i64) -> Self {
        Self::IntegerLit(value)
    }

    pub fn float(value: f64) -> Self {
        Self::FloatLit(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::SimpleStringLit(value.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Self::ConstantRef(name.into())
    }

    /// `:name`
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::SymbolLit(Box::new(Self::string(name)))
    }

    pub fn interpolation(expr: Node) -> Self {
        Self::Interpolation(Box::new(expr))
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Self::Call(Call::new(name, args))
    }

    pub fn unary(operator: Operator, operand: Node) -> Self {
        Self::UnaryOp {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn binary(operator: Operator, left: Node, right: Node) -> Self {
        Self::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn group(inner: Node) -> Self {
        Self::Group(Box::new(inner))
    }

    pub fn hash(pairs: Vec<(Node, Node)>) -> Self {
        Self::HashLit(
            pairs
                .into_iter()
                .map(|(key, value)| HashElement { key, value })
                .collect(),
        )
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::IntegerLit(_) | Self::FloatLit(_) | Self::SimpleStringLit(_) | Self::ConstantRef(_) => Vec::new(),
            Self::Interpolation(inner) | Self::SymbolLit(inner) | Self::Group(inner) => vec![inner.as_ref()],
            Self::UnaryOp { operand, .. } => vec![operand.as_ref()],
            Self::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::InterpolatedString(parts) => parts.iter().collect(),
            Self::ArrayLit(elements) => elements.iter().collect(),
            Self::HashLit(elements) => elements
                .iter()
                .flat_map(|element| [&element.key, &element.value])
                .collect(),
            Self::Call(call) => {
                let mut children: Vec<&Node> = call.args.iter().collect();
                if let Some(block) = &call.block {
                    children.extend(block.children());
                }
                children
            }
            Self::Block(block) => block.children(),
            Self::Method(method) => params_children(&method.params)
                .into_iter()
                .chain(method.body.iter())
                .collect(),
            Self::Class(class) => {
                let mut children = vec![class.name.as_ref()];
                children.extend(class.superclass.as_deref());
                children.extend(class.body.iter());
                children
            }
            Self::Module(module) => std::iter::once(module.name.as_ref())
                .chain(module.body.iter())
                .collect(),
        }
    }
}

impl Block {
    fn children(&self) -> Vec<&Node> {
        params_children(&self.params)
            .into_iter()
            .chain(self.body.iter())
            .collect()
    }
}

fn params_children(params: &[Argument]) -> Vec<&Node> {
    params
        .iter()
        .filter_map(|param| match param {
            Argument::Default { default, .. } => Some(default),
            Argument::Keyword { value, .. } => Some(value),
            Argument::Plain(_) | Argument::Splat(_) => None,
        })
        .collect()
}

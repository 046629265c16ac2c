//! Parser implementation
//!
//! This module implements the parser for the Rubby language: recursive
//! descent for statements and literals, precedence climbing for operators.
//! Indented bodies arrive as `Newline Indent ... Dedent` tokens inserted by the
//! layout pass ahead of the parser.

use super::ast::*;
use super::precedence::{self, binary_binding, Associativity};
use crate::error::{RubbyError, RubbyResult, SourceLocation};
use crate::lexer::{Keyword, Literal, Operator, Token, TokenType};

/// Parser for Rubby token streams
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Whitespace-separated argument lists currently open; calls inside one
    /// leave a trailing block to the outer call
    command_depth: usize,
}

/// One entry of a comma-separated list
enum ListItem {
    Expr(Node),
    Pair(HashElement),
}

impl Parser {
    /// Create a new parser from tokens
    ///
    /// Whitespace and comments are dropped and a missing `Eof` is supplied.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.retain(|token| !token.is_trivia());

        if !matches!(tokens.last().map(|t| &t.token_type), Some(TokenType::Eof)) {
            let location = tokens
                .last()
                .map(|t| t.location.clone())
                .unwrap_or_else(|| SourceLocation::at(1, 1));
            tokens.push(Token::new(TokenType::Eof, String::new(), location));
        }

        Self {
            tokens,
            current: 0,
            command_depth: 0,
        }
    }

    /// Parse tokens into an AST
    pub fn parse(&mut self) -> RubbyResult<Ast> {
        let mut statements = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }
            statements.push(self.statement()?);
        }

        Ok(Ast { statements })
    }

    // ===== Statements =====

    fn statement(&mut self) -> RubbyResult<Node> {
        let node = match self.list_item()? {
            ListItem::Pair(first) => self.hash_tail(first)?,
            ListItem::Expr(expr) => expr,
        };

        if self.match_token(TokenType::Newline)
            || self.check(TokenType::Dedent)
            || self.is_at_end()
            || self.after_body()
        {
            Ok(node)
        } else {
            Err(self.unexpected(&["newline", "dedent", "end of input"]))
        }
    }

    /// `Newline+ Indent statement+ (Dedent | end of input)`, if present
    fn indented_contents(&mut self) -> RubbyResult<Option<Vec<Node>>> {
        let mut offset = 0;
        while matches!(self.peek_at(offset).token_type, TokenType::Newline) {
            offset += 1;
        }
        if offset == 0 || !matches!(self.peek_at(offset).token_type, TokenType::Indent) {
            return Ok(None);
        }
        self.current += offset + 1;

        let body = self.nested(|p| {
            let mut statements = Vec::new();
            loop {
                p.skip_newlines();
                if p.check(TokenType::Dedent) || p.is_at_end() {
                    if statements.is_empty() {
                        return Err(p.unexpected(&["statement"]));
                    }
                    p.match_token(TokenType::Dedent);
                    return Ok(statements);
                }
                statements.push(p.statement()?);
            }
        })?;

        Ok(Some(body))
    }

    // ===== Lists and hashes =====

    fn list_item(&mut self) -> RubbyResult<ListItem> {
        if self.at_symbol_key() {
            let name = self.advance().lexeme.clone();
            self.advance(); // ':'
            let value = self.expression()?;
            return Ok(ListItem::Pair(HashElement {
                key: Node::symbol(name),
                value,
            }));
        }

        let expr = self.expression()?;
        if self.at_hash_separator() {
            self.advance();
            let value = self.expression()?;
            return Ok(ListItem::Pair(HashElement { key: expr, value }));
        }

        Ok(ListItem::Expr(expr))
    }

    /// Comma-separated expressions; runs of `key: value` pairs collapse into
    /// one hash element
    fn expression_list(&mut self) -> RubbyResult<Vec<Node>> {
        let mut items = Vec::new();
        let mut pairs = Vec::new();

        loop {
            match self.list_item()? {
                ListItem::Pair(pair) => pairs.push(pair),
                ListItem::Expr(expr) => {
                    if !pairs.is_empty() {
                        items.push(Node::HashLit(std::mem::take(&mut pairs)));
                    }
                    items.push(expr);
                }
            }

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        if !pairs.is_empty() {
            items.push(Node::HashLit(pairs));
        }
        Ok(items)
    }

    fn hash_element(&mut self) -> RubbyResult<HashElement> {
        match self.list_item()? {
            ListItem::Pair(pair) => Ok(pair),
            ListItem::Expr(_) => Err(self.unexpected(&["':' and a value"])),
        }
    }

    fn hash_tail(&mut self, first: HashElement) -> RubbyResult<Node> {
        let mut elements = vec![first];
        while self.match_token(TokenType::Comma) {
            elements.push(self.hash_element()?);
        }
        Ok(Node::HashLit(elements))
    }

    /// `name: value` where the colon is followed by whitespace
    fn at_symbol_key(&self) -> bool {
        matches!(
            self.peek().token_type,
            TokenType::Identifier(_) | TokenType::Keyword(_)
        ) && matches!(self.peek_at(1).token_type, TokenType::Colon)
            && self.peek_at(2).spaced
    }

    fn at_hash_separator(&self) -> bool {
        self.check(TokenType::Colon) && self.peek_at(1).spaced && !self.after_body()
    }

    // ===== Expressions =====

    fn expression(&mut self) -> RubbyResult<Node> {
        self.binary(precedence::ASSIGNMENT)
    }

    /// Precedence climbing over binary operators binding at least as tightly
    /// as `min_precedence`
    fn binary(&mut self, min_precedence: u8) -> RubbyResult<Node> {
        let mut left = self.unary()?;

        while let Some((operator, binding, associativity)) = self.peek_binary_operator() {
            if binding < min_precedence {
                break;
            }
            self.advance();

            let next_min = match associativity {
                Associativity::Right => binding,
                Associativity::Left | Associativity::NonAssociative => binding + 1,
            };
            let right = self.binary(next_min)?;
            left = Node::binary(operator, left, right);

            if associativity == Associativity::NonAssociative {
                if let Some((next, next_binding, _)) = self.peek_binary_operator() {
                    if next_binding == binding {
                        return Err(self.non_associative(next));
                    }
                }
            }
        }

        Ok(left)
    }

    fn unary(&mut self) -> RubbyResult<Node> {
        if let TokenType::Operator(operator) = self.peek().token_type {
            if operator.is_unary() {
                self.advance();
                let operand = self.unary()?;
                return Ok(Node::unary(operator, operand));
            }
        }

        self.primary()
    }

    fn primary(&mut self) -> RubbyResult<Node> {
        match self.peek().token_type.clone() {
            TokenType::Literal(Literal::Integer(value)) => {
                self.advance();
                Ok(Node::IntegerLit(value))
            }
            TokenType::Literal(Literal::Float(value)) => {
                self.advance();
                Ok(Node::FloatLit(value))
            }
            TokenType::StringFragment(_) => self.string(),
            TokenType::Constant(name) => {
                self.advance();
                Ok(Node::ConstantRef(name))
            }
            TokenType::Keyword(Keyword::Class) => self.class_definition(),
            TokenType::Keyword(Keyword::Module) => self.module_definition(),
            TokenType::Colon => self.symbol(),
            TokenType::LeftBracket => self.array(),
            TokenType::LeftBrace => self.hash_literal(),
            TokenType::LeftParen => self.group(),
            TokenType::BlockArrow => Ok(Node::Block(self.block()?)),
            TokenType::Identifier(_) => {
                if matches!(self.peek_at(1).token_type, TokenType::Arrow) {
                    self.method_definition()
                } else {
                    self.call()
                }
            }
            _ => Err(self.unexpected(&["expression"])),
        }
    }

    // ===== Literals =====

    /// Adjacent fragments concatenate; interpolations split the string into
    /// parts that always start and end with a string
    fn string(&mut self) -> RubbyResult<Node> {
        let mut text = String::new();
        let mut parts = Vec::new();

        if let TokenType::StringFragment(first) = &self.advance().token_type {
            text.push_str(first);
        }

        loop {
            let token = self.peek();
            match &token.token_type {
                TokenType::StringFragment(more) if !token.spaced => {
                    text.push_str(more);
                    self.advance();
                }
                TokenType::InterpolationStart => {
                    self.advance();
                    let expr = self.nested(|p| p.expression())?;
                    self.consume(TokenType::InterpolationEnd, &["'}'"])?;

                    parts.push(Node::SimpleStringLit(std::mem::take(&mut text)));
                    parts.push(Node::interpolation(expr));
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            Ok(Node::SimpleStringLit(text))
        } else {
            parts.push(Node::SimpleStringLit(text));
            Ok(Node::InterpolatedString(parts))
        }
    }

    fn symbol(&mut self) -> RubbyResult<Node> {
        self.advance(); // ':'

        if self.peek().spaced {
            return Err(self.unexpected(&["symbol name"]));
        }

        match self.peek().token_type.clone() {
            TokenType::Identifier(name) | TokenType::Constant(name) => {
                self.advance();
                Ok(Node::symbol(name))
            }
            TokenType::Keyword(keyword) => {
                self.advance();
                Ok(Node::symbol(keyword.as_str()))
            }
            TokenType::StringFragment(_) => Ok(Node::SymbolLit(Box::new(self.string()?))),
            _ => Err(self.unexpected(&["identifier", "constant", "string"])),
        }
    }

    fn array(&mut self) -> RubbyResult<Node> {
        self.advance(); // '['

        if self.match_token(TokenType::RightBracket) {
            return Ok(Node::ArrayLit(Vec::new()));
        }

        let elements = self.nested(|p| p.expression_list())?;
        self.consume(TokenType::RightBracket, &["','", "']'"])?;
        Ok(Node::ArrayLit(elements))
    }

    fn hash_literal(&mut self) -> RubbyResult<Node> {
        self.advance(); // '{'

        if self.match_token(TokenType::RightBrace) {
            return Ok(Node::HashLit(Vec::new()));
        }

        let hash = self.nested(|p| {
            let first = p.hash_element()?;
            p.hash_tail(first)
        })?;
        self.consume(TokenType::RightBrace, &["','", "'}'"])?;
        Ok(hash)
    }

    fn group(&mut self) -> RubbyResult<Node> {
        self.advance(); // '('
        let inner = self.nested(|p| p.expression())?;
        self.consume(TokenType::RightParen, &["')'"])?;
        Ok(Node::group(inner))
    }

    // ===== Definitions =====

    fn class_definition(&mut self) -> RubbyResult<Node> {
        self.advance(); // 'class'
        let name = self.constant()?;
        let superclass = if self.match_operator(Operator::Less) {
            Some(self.constant()?)
        } else {
            None
        };

        let header = ClassHeader::new(name, superclass);
        let body = self.indented_contents()?.unwrap_or_default();
        Ok(Node::Class(header.finish(body)))
    }

    fn module_definition(&mut self) -> RubbyResult<Node> {
        self.advance(); // 'module'
        let header = ModuleHeader::new(self.constant()?);
        let body = self.indented_contents()?.unwrap_or_default();
        Ok(Node::Module(header.finish(body)))
    }

    fn method_definition(&mut self) -> RubbyResult<Node> {
        let mut header = MethodHeader::new(self.consume_identifier(&["method name"])?);
        self.consume(TokenType::Arrow, &["'->'"])?;

        if self.check(TokenType::LeftParen) {
            header = header.with_params(self.parameters()?);
        }

        let body = self.indented_contents()?.unwrap_or_default();
        Ok(Node::Method(header.finish(body)))
    }

    fn block(&mut self) -> RubbyResult<Block> {
        self.consume(TokenType::BlockArrow, &["'&>'"])?;

        let params = if self.check(TokenType::LeftParen) {
            self.parameters()?
        } else {
            Vec::new()
        };

        let header = BlockHeader::new(params);
        let body = self.indented_contents()?.unwrap_or_default();
        Ok(header.finish(body))
    }

    fn parameters(&mut self) -> RubbyResult<Vec<Argument>> {
        self.consume(TokenType::LeftParen, &["'('"])?;

        if self.match_token(TokenType::RightParen) {
            return Ok(Vec::new());
        }

        let params = self.nested(|p| {
            let mut params = vec![p.parameter()?];
            while p.match_token(TokenType::Comma) {
                params.push(p.parameter()?);
            }
            Ok(params)
        })?;
        self.consume(TokenType::RightParen, &["','", "')'"])?;
        Ok(params)
    }

    /// `name`, `*name`, `name = default` or `name: value`
    fn parameter(&mut self) -> RubbyResult<Argument> {
        if self.match_operator(Operator::Star) {
            let name = self.consume_identifier(&["parameter name"])?;
            return Ok(Argument::Splat(name));
        }

        let name = self.consume_identifier(&["parameter"])?;

        // The lexer keeps `=` on the name in `(a= 1)`
        if let Some(stripped) = name.strip_suffix('=') {
            let default = self.expression()?;
            return Ok(Argument::Default {
                name: stripped.to_string(),
                default,
            });
        }

        if self.match_operator(Operator::Assign) {
            let default = self.expression()?;
            return Ok(Argument::Default { name, default });
        }

        if self.match_token(TokenType::Colon) {
            let value = self.expression()?;
            return Ok(Argument::Keyword { name, value });
        }

        Ok(Argument::Plain(name))
    }

    // ===== Calls =====

    fn call(&mut self) -> RubbyResult<Node> {
        let name = self.consume_identifier(&["method name"])?;

        let args = if self.check(TokenType::LeftParen) {
            if self.peek().spaced {
                self.spaced_arguments()?
            } else {
                self.parenthesized_arguments()?
            }
        } else if self.at_command_argument() {
            self.command_arguments()?
        } else {
            Vec::new()
        };

        let call = Call::new(name, args);
        if self.command_depth == 0 && self.check(TokenType::BlockArrow) {
            let block = self.block()?;
            return Ok(Node::Call(call.with_block(block)));
        }

        Ok(Node::Call(call))
    }

    fn parenthesized_arguments(&mut self) -> RubbyResult<Vec<Node>> {
        self.advance(); // '('

        if self.match_token(TokenType::RightParen) {
            return Ok(Vec::new());
        }

        let args = self.nested(|p| p.expression_list())?;
        self.consume(TokenType::RightParen, &["','", "')'"])?;
        Ok(args)
    }

    /// `name (...)`: an argument list unless the parentheses are only the
    /// start of a larger first argument, as in `puts (1 + 2) * 3`
    fn spaced_arguments(&mut self) -> RubbyResult<Vec<Node>> {
        if self.continues_after_parens() {
            self.command_arguments()
        } else {
            self.parenthesized_arguments()
        }
    }

    /// Whether an infix operator or a comma follows the `)` matching the `(`
    /// at the cursor. Scans tokens only; nothing is parsed.
    fn continues_after_parens(&self) -> bool {
        let mut depth = 0usize;

        for (offset, token) in self.tokens[self.current..].iter().enumerate() {
            match token.token_type {
                TokenType::LeftParen => depth += 1,
                TokenType::RightParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return match self.peek_at(offset + 1).token_type {
                            TokenType::Comma => true,
                            TokenType::Operator(operator) => binary_binding(operator).is_some(),
                            _ => false,
                        };
                    }
                }
                TokenType::Eof => return false,
                _ => {}
            }
        }

        false
    }

    fn command_arguments(&mut self) -> RubbyResult<Vec<Node>> {
        self.command_depth += 1;
        let args = self.expression_list();
        self.command_depth -= 1;
        args
    }

    /// Whether the next token opens a whitespace-separated argument
    ///
    /// A prefix operator counts only when hugging its operand, so `foo -1`
    /// passes an argument while `foo - 1` subtracts.
    fn at_command_argument(&self) -> bool {
        let token = self.peek();
        if !token.spaced {
            return false;
        }

        let next = self.peek_at(1);
        match &token.token_type {
            TokenType::Literal(_)
            | TokenType::StringFragment(_)
            | TokenType::Identifier(_)
            | TokenType::Constant(_)
            | TokenType::LeftBracket
            | TokenType::LeftBrace
            | TokenType::LeftParen => true,
            TokenType::Colon => {
                !next.spaced
                    && matches!(
                        next.token_type,
                        TokenType::Identifier(_)
                            | TokenType::Constant(_)
                            | TokenType::Keyword(_)
                            | TokenType::StringFragment(_)
                    )
            }
            TokenType::Operator(operator) => {
                operator.is_unary()
                    && !next.spaced
                    && !matches!(
                        next.token_type,
                        TokenType::Newline | TokenType::Indent | TokenType::Dedent | TokenType::Eof
                    )
            }
            _ => false,
        }
    }

    // ===== Helper Methods =====

    /// Run `f` outside any whitespace-separated argument list
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> RubbyResult<T>) -> RubbyResult<T> {
        let saved = self.command_depth;
        self.command_depth = 0;
        let result = f(self);
        self.command_depth = saved;
        result
    }

    fn peek_binary_operator(&self) -> Option<(Operator, u8, Associativity)> {
        if self.after_body() {
            return None;
        }
        match self.peek().token_type {
            TokenType::Operator(operator) => {
                binary_binding(operator).map(|(binding, associativity)| (operator, binding, associativity))
            }
            _ => None,
        }
    }

    /// The previous token closed an indented body, so nothing after it can
    /// continue the same expression
    fn after_body(&self) -> bool {
        self.current > 0 && matches!(self.tokens[self.current - 1].token_type, TokenType::Dedent)
    }

    fn constant(&mut self) -> RubbyResult<Node> {
        if let TokenType::Constant(name) = &self.peek().token_type {
            let name = name.clone();
            self.advance();
            Ok(Node::ConstantRef(name))
        } else {
            Err(self.unexpected(&["constant"]))
        }
    }

    fn consume_identifier(&mut self, expected: &[&str]) -> RubbyResult<String> {
        if let TokenType::Identifier(name) = &self.peek().token_type {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn skip_newlines(&mut self) {
        while self.match_token(TokenType::Newline) {}
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_operator(&mut self, operator: Operator) -> bool {
        if matches!(self.peek().token_type, TokenType::Operator(op) if op == operator) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Compare token kinds, ignoring payloads
    fn check(&self, token_type: TokenType) -> bool {
        std::mem::discriminant(&self.peek().token_type) == std::mem::discriminant(&token_type)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Look `offset` tokens ahead, stopping at `Eof`
    fn peek_at(&self, offset: usize) -> &Token {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, token_type: TokenType, expected: &[&str]) -> RubbyResult<&Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &[&str]) -> RubbyError {
        let token = self.peek();
        RubbyError::unexpected_token(token.describe(), expected, token.location.clone())
    }

    fn non_associative(&self, operator: Operator) -> RubbyError {
        let token = self.peek();
        RubbyError::ParseError {
            message: format!(
                "Range operators do not chain; parenthesize before '{}'",
                operator
            ),
            location: token.location.clone(),
            found: token.describe(),
            expected: vec!["newline".to_string(), "end of input".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str) -> RubbyResult<Vec<Node>> {
        let tokens = Lexer::new(source, None).tokenize()?;
        Ok(Parser::new(tokens).parse()?.statements)
    }

    fn parse_one(source: &str) -> Node {
        let mut statements = parse_source(source).unwrap();
        assert_eq!(statements.len(), 1, "expected one statement in {:?}", source);
        statements.remove(0)
    }

    fn marker(token_type: TokenType) -> Token {
        Token::new(token_type, String::new(), SourceLocation::at(0, 0))
    }

    /// Stand-in for the layout pass: two spaces per indentation level
    fn indented(lines: &[&str]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut depth = 0;

        for line in lines {
            let trimmed = line.trim_start();
            let level = (line.len() - trimmed.len()) / 2;
            while depth < level {
                tokens.push(marker(TokenType::Indent));
                depth += 1;
            }
            while depth > level {
                tokens.push(marker(TokenType::Dedent));
                depth -= 1;
            }

            let mut line_tokens = Lexer::new(trimmed, None).tokenize().unwrap();
            line_tokens.pop();
            tokens.extend(line_tokens);
            tokens.push(marker(TokenType::Newline));
        }

        for _ in 0..depth {
            tokens.push(marker(TokenType::Dedent));
        }
        tokens
    }

    fn parse_lines(lines: &[&str]) -> Vec<Node> {
        Parser::new(indented(lines)).parse().unwrap().statements
    }

    fn call(name: &str) -> Node {
        Node::call(name, vec![])
    }

    fn int(value: i64) -> Node {
        Node::integer(value)
    }

    fn bin(operator: Operator, left: Node, right: Node) -> Node {
        Node::binary(operator, left, right)
    }

    fn parse_error(source: &str) -> RubbyError {
        match parse_source(source) {
            Err(err @ RubbyError::ParseError { .. }) => err,
            other => panic!("expected a parse error for {:?}, got {:?}", source, other),
        }
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_one("42"), int(42));
        assert_eq!(parse_one("2.5"), Node::float(2.5));
        assert_eq!(parse_one("Foo"), Node::constant("Foo"));
        assert_eq!(parse_one("'hi'"), Node::string("hi"));
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse_one("1 + 2 * 3"),
            bin(Operator::Plus, int(1), bin(Operator::Star, int(2), int(3)))
        );
    }

    #[test]
    fn test_group_is_preserved() {
        assert_eq!(
            parse_one("(1 + 2) * 3"),
            bin(
                Operator::Star,
                Node::group(bin(Operator::Plus, int(1), int(2))),
                int(3)
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse_one("1 - 2 - 3"),
            bin(Operator::Minus, bin(Operator::Minus, int(1), int(2)), int(3))
        );
        assert_eq!(
            parse_one("8 / 4 % 3"),
            bin(Operator::Percent, bin(Operator::Slash, int(8), int(4)), int(3))
        );
    }

    #[test]
    fn test_right_associativity() {
        assert_eq!(
            parse_one("2 ** 3 ** 2"),
            bin(Operator::StarStar, int(2), bin(Operator::StarStar, int(3), int(2)))
        );
        assert_eq!(
            parse_one("a = b += 1"),
            bin(
                Operator::Assign,
                call("a"),
                bin(Operator::PlusAssign, call("b"), int(1))
            )
        );
    }

    #[test]
    fn test_unary_binds_tightest() {
        assert_eq!(
            parse_one("-2 ** 2"),
            bin(Operator::StarStar, Node::unary(Operator::Minus, int(2)), int(2))
        );
        assert_eq!(
            parse_one("!a && b"),
            bin(Operator::AndAnd, Node::unary(Operator::Bang, call("a")), call("b"))
        );
        assert_eq!(
            parse_one("~-x"),
            Node::unary(Operator::Tilde, Node::unary(Operator::Minus, call("x")))
        );
    }

    #[test]
    fn test_operator_levels() {
        assert_eq!(
            parse_one("a || b && c"),
            bin(Operator::OrOr, call("a"), bin(Operator::AndAnd, call("b"), call("c")))
        );
        assert_eq!(
            parse_one("1 | 2 & 3"),
            bin(Operator::Pipe, int(1), bin(Operator::Ampersand, int(2), int(3)))
        );
        assert_eq!(
            parse_one("1 << 2 + 3"),
            bin(Operator::ShiftLeft, int(1), bin(Operator::Plus, int(2), int(3)))
        );
        assert_eq!(
            parse_one("1 & 3 == 1"),
            bin(Operator::Equal, bin(Operator::Ampersand, int(1), int(3)), int(1))
        );
        assert_eq!(
            parse_one("x = 1..n + 1"),
            bin(
                Operator::Assign,
                call("x"),
                bin(Operator::DotDot, int(1), bin(Operator::Plus, call("n"), int(1)))
            )
        );
    }

    #[test]
    fn test_comparisons_chain_left_to_right() {
        assert_eq!(
            parse_one("1 < 2 < 3"),
            bin(Operator::Less, bin(Operator::Less, int(1), int(2)), int(3))
        );
    }

    #[test]
    fn test_range_is_non_associative() {
        assert_eq!(parse_one("1...10"), bin(Operator::DotDotDot, int(1), int(10)));

        let err = parse_error("1..2..3");
        assert!(err.message().contains("do not chain"));
    }

    #[test]
    fn test_binary_tilde_is_rejected() {
        let err = parse_error("1 ~ 2");
        assert_eq!(err.expected(), ["newline", "dedent", "end of input"]);
    }

    #[test]
    fn test_adjacent_fragments_concatenate() {
        assert_eq!(parse_one("'a''b'"), Node::string("ab"));
        assert_eq!(parse_one("\"x\"'y'"), Node::string("xy"));
    }

    #[test]
    fn test_interpolated_string() {
        assert_eq!(
            parse_one("\"a#{b}c\""),
            Node::InterpolatedString(vec![
                Node::string("a"),
                Node::interpolation(call("b")),
                Node::string("c"),
            ])
        );
        assert_eq!(
            parse_one("\"#{a} and #{b + 1}\""),
            Node::InterpolatedString(vec![
                Node::string(""),
                Node::interpolation(call("a")),
                Node::string(" and "),
                Node::interpolation(bin(Operator::Plus, call("b"), int(1))),
                Node::string(""),
            ])
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(parse_one(":name"), Node::symbol("name"));
        assert_eq!(parse_one(":Name"), Node::symbol("Name"));
        assert_eq!(parse_one(":class"), Node::symbol("class"));
        assert_eq!(parse_one(":empty?"), Node::symbol("empty?"));
        assert_eq!(
            parse_one(":\"x#{y}\""),
            Node::SymbolLit(Box::new(Node::InterpolatedString(vec![
                Node::string("x"),
                Node::interpolation(call("y")),
                Node::string(""),
            ])))
        );
    }

    #[test]
    fn test_arrays() {
        assert_eq!(parse_one("[]"), Node::ArrayLit(vec![]));
        assert_eq!(
            parse_one("[1, 'two', [3]]"),
            Node::ArrayLit(vec![
                int(1),
                Node::string("two"),
                Node::ArrayLit(vec![int(3)]),
            ])
        );
        assert_eq!(
            parse_one("[0, a: 1, b: 2]"),
            Node::ArrayLit(vec![
                int(0),
                Node::hash(vec![(Node::symbol("a"), int(1)), (Node::symbol("b"), int(2))]),
            ])
        );
    }

    #[test]
    fn test_hashes() {
        assert_eq!(parse_one("{}"), Node::HashLit(vec![]));
        assert_eq!(
            parse_one("{a: 1, 'b': 2, :c: 3}"),
            Node::hash(vec![
                (Node::symbol("a"), int(1)),
                (Node::string("b"), int(2)),
                (Node::symbol("c"), int(3)),
            ])
        );
        assert_eq!(
            parse_one("a: 1, b: 'x'"),
            Node::hash(vec![
                (Node::symbol("a"), int(1)),
                (Node::symbol("b"), Node::string("x")),
            ])
        );
    }

    #[test]
    fn test_calls() {
        assert_eq!(parse_one("foo"), call("foo"));
        assert_eq!(parse_one("foo()"), call("foo"));
        assert_eq!(parse_one("foo(1, 2)"), Node::call("foo", vec![int(1), int(2)]));
        assert_eq!(parse_one("foo (1, 2)"), Node::call("foo", vec![int(1), int(2)]));
        assert_eq!(parse_one("foo 1, 2"), Node::call("foo", vec![int(1), int(2)]));
        assert_eq!(
            parse_one("foo bar baz"),
            Node::call("foo", vec![Node::call("bar", vec![call("baz")])])
        );
    }

    #[test]
    fn test_spacing_decides_unary_or_binary() {
        assert_eq!(
            parse_one("foo -1"),
            Node::call("foo", vec![Node::unary(Operator::Minus, int(1))])
        );
        assert_eq!(parse_one("foo - 1"), bin(Operator::Minus, call("foo"), int(1)));
        assert_eq!(parse_one("foo-1"), bin(Operator::Minus, call("foo"), int(1)));
        assert_eq!(
            parse_one("foo *args"),
            Node::call("foo", vec![Node::unary(Operator::Star, call("args"))])
        );
    }

    #[test]
    fn test_spaced_parentheses_can_start_an_argument() {
        assert_eq!(
            parse_one("puts (1 + 2) * 3"),
            Node::call(
                "puts",
                vec![bin(
                    Operator::Star,
                    Node::group(bin(Operator::Plus, int(1), int(2))),
                    int(3)
                )]
            )
        );
        assert_eq!(
            parse_one("puts (1), 2"),
            Node::call("puts", vec![Node::group(int(1)), int(2)])
        );
    }

    fn count_calls(node: &Node) -> usize {
        let own = usize::from(matches!(node, Node::Call(_)));
        own + node.children().into_iter().map(count_calls).sum::<usize>()
    }

    #[test]
    fn test_deeply_nested_spaced_calls() {
        let mut source = "1".to_string();
        for level in 0..40 {
            source = format!("f{} ({}) + 1", level, source);
        }

        let node = parse_one(&source);
        assert_eq!(count_calls(&node), 40);

        match &node {
            Node::Call(call) => {
                assert_eq!(call.name, "f39");
                assert_eq!(call.args.len(), 1);
                assert!(matches!(
                    &call.args[0],
                    Node::BinaryOp { operator: Operator::Plus, left, .. } if matches!(left.as_ref(), Node::Group(_))
                ));
            }
            other => panic!("expected a call, got {:?}", other),
        }
    }

    #[test]
    fn test_spaced_parentheses_with_bad_contents() {
        assert_eq!(parse_error("foo (1 2)").expected(), ["','", "')'"]);
    }

    #[test]
    fn test_trailing_pairs_form_one_hash_argument() {
        assert_eq!(
            parse_one("link 'home', to: '/', id: 7"),
            Node::call(
                "link",
                vec![
                    Node::string("home"),
                    Node::hash(vec![
                        (Node::symbol("to"), Node::string("/")),
                        (Node::symbol("id"), int(7)),
                    ]),
                ]
            )
        );
        assert_eq!(
            parse_one("get(:x, cache: 1)"),
            Node::call(
                "get",
                vec![Node::symbol("x"), Node::hash(vec![(Node::symbol("cache"), int(1))])]
            )
        );
    }

    #[test]
    fn test_assignment_to_call_result() {
        assert_eq!(
            parse_one("total = price * 2"),
            bin(Operator::Assign, call("total"), bin(Operator::Star, call("price"), int(2)))
        );
        assert_eq!(
            parse_one("x=1"),
            bin(Operator::Assign, call("x"), int(1))
        );
    }

    #[test]
    fn test_setter_style_call() {
        assert_eq!(parse_one("name= 'Rex'"), Node::call("name=", vec![Node::string("Rex")]));
    }

    #[test]
    fn test_method_parameters() {
        let node = parse_one("greet -> (name, *rest, greeting = 'hi', loud: 0, tone= 1)");
        assert_eq!(
            node,
            Node::Method(Method {
                name: "greet".to_string(),
                params: vec![
                    Argument::Plain("name".to_string()),
                    Argument::Splat("rest".to_string()),
                    Argument::Default {
                        name: "greeting".to_string(),
                        default: Node::string("hi"),
                    },
                    Argument::Keyword {
                        name: "loud".to_string(),
                        value: int(0),
                    },
                    Argument::Default {
                        name: "tone".to_string(),
                        default: int(1),
                    },
                ],
                body: vec![],
            })
        );
    }

    #[test]
    fn test_method_without_parameters() {
        assert_eq!(
            parse_one("run ->"),
            Node::Method(MethodHeader::new("run").finish(vec![]))
        );
        assert_eq!(
            parse_one("run -> ()"),
            Node::Method(MethodHeader::new("run").finish(vec![]))
        );
    }

    #[test]
    fn test_method_with_body() {
        let statements = parse_lines(&["name= -> (value)", "  store :name, value", "done"]);
        assert_eq!(
            statements,
            vec![
                Node::Method(
                    MethodHeader::new("name=")
                        .with_params(vec![Argument::Plain("value".to_string())])
                        .finish(vec![Node::call(
                            "store",
                            vec![Node::symbol("name"), call("value")]
                        )])
                ),
                call("done"),
            ]
        );
    }

    #[test]
    fn test_call_with_block() {
        let statements = parse_lines(&["each &> (x) ", "  puts x"]);
        let block = BlockHeader::new(vec![Argument::Plain("x".to_string())])
            .finish(vec![Node::call("puts", vec![call("x")])]);

        assert_eq!(statements, vec![Node::Call(Call::new("each", vec![]).with_block(block))]);
    }

    #[test]
    fn test_block_attaches_to_outer_call() {
        let statements = parse_lines(&["map items, 2 &> (item)", "  item * 2"]);
        match &statements[0] {
            Node::Call(call) => {
                assert_eq!(call.name, "map");
                assert_eq!(call.args, vec![Node::call("items", vec![]), int(2)]);
                let block = call.block.as_ref().unwrap();
                assert_eq!(block.params, vec![Argument::Plain("item".to_string())]);
                assert_eq!(block.body, vec![bin(Operator::Star, Node::call("item", vec![]), int(2))]);
            }
            other => panic!("expected a call, got {:?}", other),
        }
    }

    #[test]
    fn test_block_without_body_or_params() {
        assert_eq!(
            parse_one("run(1) &>"),
            Node::Call(Call::new("run", vec![int(1)]).with_block(Block::default()))
        );
        assert_eq!(parse_one("&> (a, *b)"), Node::Block(Block {
            params: vec![Argument::Plain("a".to_string()), Argument::Splat("b".to_string())],
            body: vec![],
        }));
    }

    #[test]
    fn test_class_and_module_definitions() {
        let statements = parse_lines(&[
            "module Zoo",
            "  class Dog < Animal",
            "    bark ->",
            "      'woof'",
            "    legs -> ()",
            "      4",
            "class Empty",
        ]);

        let bark = Node::Method(MethodHeader::new("bark").finish(vec![Node::string("woof")]));
        let legs = Node::Method(MethodHeader::new("legs").finish(vec![int(4)]));
        let dog = Node::Class(
            ClassHeader::new(Node::constant("Dog"), Some(Node::constant("Animal"))).finish(vec![bark, legs]),
        );

        assert_eq!(
            statements,
            vec![
                Node::Module(ModuleHeader::new(Node::constant("Zoo")).finish(vec![dog])),
                Node::Class(ClassHeader::new(Node::constant("Empty"), None).finish(vec![])),
            ]
        );
    }

    #[test]
    fn test_statement_after_body_is_separate() {
        let statements = parse_lines(&["each &>", "  x", "-1"]);
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1], Node::unary(Operator::Minus, int(1)));
    }

    #[test]
    fn test_body_may_end_at_end_of_input() {
        let mut tokens = Lexer::new("class A\n", None).tokenize().unwrap();
        tokens.pop();
        tokens.push(marker(TokenType::Indent));
        tokens.extend(Lexer::new("1", None).tokenize().unwrap());

        let ast = Parser::new(tokens).parse().unwrap();
        assert_eq!(
            ast.statements,
            vec![Node::Class(ClassHeader::new(Node::constant("A"), None).finish(vec![int(1)]))]
        );
    }

    #[test]
    fn test_statements_and_blank_lines() {
        assert_eq!(
            parse_source("1\n\n# note\nfoo 2\n").unwrap(),
            vec![int(1), Node::call("foo", vec![int(2)])]
        );
    }

    #[test]
    fn test_missing_operand() {
        let err = parse_error("1 +");
        assert_eq!(err.expected(), ["expression"]);
        assert!(err.message().contains("end of input"));
    }

    #[test]
    fn test_unclosed_delimiters() {
        assert_eq!(parse_error("(1").expected(), ["')'"]);
        assert_eq!(parse_error("[1 2]").expected(), ["','", "']'"]);
        assert_eq!(parse_error("{a: 1").expected(), ["','", "'}'"]);
    }

    #[test]
    fn test_error_reports_offending_token() {
        match parse_error("1 2\n") {
            RubbyError::ParseError { found, location, .. } => {
                assert_eq!(found, "'2'");
                assert_eq!(location, SourceLocation::at(1, 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_stray_dedent() {
        let tokens = vec![marker(TokenType::Dedent)];
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.expected(), ["expression"]);
    }

    #[test]
    fn test_empty_indented_body_is_an_error() {
        let tokens = vec![
            Token::new(TokenType::Keyword(Keyword::Class), "class".into(), SourceLocation::at(1, 1)),
            Token::new(TokenType::Constant("A".into()), "A".into(), SourceLocation::at(1, 7)).with_spacing(true),
            marker(TokenType::Newline),
            marker(TokenType::Indent),
            marker(TokenType::Dedent),
        ];
        let err = Parser::new(tokens).parse().unwrap_err();
        assert_eq!(err.expected(), ["statement"]);
    }
}

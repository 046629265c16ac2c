//! Lexer/Scanner implementation for the Rubby language
//!
//! This module implements lexical analysis, converting source code into tokens.
//! Which rules apply depends on the mode on top of the [`LexerState`] stack:
//! code, single-quoted strings, double-quoted strings with `#{}`
//! interpolation, or comments.

use std::num::IntErrorKind;

use super::state::{LexerState, Mode};
use super::token::{Keyword, Literal, Operator, Token, TokenType};
use crate::error::{RubbyError, RubbyResult, SourceLocation};

/// Lexer for Rubby source code
///
/// Iterating a `Lexer` yields the raw token stream, whitespace and comments
/// included, ending with a single `Eof`. Use [`Lexer::tokenize`] for the
/// stream the parser consumes.
pub struct Lexer {
    source: Vec<char>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    filename: Option<String>,
    state: LexerState,
    /// Whitespace or a comment was the last token produced
    spaced: bool,
    finished: bool,
}

impl Lexer {
    /// Create a new lexer
    pub fn new(source: &str, filename: Option<&str>) -> Self {
        Self {
            source: source.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            filename: filename.map(|s| s.to_string()),
            state: LexerState::new(),
            spaced: false,
            finished: false,
        }
    }

    /// Tokenize the source code, dropping whitespace and comments
    ///
    /// The returned vector always ends with `Eof`.
    pub fn tokenize(&mut self) -> RubbyResult<Vec<Token>> {
        let mut tokens = Vec::new();

        for token in self.by_ref() {
            let token = token?;
            if !token.is_trivia() {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }

    /// Rewind to the beginning of the source with a fresh mode stack
    pub fn reset(&mut self) {
        self.start = 0;
        self.current = 0;
        self.line = 1;
        self.column = 1;
        self.start_line = 1;
        self.start_column = 1;
        self.state = LexerState::new();
        self.spaced = false;
        self.finished = false;
    }

    /// Scan until a token is produced; some rules only switch modes
    fn scan_token(&mut self) -> RubbyResult<Token> {
        loop {
            self.begin_token();

            let token = match self.state.mode() {
                Mode::Default => self.scan_default()?,
                Mode::SimpleString => self.scan_simple_string()?,
                Mode::ComplexString => self.scan_complex_string()?,
                Mode::Comment => self.scan_comment_end()?,
            };

            if let Some(token) = token {
                return Ok(token);
            }
        }
    }

    // ===== Default mode =====

    fn scan_default(&mut self) -> RubbyResult<Option<Token>> {
        if self.is_at_end() {
            if self.state.in_string() {
                return Err(self.error("Unterminated string interpolation"));
            }
            return Ok(Some(self.add_token(TokenType::Eof)));
        }

        let c = self.advance();

        let token_type = match c {
            // Whitespace
            ' ' | '\t' | '\r' => {
                while matches!(self.peek(), ' ' | '\t' | '\r') {
                    self.advance();
                }
                TokenType::Whitespace
            }
            '\n' => TokenType::Newline,

            // Mode switches
            '#' => return Ok(Some(self.scan_comment())),
            '\'' => {
                self.state.push(Mode::SimpleString);
                return Ok(None);
            }
            '"' => {
                self.state.push(Mode::ComplexString);
                return Ok(None);
            }

            // Braces double as interpolation terminators
            '{' => {
                self.state.open_brace();
                TokenType::LeftBrace
            }
            '}' => {
                if self.state.close_brace() {
                    self.state.pop();
                    TokenType::InterpolationEnd
                } else {
                    TokenType::RightBrace
                }
            }

            // Single-character punctuation
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            ',' => TokenType::Comma,
            '@' => TokenType::At,
            '^' => TokenType::Operator(Operator::Caret),
            '~' => TokenType::Operator(Operator::Tilde),

            // Multi-character tokens, longest lexeme first
            '.' => {
                if self.match_char('.') {
                    if self.match_char('.') {
                        TokenType::Operator(Operator::DotDotDot)
                    } else {
                        TokenType::Operator(Operator::DotDot)
                    }
                } else {
                    TokenType::Dot
                }
            }
            ':' => {
                if self.match_char(':') {
                    TokenType::ColonColon
                } else {
                    TokenType::Colon
                }
            }
            '?' => {
                if self.match_char('?') {
                    TokenType::DefinedOp
                } else {
                    return Err(self.error("Unexpected character '?'"));
                }
            }
            '+' => self.with_assign(Operator::Plus, Operator::PlusAssign),
            '-' => {
                if self.match_char('>') {
                    TokenType::Arrow
                } else {
                    self.with_assign(Operator::Minus, Operator::MinusAssign)
                }
            }
            '*' => {
                if self.match_char('*') {
                    self.with_assign(Operator::StarStar, Operator::StarStarAssign)
                } else {
                    self.with_assign(Operator::Star, Operator::StarAssign)
                }
            }
            '/' => self.with_assign(Operator::Slash, Operator::SlashAssign),
            '%' => self.with_assign(Operator::Percent, Operator::PercentAssign),
            '=' => {
                if self.match_char('=') {
                    if self.match_char('=') {
                        TokenType::Operator(Operator::CaseEqual)
                    } else {
                        TokenType::Operator(Operator::Equal)
                    }
                } else {
                    TokenType::Operator(Operator::Assign)
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenType::Operator(Operator::NotEqual)
                } else {
                    TokenType::Operator(Operator::Bang)
                }
            }
            '<' => {
                if self.match_char('=') {
                    if self.match_char('>') {
                        TokenType::Operator(Operator::Spaceship)
                    } else {
                        TokenType::Operator(Operator::LessEqual)
                    }
                } else if self.match_char('<') {
                    TokenType::Operator(Operator::ShiftLeft)
                } else {
                    TokenType::Operator(Operator::Less)
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenType::Operator(Operator::GreaterEqual)
                } else if self.match_char('>') {
                    TokenType::Operator(Operator::ShiftRight)
                } else {
                    TokenType::Operator(Operator::Greater)
                }
            }
            '&' => {
                if self.match_char('&') {
                    TokenType::Operator(Operator::AndAnd)
                } else if self.match_char('>') {
                    TokenType::BlockArrow
                } else {
                    TokenType::Operator(Operator::Ampersand)
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenType::Operator(Operator::OrOr)
                } else {
                    TokenType::Operator(Operator::Pipe)
                }
            }

            c if c.is_ascii_digit() => self.scan_number(c)?,
            c if c.is_ascii_lowercase() || c == '_' => self.scan_identifier(),
            c if c.is_ascii_uppercase() => self.scan_constant(),

            _ => return Err(self.error(&format!("Unexpected character '{}'", c))),
        };

        Ok(Some(self.add_token(token_type)))
    }

    /// `op` or, when followed by `=`, its compound assignment form
    fn with_assign(&mut self, op: Operator, assign: Operator) -> TokenType {
        if self.match_char('=') {
            TokenType::Operator(assign)
        } else {
            TokenType::Operator(op)
        }
    }

    /// Scan a number literal: hex and binary prefixes first, then floats,
    /// then octal (leading zero) and decimal integers
    fn scan_number(&mut self, first: char) -> RubbyResult<TokenType> {
        if first == '0' && matches!(self.peek(), 'x' | 'X') && self.peek_next().is_ascii_hexdigit() {
            self.advance();
            let digits = self.take_while(|c| c.is_ascii_hexdigit());
            return self.integer(&digits, 16);
        }

        if first == '0' && matches!(self.peek(), 'b' | 'B') && matches!(self.peek_next(), '0' | '1') {
            self.advance();
            let digits = self.take_while(|c| c == '0' || c == '1');
            return self.integer(&digits, 2);
        }

        self.take_while(|c| c.is_ascii_digit());

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            self.take_while(|c| c.is_ascii_digit());

            let lexeme = self.lexeme();
            let value = lexeme
                .parse::<f64>()
                .map_err(|_| self.error(&format!("Invalid float literal '{}'", lexeme)))?;
            return Ok(TokenType::Literal(Literal::Float(value)));
        }

        let lexeme = self.lexeme();
        if lexeme.len() > 1 && lexeme.starts_with('0') {
            self.integer(&lexeme[1..], 8)
        } else {
            self.integer(&lexeme, 10)
        }
    }

    fn integer(&self, digits: &str, radix: u32) -> RubbyResult<TokenType> {
        match i64::from_str_radix(digits, radix) {
            Ok(value) => Ok(TokenType::Literal(Literal::Integer(value))),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow) => Err(self.error(&format!(
                "Integer literal '{}' is out of range",
                self.lexeme()
            ))),
            Err(_) => Err(self.error(&format!(
                "Invalid base-{} integer literal '{}'",
                radix,
                self.lexeme()
            ))),
        }
    }

    /// Scan an identifier or keyword
    ///
    /// A trailing `?` or `!` belongs to the name unless it starts `!=`/`?=`.
    /// A trailing `=` belongs to it only when followed by whitespace, `(` or
    /// the end of input, which keeps `x=1` and `a==b` intact.
    fn scan_identifier(&mut self) -> TokenType {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let base = self.lexeme();

        match self.peek() {
            '?' | '!' if self.peek_next() != '=' => {
                self.advance();
            }
            '=' if matches!(self.peek_next(), '\0' | ' ' | '\t' | '\r' | '\n' | '(') => {
                self.advance();
            }
            _ => {}
        }

        let name = self.lexeme();
        if name == base {
            if let Some(keyword) = Keyword::from_str(&name) {
                return TokenType::Keyword(keyword);
            }
        }

        TokenType::Identifier(name)
    }

    fn scan_constant(&mut self) -> TokenType {
        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        TokenType::Constant(self.lexeme())
    }

    // ===== Comment mode =====

    /// Consume `#` runs, the blanks after them and the comment body
    fn scan_comment(&mut self) -> Token {
        while self.peek() == '#' {
            self.advance();
        }
        while matches!(self.peek(), ' ' | '\t') {
            self.advance();
        }

        let body_start = self.current;
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
        let text: String = self.source[body_start..self.current].iter().collect();

        self.state.push(Mode::Comment);
        self.add_token(TokenType::Comment(text))
    }

    /// Only the terminating newline can follow a comment body
    fn scan_comment_end(&mut self) -> RubbyResult<Option<Token>> {
        if self.is_at_end() {
            return Err(self.error("Unterminated comment: expected a newline"));
        }

        self.advance();
        self.state.pop();
        Ok(Some(self.add_token(TokenType::Newline)))
    }

    // ===== String modes =====

    /// Scan the body of a single-quoted string, or its closing quote
    fn scan_simple_string(&mut self) -> RubbyResult<Option<Token>> {
        if !self.state.segment_open() {
            self.advance(); // closing quote
            self.state.pop();
            return Ok(None);
        }

        let mut value = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error("Unterminated string"));
            }
            match self.peek() {
                '\'' => break,
                '\\' if matches!(self.peek_next(), '\'' | '\\') => {
                    self.advance();
                    value.push(self.advance());
                }
                _ => value.push(self.advance()),
            }
        }

        self.state.set_segment_open(false);
        Ok(Some(self.add_token(TokenType::StringFragment(value))))
    }

    /// Scan one segment of a double-quoted string, an interpolation opener,
    /// or the closing quote
    fn scan_complex_string(&mut self) -> RubbyResult<Option<Token>> {
        if self.state.segment_open() {
            let mut value = String::new();
            loop {
                if self.is_at_end() {
                    return Err(self.error("Unterminated string"));
                }
                match self.peek() {
                    '"' => break,
                    '#' if self.peek_next() == '{' => break,
                    '\\' => {
                        self.advance();
                        if self.is_at_end() {
                            return Err(self.error("Unterminated string"));
                        }
                        match self.advance() {
                            '"' => value.push('"'),
                            '\\' => value.push('\\'),
                            '#' => value.push('#'),
                            'n' => value.push('\n'),
                            't' => value.push('\t'),
                            'r' => value.push('\r'),
                            '0' => value.push('\0'),
                            other => {
                                value.push('\\');
                                value.push(other);
                            }
                        }
                    }
                    _ => value.push(self.advance()),
                }
            }

            self.state.set_segment_open(false);
            return Ok(Some(self.add_token(TokenType::StringFragment(value))));
        }

        if self.match_char('"') {
            self.state.pop();
            return Ok(None);
        }

        if self.match_char('#') && self.match_char('{') {
            self.state.push_interpolation();
            return Ok(Some(self.add_token(TokenType::InterpolationStart)));
        }

        Err(RubbyError::internal_error(format!(
            "string segment closed without a terminator at {}",
            self.start_location()
        )))
    }

    // ===== Helpers =====

    fn begin_token(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    /// Build a token from the text scanned since `begin_token`
    fn add_token(&mut self, token_type: TokenType) -> Token {
        let token = Token::new(token_type, self.lexeme(), self.start_location()).with_spacing(self.spaced);
        self.spaced = token.is_trivia();
        token
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let from = self.current;
        while !self.is_at_end() && predicate(self.peek()) {
            self.advance();
        }
        self.source[from..self.current].iter().collect()
    }

    /// Advance to the next character
    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    /// Check if the next character matches and consume it if so
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    /// Peek at the next character without consuming it
    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn start_location(&self) -> SourceLocation {
        SourceLocation::new(self.start_line, self.start_column, self.filename.clone())
    }

    /// Create an error pointing at the start of the current token
    fn error(&self, message: &str) -> RubbyError {
        RubbyError::lexer_error(message, self.start_location())
    }
}

impl Iterator for Lexer {
    type Item = RubbyResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.scan_token();
        let done = match &result {
            Ok(token) => matches!(token.token_type, TokenType::Eof),
            Err(_) => true,
        };
        if done {
            self.finished = true;
        }

        Some(result)
    }
}

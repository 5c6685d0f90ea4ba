//! Lexer for Gunk source files
//!
//! Handles tokenization including:
//! - Keywords and identifiers (Unicode letters allowed)
//! - Integer, float, rune, interpreted-string and raw-string literals (kept as raw text)
//! - Operators and punctuation
//! - Comments (emitted as tokens)
//! - Automatic semicolons at line ends
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//!
//! ## Notes
//! - A semicolon is inserted at a newline (or at EOF) when the last token on the line is an identifier, a literal,
//!   or a closing `)`, `]`, `}`. A block comment spanning lines counts as a newline.
//! - Comments at the end of a line are emitted *before* the inserted semicolon.

pub mod tokens;

pub use tokens::{Token, TokenKind, keyword_id};

use crate::ast::Span;
use crate::diagnostics::CompileError;
use gunk_core::lang::operators::OperatorId;
use gunk_core::lang::punctuation::PunctuationId;
use gunk_core::{numbers, strings};

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// [after ident/literal/closer] --'\n'--> emit ';' --> [line start]
// [after anything else]        --'\n'--> skip    --> [line start]
// ============================================================================

/// Lexer for Gunk source code.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Global offset of `source[0]`.
    base: usize,
    /// Whether a newline at this point should produce a semicolon.
    insert_semi: bool,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code, with spans starting at `base`.
    pub fn new(source: &'a str, base: usize) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            base,
            insert_semi: false,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns a vector of tokens on success, or a vector of errors on failure.
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() {
            self.scan_token();
        }

        if self.insert_semi {
            self.insert_semicolon(self.current_pos);
        }
        let end = self.base + self.current_pos;
        self.tokens.push(Token::new(TokenKind::Eof, Span::new(end, end)));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn span(&self, start: usize) -> Span {
        Span::new(self.base + start, self.base + self.current_pos)
    }

    fn error(&mut self, message: String, start: usize) {
        let span = self.span(start);
        self.errors.push(CompileError::syntax(message, span));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.current_pos;
        let Some(c) = self.advance() else {
            return;
        };

        match c {
            ' ' | '\t' | '\r' => {}

            '\n' => {
                if self.insert_semi {
                    self.insert_semicolon(start);
                }
            }

            // Comments (the semicolon decision is deferred to the newline)
            '/' if self.peek() == Some('/') => self.scan_line_comment(start),
            '/' if self.peek() == Some('*') => self.scan_block_comment(start),

            // Operators
            '+' => self.add_op(OperatorId::Plus, start),
            '-' => self.add_op(OperatorId::Minus, start),
            '*' => self.add_op(OperatorId::Star, start),
            '/' => self.add_op(OperatorId::Slash, start),
            '%' => self.add_op(OperatorId::Percent, start),
            '^' => self.add_op(OperatorId::Caret, start),
            '&' => {
                if self.match_char('&') {
                    self.add_op(OperatorId::AndAnd, start);
                } else if self.match_char('^') {
                    self.add_op(OperatorId::AndNot, start);
                } else {
                    self.add_op(OperatorId::Amp, start);
                }
            }
            '|' => self.operator(start, OperatorId::Pipe, &[('|', OperatorId::OrOr)]),
            '<' => self.operator(
                start,
                OperatorId::Lt,
                &[('<', OperatorId::Shl), ('=', OperatorId::LtEq)],
            ),
            '>' => self.operator(
                start,
                OperatorId::Gt,
                &[('>', OperatorId::Shr), ('=', OperatorId::GtEq)],
            ),
            '=' => self.operator(start, OperatorId::Eq, &[('=', OperatorId::EqEq)]),
            '!' => self.operator(start, OperatorId::Bang, &[('=', OperatorId::NotEq)]),

            // Punctuation
            ',' => self.add_punct(PunctuationId::Comma, start),
            ';' => self.add_punct(PunctuationId::Semicolon, start),
            ':' => self.add_punct(PunctuationId::Colon, start),
            '(' => self.add_punct(PunctuationId::LParen, start),
            '[' => self.add_punct(PunctuationId::LBracket, start),
            '{' => self.add_punct(PunctuationId::LBrace, start),
            ')' => self.add_closer(PunctuationId::RParen, start),
            ']' => self.add_closer(PunctuationId::RBracket, start),
            '}' => self.add_closer(PunctuationId::RBrace, start),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(start, c),
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    self.add_punct(PunctuationId::Ellipsis, start);
                } else {
                    self.add_punct(PunctuationId::Dot, start);
                }
            }

            // Literals
            '"' => self.scan_string(start),
            '`' => self.scan_raw_string(start),
            '\'' => self.scan_char(start),
            '0'..='9' => self.scan_number(start, c),

            // Identifiers and keywords
            _ if strings::is_ident_start(c) => self.scan_identifier(start),

            _ => {
                self.insert_semi = false;
                self.error(format!("invalid character {c:?}"), start);
            }
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        let span = self.span(start);
        self.tokens.push(Token::new(kind, span));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.insert_semi = false;
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.insert_semi = false;
        self.add_token(TokenKind::Punctuation(id), start);
    }

    fn add_closer(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
        self.insert_semi = true;
    }

    fn add_literal(&mut self, kind: TokenKind, start: usize) {
        self.add_token(kind, start);
        self.insert_semi = true;
    }

    /// Try to match compound operator, fallback to simple.
    fn operator(&mut self, start: usize, simple: OperatorId, compounds: &[(char, OperatorId)]) {
        for (c, id) in compounds {
            if self.match_char(*c) {
                self.add_op(*id, start);
                return;
            }
        }
        self.add_op(simple, start);
    }

    fn insert_semicolon(&mut self, at: usize) {
        let pos = self.base + at;
        self.tokens.push(Token::new(
            TokenKind::Punctuation(PunctuationId::Semicolon),
            Span::new(pos, pos),
        ));
        self.insert_semi = false;
    }

    // ========================================================================
    // Comments
    // ========================================================================

    fn scan_line_comment(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        let text = self.source[start..self.current_pos].trim_end_matches('\r').to_string();
        self.add_token(TokenKind::Comment(text), start);
    }

    fn scan_block_comment(&mut self, start: usize) {
        self.advance(); // '*'
        let mut terminated = false;
        while let Some(c) = self.advance() {
            if c == '*' && self.match_char('/') {
                terminated = true;
                break;
            }
        }
        if !terminated {
            self.error("comment not terminated".to_string(), start);
            return;
        }
        let text = self.source[start..self.current_pos].to_string();
        let multiline = text.contains('\n');
        self.add_token(TokenKind::Comment(text), start);
        if multiline && self.insert_semi {
            self.insert_semicolon(self.current_pos);
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string(&mut self, start: usize) {
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("string literal not terminated".to_string(), start);
                    self.insert_semi = true;
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let raw = &self.source[start..self.current_pos];
        if let Err(err) = strings::unquote(raw) {
            self.error(format!("invalid string literal {raw}: {err}"), start);
        }
        self.add_literal(TokenKind::String(raw.to_string()), start);
    }

    fn scan_raw_string(&mut self, start: usize) {
        loop {
            match self.advance() {
                None => {
                    self.error("raw string literal not terminated".to_string(), start);
                    self.insert_semi = true;
                    return;
                }
                Some('`') => break,
                Some(_) => {}
            }
        }
        let raw = self.source[start..self.current_pos].to_string();
        self.add_literal(TokenKind::String(raw), start);
    }

    fn scan_char(&mut self, start: usize) {
        loop {
            match self.peek() {
                None | Some('\n') => {
                    self.error("rune literal not terminated".to_string(), start);
                    self.insert_semi = true;
                    return;
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let raw = &self.source[start..self.current_pos];
        if let Err(err) = strings::unquote_rune(raw) {
            self.error(format!("invalid rune literal {raw}: {err}"), start);
        }
        self.add_literal(TokenKind::Char(raw.to_string()), start);
    }

    fn scan_number(&mut self, start: usize, first: char) {
        let prefixed = first == '0' && matches!(self.peek(), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));
        let mut is_float = first == '.';

        if prefixed {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                self.advance();
            }
        } else {
            self.eat_digits();
            if !is_float && self.peek() == Some('.') && self.peek_next() != Some('.') {
                self.advance();
                is_float = true;
                self.eat_digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                self.advance();
                is_float = true;
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let raw = &self.source[start..self.current_pos];
        if is_float {
            if let Err(err) = numbers::parse_float_literal(raw) {
                self.error(format!("invalid float literal {raw}: {err}"), start);
            }
            self.add_literal(TokenKind::Float(raw.to_string()), start);
        } else {
            if let Err(err) = numbers::parse_int_literal(raw) {
                self.error(format!("invalid integer literal {raw}: {err}"), start);
            }
            self.add_literal(TokenKind::Int(raw.to_string()), start);
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.advance();
        }
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) {
        while self.peek().is_some_and(strings::is_ident_continue) {
            self.advance();
        }

        let spelling = &self.source[start..self.current_pos];

        // Look up identifier spelling in the reserved-word registry (no allocation for keywords).
        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
            self.insert_semi = false;
        } else {
            self.add_literal(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

/// Lex a standalone source string (spans start at `0`).
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source, 0).tokenize()
}

/// Lex a file registered in a `FileSet` at `base`.
#[tracing::instrument(skip_all, fields(source_len = source.len(), base = base))]
pub fn lex_at(source: &str, base: usize) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source, base).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

/// Parser core types and entrypoints.
///
/// This chunk defines the [`Parser`] type, its file-level entrypoint and the comment bookkeeping
/// that runs on every token advance.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.
/// - Comment association follows the host syntax: a *lead* comment is the group ending on the line
///   directly above the current token; a *line* comment is a group starting on the same line as
///   the previous token and followed by a line break.

/// Parser state.
///
/// ## Notes
/// - The parser recovers from declaration-level errors by synchronizing at the next declaration
///   keyword, so one pass reports several problems.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
    /// Span of the last consumed non-comment token.
    last_span: Span,
    lines: LineIndex,
    /// Every comment group seen so far, in source order.
    comments: Vec<CommentGroup>,
    lead_comment: Option<CommentGroup>,
    line_comment: Option<CommentGroup>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    ///
    /// ## Parameters
    /// - `tokens`: Token stream produced by `gunk_syntax::lexer` (must end with `Eof`).
    /// - `lines`: Line table of the lexed source, used for comment association.
    pub fn new(tokens: &'a [Token], lines: LineIndex) -> Self {
        let mut parser = Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            last_span: Span::default(),
            lines,
            comments: Vec::new(),
            lead_comment: None,
            line_comment: None,
        };
        parser.consume_comments(None);
        parser
    }

    /// Parse the token stream as a whole file spanning `span`.
    ///
    /// ## Errors
    /// Returns every [`CompileError`] found; the parser continues after a bad declaration.
    pub fn parse_file(mut self, span: Span) -> Result<File, Vec<CompileError>> {
        let doc = self.lead_comment.take();
        let package = match self.expect_keyword(KeywordId::Package, "expected 'package'") {
            Ok(token) => token.span,
            Err(e) => return Err(vec![e]),
        };
        let name = match self.package_name() {
            Ok(name) => name,
            Err(e) => return Err(vec![e]),
        };
        if let Err(e) = self.expect_semi() {
            self.errors.push(e);
        }

        let mut decls: Vec<GenDecl> = Vec::new();
        while !self.is_at_end() {
            match self.declaration() {
                Ok(decl) => {
                    let misplaced_import = decl.kind == DeclKind::Import
                        && decls.last().is_some_and(|d| d.kind != DeclKind::Import);
                    if misplaced_import {
                        self.errors.push(CompileError::syntax(
                            "imports must appear before other declarations".to_string(),
                            decl.span,
                        ));
                    }
                    decls.push(decl);
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        if self.errors.is_empty() {
            Ok(File {
                doc,
                package,
                name,
                decls,
                comments: self.comments,
                span,
            })
        } else {
            Err(self.errors)
        }
    }

    /// Parse the token stream as exactly one expression.
    pub fn parse_standalone_expr(mut self) -> Result<Spanned<Expr>, Vec<CompileError>> {
        let expr = match self.expression() {
            Ok(expr) => expr,
            Err(e) => return Err(vec![e]),
        };
        if self.peek().is_inserted_semicolon() {
            self.advance();
        }
        if !self.is_at_end() {
            return Err(vec![CompileError::syntax(
                format!("expected EOF, found {}", self.peek().describe()),
                self.current_span(),
            )]);
        }
        Ok(expr)
    }

    // ========================================================================
    // Comment bookkeeping
    // ========================================================================

    /// Skip comment tokens at the current position, grouping them and updating the lead/line
    /// comment slots. `prev` is the index of the token consumed just before.
    fn consume_comments(&mut self, prev: Option<usize>) {
        self.lead_comment = None;
        self.line_comment = None;
        if !self.peek_raw().kind.is_comment() {
            return;
        }

        let prev_line = prev.map(|i| self.lines.line(self.tokens[i].span.start));
        if prev_line == Some(self.lines.line(self.peek_raw().span.start)) {
            let (group, end_line) = self.consume_comment_group(0);
            let next = self.peek_raw();
            if self.lines.line(next.span.start) != end_line
                || next.kind.is_punctuation(PunctuationId::Semicolon)
                || matches!(next.kind, TokenKind::Eof)
            {
                self.line_comment = Some(group);
            }
        }

        let mut last = None;
        while self.peek_raw().kind.is_comment() {
            last = Some(self.consume_comment_group(1));
        }
        if let Some((group, end_line)) = last {
            if end_line + 1 == self.lines.line(self.peek_raw().span.start) {
                self.lead_comment = Some(group);
            }
        }
    }

    /// Collect comments that start at most `gap` lines after the previous one ended.
    fn consume_comment_group(&mut self, gap: usize) -> (CommentGroup, usize) {
        let mut list = Vec::new();
        let mut end_line = self.lines.line(self.peek_raw().span.start);
        loop {
            let token = self.peek_raw();
            let TokenKind::Comment(text) = &token.kind else {
                break;
            };
            if self.lines.line(token.span.start) > end_line + gap {
                break;
            }
            list.push(Comment {
                text: text.clone(),
                span: token.span,
            });
            end_line = self.lines.line(token.span.end);
            self.pos += 1;
        }
        let group = CommentGroup::new(list);
        self.comments.push(group.clone());
        (group, end_line)
    }
}

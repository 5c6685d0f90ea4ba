/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation
/// - Statement termination (`expect_semi`)
/// - Error recovery (`synchronize`)
///
/// The current token is never a comment: [`Parser::advance`] folds comments into groups as soon as
/// it steps past a token.
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the token at the cursor, comment or not.
    fn peek_raw(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        &tokens[self.pos.min(tokens.len() - 1)]
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &'a Token {
        self.peek_raw()
    }

    /// Return the first non-comment token after the current one.
    fn peek_next(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        tokens[self.pos + 1..]
            .iter()
            .find(|t| !t.kind.is_comment())
            .unwrap_or(&tokens[tokens.len() - 1])
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        let idx = self.pos.min(tokens.len() - 1);
        if !self.is_at_end() {
            self.pos += 1;
            self.last_span = tokens[idx].span;
            self.consume_comments(Some(idx));
        }
        &tokens[idx]
    }

    /// Return `true` if the current token is the given keyword.
    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    /// Return `true` if the current token is the given punctuation.
    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    /// Return `true` if the current token is the given operator.
    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Build a syntax error at the current token: `"{msg}, found {token}"`.
    fn error_at_current(&self, msg: &str) -> CompileError {
        CompileError::syntax(format!("{}, found {}", msg, self.peek().describe()), self.current_span())
    }

    fn expect_keyword(&mut self, id: KeywordId, msg: &str) -> Result<&'a Token, CompileError> {
        if self.check_keyword(id) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(msg))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> Result<&'a Token, CompileError> {
        if self.check_punct(id) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(msg))
        }
    }

    /// Consume the `;` terminating a spec, field or method and return its line comment.
    ///
    /// ## Notes
    /// - A closing `)` or `}` may stand in for the semicolon, as may EOF.
    /// - For an inserted semicolon the line comment sits *before* it; for an explicit one the
    ///   comment follows it, so it is only known after advancing.
    fn expect_semi(&mut self) -> Result<Option<CommentGroup>, CompileError> {
        let token = self.peek();
        if self.check_punct(PunctuationId::RParen) || self.check_punct(PunctuationId::RBrace) || self.is_at_end() {
            return Ok(None);
        }
        if !token.kind.is_punctuation(PunctuationId::Semicolon) {
            return Err(self.error_at_current("expected ';'"));
        }
        if token.is_inserted_semicolon() {
            let comment = self.line_comment.take();
            self.advance();
            Ok(comment)
        } else {
            self.advance();
            Ok(self.line_comment.take())
        }
    }

    /// Skip to the start of the next top-level declaration.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            let at_decl = matches!(
                self.peek().keyword_id(),
                Some(KeywordId::Import | KeywordId::Type | KeywordId::Const | KeywordId::Var | KeywordId::Func)
            );
            if at_decl && self.lines.line(self.current_span().start) != self.lines.line(self.last_span.start) {
                return;
            }
            self.advance();
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_span.end.max(start))
    }
}

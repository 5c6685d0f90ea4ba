/// Declaration parsing.
///
/// Gunk files only contain `import`, `type` and `const` declarations, each either a single spec or
/// a parenthesized group of specs.
///
/// ## Notes
/// - The doc comment above the keyword belongs to the [`GenDecl`]; inside a group, each spec takes
///   the lead comment directly above it.
/// - `var` and `func` are recognized so the error names what was written.
impl<'a> Parser<'a> {
    // ========================================================================
    // Declarations
    // ========================================================================

    fn declaration(&mut self) -> Result<GenDecl, CompileError> {
        let doc = self.lead_comment.take();
        let token = self.peek();
        match token.keyword_id() {
            Some(KeywordId::Import) => self.gen_decl(DeclKind::Import, doc),
            Some(KeywordId::Type) => self.gen_decl(DeclKind::Type, doc),
            Some(KeywordId::Const) => self.gen_decl(DeclKind::Const, doc),
            Some(KeywordId::Var) => Err(errors::unsupported("variable declarations", token.span)),
            Some(KeywordId::Func) => Err(errors::unsupported("function declarations", token.span)),
            _ => Err(self.error_at_current("expected declaration")),
        }
    }

    fn gen_decl(&mut self, kind: DeclKind, doc: Option<CommentGroup>) -> Result<GenDecl, CompileError> {
        let start = self.advance().span.start;
        let mut specs = Vec::new();
        let grouped = self.match_punct(PunctuationId::LParen);
        if grouped {
            let mut iota = 0;
            while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
                let spec_doc = self.lead_comment.take();
                specs.push(self.spec(kind, spec_doc, iota)?);
                iota += 1;
            }
            self.expect_punct(PunctuationId::RParen, "expected ')'")?;
            let span = self.span_from(start);
            self.expect_semi()?;
            return Ok(GenDecl {
                doc,
                kind,
                grouped,
                specs,
                span,
            });
        }

        specs.push(self.spec(kind, None, 0)?);
        Ok(GenDecl {
            doc,
            kind,
            grouped,
            span: Span::new(start, specs[0].span().end),
            specs,
        })
    }

    fn spec(&mut self, kind: DeclKind, doc: Option<CommentGroup>, iota: usize) -> Result<Spec, CompileError> {
        let spec = match kind {
            DeclKind::Import => Spec::Import(self.import_spec(doc)?),
            DeclKind::Type => Spec::Type(self.type_spec(doc)?),
            DeclKind::Const => Spec::Const(self.const_spec(doc, iota)?),
        };
        self.expect_semi()?;
        Ok(spec)
    }

    fn import_spec(&mut self, doc: Option<CommentGroup>) -> Result<ImportSpec, CompileError> {
        let start = self.current_span().start;
        let name = match &self.peek().kind {
            TokenKind::Ident(_) => Some(self.expect_ident("expected import name")?),
            _ => None,
        };
        let token = self.peek();
        let TokenKind::String(raw) = &token.kind else {
            return Err(self.error_at_current("expected import path"));
        };
        self.advance();
        Ok(ImportSpec {
            doc,
            name,
            path: Spanned::new(raw.clone(), token.span),
            span: self.span_from(start),
        })
    }

    fn type_spec(&mut self, doc: Option<CommentGroup>) -> Result<TypeSpec, CompileError> {
        let name = self.expect_ident("expected type name")?;
        let alias = self.match_op(OperatorId::Eq);
        let ty = self.type_expr()?;
        Ok(TypeSpec {
            doc,
            span: self.span_from(name.span.start),
            name,
            alias,
            ty,
        })
    }

    /// `A, B T = x, y`, or a bare name list repeating the previous spec inside a group.
    fn const_spec(&mut self, doc: Option<CommentGroup>, iota: usize) -> Result<ConstSpec, CompileError> {
        let names = self.ident_list("expected constant name")?;
        let start = names[0].span.start;

        let ty = if self.check_op(OperatorId::Eq) || self.at_spec_end() {
            None
        } else {
            Some(self.type_expr()?)
        };
        let values = if self.match_op(OperatorId::Eq) {
            self.expression_list()?
        } else {
            Vec::new()
        };

        if values.is_empty() && (iota == 0 || ty.is_some()) {
            return Err(CompileError::syntax(
                "missing init expr for const declaration".to_string(),
                self.span_from(start),
            ));
        }

        Ok(ConstSpec {
            doc,
            names,
            ty,
            values,
            iota,
            span: self.span_from(start),
        })
    }

    fn at_spec_end(&self) -> bool {
        self.is_at_end()
            || self.check_punct(PunctuationId::Semicolon)
            || self.check_punct(PunctuationId::RParen)
    }
}

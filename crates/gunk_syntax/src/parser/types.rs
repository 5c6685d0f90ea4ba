/// Type-expression parsing.
///
/// Covers named and qualified types, pointers, slices, maps, struct types (with field tags and
/// trailing comments) and interface types (methods and embedded interfaces).
///
/// ## Notes
/// - Fixed-size arrays, function types and channel types have no Gunk meaning and are rejected here
///   rather than in the type checker.
impl<'a> Parser<'a> {
    // ========================================================================
    // Types
    // ========================================================================

    fn type_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        match self.try_type()? {
            Some(ty) => Ok(ty),
            None => Err(self.error_at_current("expected type")),
        }
    }

    /// Parse a type if the current token can start one.
    fn try_type(&mut self) -> Result<Option<Spanned<Expr>>, CompileError> {
        let token = self.peek();
        let start = token.span.start;
        let ty = match &token.kind {
            TokenKind::Ident(_) => self.type_name()?,
            TokenKind::Operator(OperatorId::Star) => {
                self.advance();
                let elem = self.type_expr()?;
                Spanned::new(Expr::Star(Box::new(elem)), self.span_from(start))
            }
            TokenKind::Punctuation(PunctuationId::LBracket) => {
                self.advance();
                if !self.match_punct(PunctuationId::RBracket) {
                    return Err(errors::unsupported("array types", token.span));
                }
                let elem = self.type_expr()?;
                Spanned::new(Expr::SliceType(Box::new(elem)), self.span_from(start))
            }
            TokenKind::Keyword(KeywordId::Map) => {
                self.advance();
                self.expect_punct(PunctuationId::LBracket, "expected '['")?;
                let key = self.type_expr()?;
                self.expect_punct(PunctuationId::RBracket, "expected ']'")?;
                let value = self.type_expr()?;
                Spanned::new(
                    Expr::MapType {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                    self.span_from(start),
                )
            }
            TokenKind::Keyword(KeywordId::Struct) => self.struct_type()?,
            TokenKind::Keyword(KeywordId::Interface) => self.interface_type()?,
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.type_expr()?;
                self.expect_punct(PunctuationId::RParen, "expected ')'")?;
                Spanned::new(Expr::Paren(Box::new(inner)), self.span_from(start))
            }
            TokenKind::Keyword(KeywordId::Func) => return Err(errors::unsupported("function types", token.span)),
            TokenKind::Keyword(KeywordId::Chan) => return Err(errors::unsupported("channel types", token.span)),
            _ => return Ok(None),
        };
        Ok(Some(ty))
    }

    /// `Name` or `pkg.Name`.
    fn type_name(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let name = self.expect_ident("expected type name")?;
        let base = Spanned::new(Expr::Ident(name.node), name.span);
        self.qualified(base)
    }

    fn qualified(&mut self, base: Spanned<Expr>) -> Result<Spanned<Expr>, CompileError> {
        if !self.match_punct(PunctuationId::Dot) {
            return Ok(base);
        }
        let sel = self.expect_ident("expected name after '.'")?;
        let span = base.span.merge(sel.span);
        Ok(Spanned::new(
            Expr::Selector {
                base: Box::new(base),
                sel,
            },
            span,
        ))
    }

    // ========================================================================
    // Structs
    // ========================================================================

    fn struct_type(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.advance().span.start;
        self.expect_punct(PunctuationId::LBrace, "expected '{'")?;
        let mut fields = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            fields.push(self.field_decl()?);
        }
        self.expect_punct(PunctuationId::RBrace, "expected '}'")?;
        Ok(Spanned::new(Expr::StructType(StructType { fields }), self.span_from(start)))
    }

    fn field_decl(&mut self) -> Result<Field, CompileError> {
        let doc = self.lead_comment.take();
        let start = self.current_span().start;

        let (names, ty) = match &self.peek().kind {
            TokenKind::Ident(_) => {
                let first = self.expect_ident("expected field name")?;
                if self.check_punct(PunctuationId::Dot) {
                    let base = Spanned::new(Expr::Ident(first.node), first.span);
                    (Vec::new(), self.qualified(base)?)
                } else if self.check_punct(PunctuationId::Comma) {
                    let mut names = vec![first];
                    while self.match_punct(PunctuationId::Comma) {
                        names.push(self.expect_ident("expected field name")?);
                    }
                    let ty = self.type_expr()?;
                    (names, ty)
                } else if self.at_field_end() {
                    (Vec::new(), Spanned::new(Expr::Ident(first.node), first.span))
                } else {
                    let ty = self.type_expr()?;
                    (vec![first], ty)
                }
            }
            TokenKind::Operator(OperatorId::Star) => {
                self.advance();
                let elem = self.type_name()?;
                (Vec::new(), Spanned::new(Expr::Star(Box::new(elem)), self.span_from(start)))
            }
            _ => return Err(self.error_at_current("expected field name or embedded type")),
        };

        let tag = match &self.peek().kind {
            TokenKind::String(raw) => {
                let token = self.advance();
                Some(Spanned::new(raw.clone(), token.span))
            }
            _ => None,
        };

        let span = self.span_from(start);
        let comment = self.expect_semi()?;
        Ok(Field {
            doc,
            names,
            ty,
            tag,
            comment,
            span,
        })
    }

    fn at_field_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::String(_))
            || self.check_punct(PunctuationId::Semicolon)
            || self.check_punct(PunctuationId::RBrace)
    }

    // ========================================================================
    // Interfaces
    // ========================================================================

    fn interface_type(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let start = self.advance().span.start;
        self.expect_punct(PunctuationId::LBrace, "expected '{'")?;
        let mut methods = Vec::new();
        let mut embeds = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let doc = self.lead_comment.take();
            if !matches!(self.peek().kind, TokenKind::Ident(_)) {
                return Err(self.error_at_current("expected method or embedded interface"));
            }
            if self.peek_next().kind.is_punctuation(PunctuationId::LParen) {
                let name = self.expect_ident("expected method name")?;
                let params = self.parameters()?;
                let results = self.results()?;
                methods.push(Method {
                    doc,
                    span: self.span_from(name.span.start),
                    name,
                    params,
                    results,
                });
            } else {
                embeds.push(self.type_name()?);
            }
            self.expect_semi()?;
        }
        self.expect_punct(PunctuationId::RBrace, "expected '}'")?;
        Ok(Spanned::new(
            Expr::InterfaceType(InterfaceType { methods, embeds }),
            self.span_from(start),
        ))
    }

    /// `(a, b T, c U)` or `(T, U)`.
    fn parameters(&mut self) -> Result<Vec<Param>, CompileError> {
        let open = self.expect_punct(PunctuationId::LParen, "expected '('")?.span;
        let mut items: Vec<(Spanned<Expr>, Option<Spanned<Expr>>)> = Vec::new();
        while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
            let first = self.type_expr()?;
            let second = if self.check_punct(PunctuationId::Comma) || self.check_punct(PunctuationId::RParen) {
                None
            } else {
                Some(self.type_expr()?)
            };
            items.push((first, second));
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RParen, "expected ')'")?;

        if items.iter().all(|(_, second)| second.is_none()) {
            return Ok(items.into_iter().map(|(ty, _)| Param { name: None, ty }).collect());
        }

        let mixed = || CompileError::syntax("mixed named and unnamed parameters".to_string(), open.merge(self.last_span));
        let mut params = Vec::new();
        let mut pending: Vec<Spanned<Ident>> = Vec::new();
        for (first, second) in items {
            let Expr::Ident(name) = first.node else {
                return Err(mixed());
            };
            pending.push(Spanned::new(name, first.span));
            if let Some(ty) = second {
                params.extend(pending.drain(..).map(|name| Param {
                    name: Some(name),
                    ty: ty.clone(),
                }));
            }
        }
        if !pending.is_empty() {
            return Err(mixed());
        }
        Ok(params)
    }

    fn results(&mut self) -> Result<Vec<Param>, CompileError> {
        if self.check_punct(PunctuationId::LParen) {
            return self.parameters();
        }
        Ok(self.try_type()?.map(|ty| vec![Param { name: None, ty }]).unwrap_or_default())
    }
}

/// Expression parsing.
///
/// Constant initializers and `+gunk` tag payloads are expressions. Binary operators are parsed by
/// precedence climbing over the operator registry; primary expressions handle selectors, index
/// expressions, calls and composite literals.
///
/// ## Notes
/// - Type syntax is accepted in operand position (`[]string{"a"}`, `map[string]int{}`), so composite
///   literals of slice, map and struct types parse as expressions.
/// - Inside a composite literal, `{...}` without a type is an elided element literal.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self) -> Result<Spanned<Expr>, CompileError> {
        self.binary_expr(1)
    }

    fn expression_list(&mut self) -> Result<Vec<Spanned<Expr>>, CompileError> {
        let mut list = vec![self.expression()?];
        while self.match_punct(PunctuationId::Comma) {
            list.push(self.expression()?);
        }
        Ok(list)
    }

    fn binary_expr(&mut self, min_prec: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.unary_expr()?;
        loop {
            let Some(op) = self.peek().operator_id() else {
                break;
            };
            let prec = operators::precedence(op);
            if prec == 0 || prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.binary_expr(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn unary_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let token = self.peek();
        if let Some(op) = token.operator_id() {
            if op == OperatorId::Star {
                self.advance();
                let operand = self.unary_expr()?;
                let span = token.span.merge(operand.span);
                return Ok(Spanned::new(Expr::Star(Box::new(operand)), span));
            }
            if operators::is_prefix(op) {
                self.advance();
                let operand = self.unary_expr()?;
                let span = token.span.merge(operand.span);
                return Ok(Spanned::new(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                ));
            }
        }
        self.primary_expr()
    }

    fn primary_expr(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let mut expr = self.operand()?;
        loop {
            if self.match_punct(PunctuationId::Dot) {
                let sel = self.expect_ident("expected selector")?;
                let span = expr.span.merge(sel.span);
                expr = Spanned::new(
                    Expr::Selector {
                        base: Box::new(expr),
                        sel,
                    },
                    span,
                );
            } else if self.match_punct(PunctuationId::LBracket) {
                let index = self.expression()?;
                let end = self.expect_punct(PunctuationId::RBracket, "expected ']'")?.span.end;
                let span = Span::new(expr.span.start, end);
                expr = Spanned::new(
                    Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.match_punct(PunctuationId::LParen) {
                let mut args = Vec::new();
                while !self.check_punct(PunctuationId::RParen) && !self.is_at_end() {
                    args.push(self.expression()?);
                    if !self.match_punct(PunctuationId::Comma) {
                        break;
                    }
                }
                let end = self.expect_punct(PunctuationId::RParen, "expected ')'")?.span.end;
                let span = Span::new(expr.span.start, end);
                expr = Spanned::new(
                    Expr::Call {
                        func: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.check_punct(PunctuationId::LBrace) && is_literal_type(&expr.node) {
                expr = self.literal_value(Some(expr))?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn operand(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let token = self.peek();
        let lit = |kind: LitKind, raw: &String| Expr::BasicLit(BasicLit { kind, raw: raw.clone() });
        let node = match &token.kind {
            TokenKind::Ident(name) => Expr::Ident(name.clone()),
            TokenKind::Int(raw) => lit(LitKind::Int, raw),
            TokenKind::Float(raw) => lit(LitKind::Float, raw),
            TokenKind::Char(raw) => lit(LitKind::Char, raw),
            TokenKind::String(raw) => lit(LitKind::String, raw),
            TokenKind::Punctuation(PunctuationId::LParen) => {
                self.advance();
                let inner = self.expression()?;
                let end = self.expect_punct(PunctuationId::RParen, "expected ')'")?.span.end;
                return Ok(Spanned::new(Expr::Paren(Box::new(inner)), Span::new(token.span.start, end)));
            }
            _ => {
                return match self.try_type()? {
                    Some(ty) => Ok(ty),
                    None => Err(self.error_at_current("expected expression")),
                };
            }
        };
        self.advance();
        Ok(Spanned::new(node, token.span))
    }

    /// `{elem, key: value, ...}`, optionally preceded by its type.
    fn literal_value(&mut self, ty: Option<Spanned<Expr>>) -> Result<Spanned<Expr>, CompileError> {
        let start = ty.as_ref().map_or(self.current_span().start, |t| t.span.start);
        self.expect_punct(PunctuationId::LBrace, "expected '{'")?;
        let mut elts = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            elts.push(self.element()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        if self.peek().is_inserted_semicolon() {
            return Err(CompileError::syntax(
                "missing ',' before newline in composite literal".to_string(),
                self.current_span(),
            ));
        }
        let end = self.expect_punct(PunctuationId::RBrace, "expected '}'")?.span.end;
        Ok(Spanned::new(
            Expr::CompositeLit {
                ty: ty.map(Box::new),
                elts,
            },
            Span::new(start, end),
        ))
    }

    fn element(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let key = self.element_value()?;
        if !self.match_punct(PunctuationId::Colon) {
            return Ok(key);
        }
        let value = self.element_value()?;
        let span = key.span.merge(value.span);
        Ok(Spanned::new(
            Expr::KeyValue {
                key: Box::new(key),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn element_value(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.check_punct(PunctuationId::LBrace) {
            self.literal_value(None)
        } else {
            self.expression()
        }
    }
}

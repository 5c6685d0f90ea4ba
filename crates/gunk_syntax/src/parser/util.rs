/// Identifier helpers.
impl<'a> Parser<'a> {
    fn expect_ident(&mut self, msg: &str) -> Result<Spanned<Ident>, CompileError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Spanned::new(name.clone(), token.span))
            }
            _ => Err(self.error_at_current(msg)),
        }
    }

    fn ident_list(&mut self, msg: &str) -> Result<Vec<Spanned<Ident>>, CompileError> {
        let mut names = vec![self.expect_ident(msg)?];
        while self.match_punct(PunctuationId::Comma) {
            names.push(self.expect_ident(msg)?);
        }
        Ok(names)
    }

    /// The package clause name; `_` is not a valid package name.
    fn package_name(&mut self) -> Result<Spanned<Ident>, CompileError> {
        let name = self.expect_ident("expected package name")?;
        if name.node == "_" {
            return Err(CompileError::syntax("invalid package name _".to_string(), name.span));
        }
        Ok(name)
    }
}

/// Return `true` if `expr` may be followed by `{` to form a composite literal.
fn is_literal_type(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) | Expr::SliceType(_) | Expr::MapType { .. } | Expr::StructType(_) => true,
        Expr::Selector { base, .. } => matches!(base.node, Expr::Ident(_)),
        _ => false,
    }
}

/// Parse a Gunk source file whose first byte sits at global offset `base`.
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `source`: The file contents.
/// - `base`: Global offset assigned by [`crate::position::FileSet::add_file`]; every span in the
///   returned AST is relative to it.
///
/// ## Errors
/// Returns `Err(Vec<CompileError>)` if lexing or parsing fails.
#[tracing::instrument(skip_all, fields(source_len = source.len(), base = base))]
pub fn parse_file(source: &str, base: usize) -> Result<File, Vec<CompileError>> {
    let tokens = lexer::lex_at(source, base)?;
    let lines = LineIndex::new(source, base);
    Parser::new(&tokens, lines).parse_file(Span::new(base, base + source.len()))
}

/// Parse `source` as a single expression, with spans starting at `0`.
///
/// Trailing whitespace and a final newline are allowed; anything else after the expression is
/// an error.
pub fn parse_expr(source: &str) -> Result<Spanned<Expr>, Vec<CompileError>> {
    parse_expr_at(source, 0)
}

/// Like [`parse_expr`], with spans starting at `base`.
pub fn parse_expr_at(source: &str, base: usize) -> Result<Spanned<Expr>, Vec<CompileError>> {
    let tokens = lexer::lex_at(source, base)?;
    let lines = LineIndex::new(source, base);
    Parser::new(&tokens, lines).parse_standalone_expr()
}

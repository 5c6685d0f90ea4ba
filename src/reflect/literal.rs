//! Literal inputs for value construction.
//!
//! Values are built either from this dialect's expressions or from the aggregate literal grammar
//! of the external descriptor language, used in option payloads:
//!
//! ```text
//! { name: "x" tags: ["a", "b"] nested { depth: 2 } }
//! ```
//!
//! Entries are `name [:] literal`, separated by optional `,` or `;`. Lists are `[a, b]`. Any
//! other run of characters up to whitespace or punctuation is a bare token (`12`, `-1.5`,
//! `true`, `ENUM_VALUE`).

use std::fmt;

use gunk_core::lang::operators::OperatorId;

use crate::frontend::ast::{Expr, Spanned};

use super::BuildError;

/// A literal from the descriptor language.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoLiteral {
    /// Token text; for strings, the body with escapes kept as they would be written between `"`.
    pub source: String,
    pub is_string: bool,
    /// Elements, for `[...]`.
    pub array: Option<Vec<ProtoLiteral>>,
    /// Entries in source order, for `{...}`.
    pub entries: Option<Vec<NamedLiteral>>,
}

/// A `name: literal` entry of an aggregate literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedLiteral {
    pub name: String,
    pub literal: ProtoLiteral,
}

impl ProtoLiteral {
    pub fn token(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn string(body: impl Into<String>) -> Self {
        Self {
            source: body.into(),
            is_string: true,
            ..Self::default()
        }
    }

    /// Text of a scalar literal as written, strings re-quoted with `"`.
    pub fn source_representation(&self) -> String {
        if self.is_string {
            format!("\"{}\"", self.source)
        } else {
            self.source.clone()
        }
    }

    /// Parse one literal, which must span the whole input.
    ///
    /// ## Errors
    /// - [`BuildError::Syntax`] with the byte offset of the problem.
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        let mut parser = LiteralParser { text, pos: 0 };
        let literal = parser.literal()?;
        parser.skip_space();
        if parser.pos < text.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(literal)
    }
}

impl fmt::Display for ProtoLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(array) = &self.array {
            write!(f, "[")?;
            for (i, elt) in array.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{elt}")?;
            }
            return write!(f, "]");
        }
        if let Some(entries) = &self.entries {
            write!(f, "{{")?;
            for entry in entries {
                write!(f, " {}: {}", entry.name, entry.literal)?;
            }
            return write!(f, " }}");
        }
        write!(f, "{}", self.source_representation())
    }
}

struct LiteralParser<'t> {
    text: &'t str,
    pos: usize,
}

impl LiteralParser<'_> {
    fn error(&self, message: &str) -> BuildError {
        BuildError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_space(&mut self) {
        loop {
            let rest = &self.text[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();
            if trimmed.starts_with('#') {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_space();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn literal(&mut self) -> Result<ProtoLiteral, BuildError> {
        self.skip_space();
        match self.peek() {
            None => Err(self.error("expected literal")),
            Some('{') => {
                self.pos += 1;
                self.aggregate()
            }
            Some('[') => {
                self.pos += 1;
                self.array()
            }
            Some('"' | '\'') => self.strings(),
            Some(_) => {
                let token = self.token();
                if token.is_empty() {
                    return Err(self.error("expected literal"));
                }
                Ok(ProtoLiteral::token(token))
            }
        }
    }

    fn aggregate(&mut self) -> Result<ProtoLiteral, BuildError> {
        let mut entries = Vec::new();
        loop {
            if self.eat('}') {
                return Ok(ProtoLiteral {
                    entries: Some(entries),
                    ..ProtoLiteral::default()
                });
            }
            let name = self.entry_name()?;
            // The colon is optional before an aggregate value.
            self.eat(':');
            let literal = self.literal()?;
            entries.push(NamedLiteral { name, literal });
            if !self.eat(',') {
                self.eat(';');
            }
        }
    }

    fn entry_name(&mut self) -> Result<String, BuildError> {
        self.skip_space();
        if self.eat('[') {
            let start = self.pos;
            let end = self.text[start..]
                .find(']')
                .map(|i| start + i)
                .ok_or_else(|| self.error("unterminated extension name"))?;
            self.pos = end + 1;
            return Ok(format!("[{}]", self.text[start..end].trim()));
        }
        let name = self.token();
        if name.is_empty() {
            return Err(self.error("expected field name"));
        }
        Ok(name)
    }

    fn array(&mut self) -> Result<ProtoLiteral, BuildError> {
        let mut elts = Vec::new();
        if !self.eat(']') {
            loop {
                elts.push(self.literal()?);
                if self.eat(']') {
                    break;
                }
                if !self.eat(',') {
                    return Err(self.error("expected ',' or ']'"));
                }
            }
        }
        Ok(ProtoLiteral {
            array: Some(elts),
            ..ProtoLiteral::default()
        })
    }

    /// One or more adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<ProtoLiteral, BuildError> {
        let mut body = String::new();
        while let Some(quote @ ('"' | '\'')) = self.peek() {
            self.pos += 1;
            let start = self.pos;
            let mut escaped = false;
            let end = self.text[start..]
                .char_indices()
                .find(|&(_, c)| {
                    let closes = c == quote && !escaped;
                    escaped = c == '\\' && !escaped;
                    closes
                })
                .map(|(i, _)| start + i)
                .ok_or_else(|| self.error("unterminated string"))?;
            let segment = &self.text[start..end];
            if quote == '\'' {
                body.push_str(&double_quoted_body(segment));
            } else {
                body.push_str(segment);
            }
            self.pos = end + 1;
            self.skip_space();
        }
        Ok(ProtoLiteral::string(body))
    }

    fn token(&mut self) -> String {
        let rest = &self.text[self.pos..];
        let len = rest
            .find(|c: char| c.is_whitespace() || "{}[],;:\"'#".contains(c))
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_string()
    }
}

/// Re-escape the body of a `'...'` string for `"..."`: `\'` loses its backslash, `"` gains one.
fn double_quoted_body(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\'') => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// A literal handed to [`super::ValueBuilder::build`].
#[derive(Debug, Clone, Copy)]
pub enum Literal<'a> {
    /// An expression of this dialect, usually a composite literal.
    Expr(&'a Spanned<Expr>),
    Proto(&'a ProtoLiteral),
    /// A named entry; only its literal is used.
    Named(&'a NamedLiteral),
}

impl<'a> Literal<'a> {
    /// Drop names and parentheses; `&T{...}` is its composite literal.
    pub(super) fn unwrap(self) -> Literal<'a> {
        match self {
            Literal::Named(named) => Literal::Proto(&named.literal),
            Literal::Expr(expr) => match &expr.node {
                Expr::Paren(inner) => Literal::Expr(inner).unwrap(),
                Expr::Unary {
                    op: OperatorId::Amp,
                    operand,
                } if matches!(operand.node, Expr::CompositeLit { .. }) => Literal::Expr(operand),
                _ => self,
            },
            Literal::Proto(_) => self,
        }
    }

    /// Textual token of a scalar literal.
    pub(super) fn token(self) -> Option<String> {
        match self.unwrap() {
            Literal::Proto(lit) if lit.array.is_none() && lit.entries.is_none() => Some(lit.source_representation()),
            Literal::Expr(expr) => expr_token(&expr.node),
            _ => None,
        }
    }

    pub(super) fn describe(self) -> String {
        match self.unwrap() {
            Literal::Expr(expr) => match &expr.node {
                Expr::CompositeLit { .. } => "composite literal".to_string(),
                Expr::Ident(name) => format!("identifier {name}"),
                Expr::BasicLit(lit) => format!("literal {}", lit.raw),
                _ => "expression".to_string(),
            },
            Literal::Proto(lit) => format!("literal {lit}"),
            Literal::Named(named) => format!("literal {}", named.literal),
        }
    }
}

fn expr_token(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(name) => Some(name.clone()),
        Expr::BasicLit(lit) => Some(lit.raw.clone()),
        Expr::Selector { sel, .. } => Some(sel.node.clone()),
        Expr::Paren(inner) => expr_token(&inner.node),
        Expr::Unary {
            op: OperatorId::Minus,
            operand,
        } => expr_token(&operand.node).map(|t| format!("-{t}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aggregate() {
        let lit = ProtoLiteral::parse(r#"{ name: "x" tags: ["a", 'b'], nested { depth: 2 }; [ext.opt]: true }"#).unwrap();
        let entries = lit.entries.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["name", "tags", "nested", "[ext.opt]"]);
        assert_eq!(entries[0].literal, ProtoLiteral::string("x"));
        assert_eq!(entries[1].literal.array.as_ref().map(Vec::len), Some(2));
        assert_eq!(entries[3].literal, ProtoLiteral::token("true"));
    }

    #[test]
    fn adjacent_strings_concatenate() {
        let lit = ProtoLiteral::parse(r#""a\"b" "c""#).unwrap();
        assert_eq!(lit.source, r#"a\"bc"#);
        assert_eq!(lit.source_representation(), r#""a\"bc""#);
    }

    #[test]
    fn single_quoted_strings_requote() {
        let lit = ProtoLiteral::parse(r#"'say "hi"'"#).unwrap();
        assert_eq!(lit.source_representation(), r#""say \"hi\"""#);
        let lit = ProtoLiteral::parse(r"'it\'s' ' ok\n'").unwrap();
        assert_eq!(lit.source_representation(), r#""it's ok\n""#);
    }

    #[test]
    fn parse_errors_carry_offsets() {
        let err = ProtoLiteral::parse("[1 2]").unwrap_err();
        assert_eq!(
            err,
            BuildError::Syntax {
                offset: 3,
                message: "expected ',' or ']'".to_string()
            }
        );
        assert!(matches!(ProtoLiteral::parse("{ a: \"x }"), Err(BuildError::Syntax { .. })));
        assert!(matches!(ProtoLiteral::parse("1 2"), Err(BuildError::Syntax { offset: 2, .. })));
    }

    #[test]
    fn display_round_trips_structure() {
        let text = r#"{ a: 1 b: ["x", y] }"#;
        let lit = ProtoLiteral::parse(text).unwrap();
        assert_eq!(ProtoLiteral::parse(&lit.to_string()).unwrap(), lit);
    }
}

//! `+gunk` annotation splitting.
//!
//! A doc comment such as
//!
//! ```text
//! // Echo returns its input.
//! //
//! // +gunk http.Match{
//! //     Method: "POST",
//! //     Path:   "/v1/echo",
//! // }
//! ```
//!
//! holds ordinary documentation followed by tags. Every line starting with `+gunk ` opens a tag;
//! the following lines continue it until the next marker. Each tag is parsed as one expression
//! and, when the package was type-checked, evaluated in the package scope.
//!
//! ## Notes
//!
//! - **Positions**: the marker is blanked with spaces of the same width, so every byte of a tag keeps its column.
//!   Spans of parsed tags (and of tag errors) are mapped line by line back to absolute file offsets.
//! - **Rewriting**: a split comment is replaced by a new group holding only the documentation text. The replacement
//!   keeps the original start and end offsets and is substituted both on the declaration and in the file's comment
//!   list.

use std::collections::HashMap;

use gunk_core::lang::conventions::{TAG_MARKER, TAG_MARKER_PREFIX};

use crate::frontend::ast::*;
use crate::frontend::comments::CommentGroup;
use crate::frontend::diagnostics::CompileError;
use crate::frontend::package::{DiagnosticKind, Tag};
use crate::frontend::parser;
use crate::frontend::typechecker::TypeEnv;

/// Documentation text and tags of one comment.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitTags {
    /// Documentation without the tag lines, trimmed.
    pub text: String,
    pub tags: Vec<Tag>,
}

/// A problem found while splitting tags.
#[derive(Debug, Clone)]
pub struct TagError {
    /// [`DiagnosticKind::Parse`] for syntax errors, [`DiagnosticKind::Type`] for evaluation errors.
    pub kind: DiagnosticKind,
    /// The error; its span is an absolute file offset.
    pub error: CompileError,
}

/// Tags of one file, keyed by the span of the node they are attached to.
#[derive(Debug, Default)]
pub struct FileTags {
    pub tags: HashMap<Span, Vec<Tag>>,
    pub errors: Vec<TagError>,
}

/// One tag being accumulated: its source text and, per line, the absolute offset of the line.
struct TagBlock {
    source: String,
    /// `(offset within source, absolute offset)` of every line start.
    lines: Vec<(usize, usize)>,
}

impl TagBlock {
    fn new(line: &str, offset: usize) -> Self {
        let blanked = format!("{}{}", " ".repeat(TAG_MARKER.len()), &line[TAG_MARKER.len()..]);
        Self {
            source: blanked,
            lines: vec![(0, offset)],
        }
    }

    fn push_line(&mut self, line: &str, offset: usize) {
        self.source.push('\n');
        self.lines.push((self.source.len(), offset));
        self.source.push_str(line);
    }

    /// Map an offset within the tag source to an absolute file offset.
    fn absolute(&self, relative: usize) -> usize {
        let idx = self.lines.partition_point(|(start, _)| *start <= relative).max(1) - 1;
        let (start, absolute) = self.lines[idx];
        absolute + (relative - start)
    }

    fn absolute_span(&self, span: Span) -> Span {
        Span::new(self.absolute(span.start), self.absolute(span.end))
    }
}

/// Split the tags out of one doc comment.
///
/// ## Parameters
/// - `doc`: The comment group.
/// - `env`: The checked package and the index of the file holding `doc`; `None` skips evaluation.
///
/// ## Errors
/// - The first syntax error of a tag, or the first evaluation error.
pub fn split_tags(doc: &CommentGroup, env: Option<(&TypeEnv, usize)>) -> Result<SplitTags, TagError> {
    let mut text_lines = Vec::new();
    let mut blocks: Vec<TagBlock> = Vec::new();
    for line in doc.lines() {
        if line.text.starts_with(TAG_MARKER_PREFIX) {
            blocks.push(TagBlock::new(&line.text, line.offset));
        } else if let Some(block) = blocks.last_mut() {
            block.push_line(&line.text, line.offset);
        } else {
            text_lines.push(line.text);
        }
    }

    let mut tags = Vec::with_capacity(blocks.len());
    for block in &blocks {
        let mut expr = parser::parse_expr(&block.source).map_err(|errors| {
            let mut error = errors
                .into_iter()
                .next()
                .unwrap_or_else(|| CompileError::syntax("invalid tag expression".to_string(), Span::default()));
            error.span = block.absolute_span(error.span);
            TagError {
                kind: DiagnosticKind::Parse,
                error,
            }
        })?;
        expr.map_spans(&|span| block.absolute_span(span));

        let (ty, value) = match env {
            Some((env, file)) => {
                let tv = env.eval(file, &expr).map_err(|error| TagError {
                    kind: DiagnosticKind::Type,
                    error,
                })?;
                (Some(tv.ty), tv.value)
            }
            None => (None, None),
        };
        tags.push(Tag {
            expr,
            text: block.source.clone(),
            ty,
            value,
        });
    }

    Ok(SplitTags {
        text: text_lines.join("\n").trim().to_string(),
        tags,
    })
}

/// Walks a file, splitting every declaration-attached doc comment.
struct Splitter<'e> {
    env: Option<(&'e TypeEnv, usize)>,
    out: FileTags,
    /// Replacement comment groups, keyed by the span of the group they replace.
    replaced: Vec<(Span, CommentGroup)>,
}

impl Splitter<'_> {
    /// Split `doc` and record its tags under `key`. Returns `false` if the comment had an error.
    fn doc(&mut self, doc: &mut Option<CommentGroup>, key: Span) -> bool {
        let Some(group) = doc else {
            return true;
        };
        match split_tags(group, self.env) {
            Ok(split) => {
                if !split.tags.is_empty() {
                    let replacement = CommentGroup::from_text(group, &split.text);
                    self.replaced.push((group.span(), replacement.clone()));
                    *group = replacement;
                    self.out.tags.insert(key, split.tags);
                }
                true
            }
            Err(err) => {
                self.out.errors.push(err);
                false
            }
        }
    }

    fn decl(&mut self, decl: &mut GenDecl) {
        if let [spec] = decl.specs.as_mut_slice() {
            if decl.doc.is_some() && !matches!(spec, Spec::Import(_)) {
                *spec.doc_mut() = decl.doc.take();
            }
        }
        for spec in &mut decl.specs {
            match spec {
                Spec::Import(_) => {}
                Spec::Type(ts) => {
                    if self.doc(&mut ts.doc, ts.span) {
                        self.type_expr(&mut ts.ty);
                    }
                }
                Spec::Const(cs) => {
                    if self.doc(&mut cs.doc, cs.span) {
                        if let Some(ty) = &mut cs.ty {
                            self.type_expr(ty);
                        }
                    }
                }
            }
        }
    }

    /// Fields and methods of struct and interface types, at any depth.
    fn type_expr(&mut self, expr: &mut Spanned<Expr>) {
        match &mut expr.node {
            Expr::StructType(st) => {
                for field in &mut st.fields {
                    if self.doc(&mut field.doc, field.span) {
                        self.type_expr(&mut field.ty);
                    }
                }
            }
            Expr::InterfaceType(it) => {
                for method in &mut it.methods {
                    if self.doc(&mut method.doc, method.span) {
                        for param in method.params.iter_mut().chain(method.results.iter_mut()) {
                            self.type_expr(&mut param.ty);
                        }
                    }
                }
            }
            Expr::Star(inner) | Expr::SliceType(inner) | Expr::Paren(inner) => self.type_expr(inner),
            Expr::MapType { key, value } => {
                self.type_expr(key);
                self.type_expr(value);
            }
            _ => {}
        }
    }
}

/// Split the tags of every declaration in `file`, rewriting the doc comments in place.
///
/// Once every comment split cleanly, any comment still containing the tag marker is reported as
/// a tag without declaration.
///
/// ## Parameters
/// - `file`: The parsed file; doc comments and the comment list are rewritten.
/// - `file_idx`: Index of the file within its package, for evaluating tags against its imports.
/// - `env`: The checked package, when type checking ran.
#[tracing::instrument(skip_all, fields(file_idx = file_idx))]
pub fn split_file(file: &mut File, file_idx: usize, env: Option<&TypeEnv>) -> FileTags {
    let mut splitter = Splitter {
        env: env.map(|env| (env, file_idx)),
        out: FileTags::default(),
        replaced: Vec::new(),
    };

    let file_key = file.span;
    if splitter.doc(&mut file.doc, file_key) {
        for decl in &mut file.decls {
            splitter.decl(decl);
        }
    }

    let Splitter {
        mut out, replaced, ..
    } = splitter;
    for (span, replacement) in replaced {
        if let Some(group) = file.comments.iter_mut().find(|g| g.span() == span) {
            *group = replacement;
        }
    }

    if out.errors.is_empty() {
        for comment in file.comments.iter().flat_map(|g| g.list.iter()) {
            if comment.text.contains(TAG_MARKER) {
                out.errors.push(TagError {
                    kind: DiagnosticKind::Parse,
                    error: CompileError::syntax(
                        format!("gunk tag without declaration: {}", comment.text),
                        comment.span,
                    ),
                });
            }
        }
    }
    tracing::debug!(tagged = out.tags.len(), errors = out.errors.len(), "split tags");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::position::LineIndex;

    fn parse(source: &str) -> File {
        parser::parse_file(source, 1).expect("test source parses")
    }

    fn type_spec(file: &File, idx: usize) -> &TypeSpec {
        match &file.decls[idx].specs[0] {
            Spec::Type(ts) => ts,
            other => panic!("not a type spec: {other:?}"),
        }
    }

    const ECHO: &str = r#"package p

// Echo says things.
//
// +gunk opt.Route("/echo")
// +gunk opt.Match{
//     Method: "POST",
// }
type Echo struct {
	// Text is echoed.
	// +gunk opt.Required(true)
	Text string `pb:"1"`
}
"#;

    #[test]
    fn splits_tags_in_order_with_continuations() {
        let mut file = parse(ECHO);
        let out = split_file(&mut file, 0, None);
        assert!(out.errors.is_empty(), "{:?}", out.errors);

        let ts = type_spec(&file, 0);
        let tags = &out.tags[&ts.span];
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].text, "      opt.Route(\"/echo\")");
        assert!(tags[1].text.contains("opt.Match{\n    Method: \"POST\",\n}"));
        assert!(tags.iter().all(|t| t.ty.is_none()));
        assert_eq!(ts.doc.as_ref().unwrap().text(), "Echo says things.");
    }

    #[test]
    fn field_tags_are_keyed_by_field_span() {
        let mut file = parse(ECHO);
        let out = split_file(&mut file, 0, None);
        let Expr::StructType(st) = &type_spec(&file, 0).ty.node else {
            panic!("not a struct");
        };
        let field = &st.fields[0];
        assert_eq!(out.tags[&field.span].len(), 1);
        assert_eq!(field.doc.as_ref().unwrap().text(), "Text is echoed.");
    }

    #[test]
    fn tag_spans_are_absolute() {
        let mut file = parse(ECHO);
        let out = split_file(&mut file, 0, None);
        let ts = type_spec(&file, 0);
        let tag = &out.tags[&ts.span][0];
        let start = tag.expr.span.start - 1;
        assert!(ECHO[start..].starts_with("opt.Route(\"/echo\")"));
    }

    #[test]
    fn syntax_error_points_into_the_comment() {
        let source = "package p\n\n// Doc.\n// +gunk opt.A(1)\n// +gunk opt.B(1 2)\n// +gunk opt.C(3)\ntype T int\n";
        let mut file = parse(source);
        let out = split_file(&mut file, 0, None);
        assert_eq!(out.errors.len(), 1);
        let err = &out.errors[0];
        assert_eq!(err.kind, DiagnosticKind::Parse);
        let lines = LineIndex::new(source, 1);
        assert_eq!(lines.line(err.error.span.start), 5);
        assert!(out.tags.is_empty());
    }

    #[test]
    fn tag_without_declaration() {
        let source = "package p\n\ntype T int // +gunk opt.A(1)\n";
        let mut file = parse(source);
        let out = split_file(&mut file, 0, None);
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].kind, DiagnosticKind::Parse);
        assert_eq!(
            out.errors[0].error.message,
            "gunk tag without declaration: // +gunk opt.A(1)"
        );
    }

    #[test]
    fn split_comments_are_replaced_in_comment_list() {
        let mut file = parse(ECHO);
        split_file(&mut file, 0, None);
        assert!(
            file.comments
                .iter()
                .flat_map(|g| g.list.iter())
                .all(|c| !c.text.contains(TAG_MARKER))
        );
    }

    #[test]
    fn marker_needs_trailing_space() {
        let source = "package p\n\n// +gunkish is not a tag\ntype T int\n";
        let mut file = parse(source);
        let out = split_file(&mut file, 0, None);
        assert!(out.tags.is_empty());
        // Left in place, so it is reported as an orphan marker.
        assert_eq!(out.errors.len(), 1);
    }
}

//! Comments and comment groups.
//!
//! The lexer emits every `//` and `/* */` comment as a token; the parser folds adjacent comments
//! into [`CommentGroup`]s and attaches them to declarations as documentation. Doc text is read
//! through [`CommentGroup::lines`], which keeps the global offset of every text line so that
//! anything parsed out of a comment can be mapped back to its exact place in the file.
//!
//! ## Notes
//! - Text extraction strips `//` and one following space, or the `/*`/`*/` delimiters, drops trailing whitespace,
//!   leading blank lines, trailing blank lines and collapses runs of blank lines into one.
//! - Tool directives (`//line ...`, `//tool:cmd`) carry no documentation and are skipped.

use crate::ast::Span;

/// A single `//` or `/* */` comment, text including delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

/// One line of documentation text, with the global offset of its first byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub text: String,
    pub offset: usize,
}

/// A sequence of comments with no tokens and no blank lines between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    pub list: Vec<Comment>,
}

impl CommentGroup {
    pub fn new(list: Vec<Comment>) -> Self {
        Self { list }
    }

    pub fn span(&self) -> Span {
        match (self.list.first(), self.list.last()) {
            (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
            _ => Span::default(),
        }
    }

    /// Documentation lines with their offsets.
    pub fn lines(&self) -> Vec<CommentLine> {
        let mut lines: Vec<CommentLine> = Vec::new();
        for comment in &self.list {
            let text = comment.text.as_str();
            let (body, body_offset) = if let Some(rest) = text.strip_prefix("//") {
                if let Some(rest) = rest.strip_prefix(' ') {
                    (rest, comment.span.start + 3)
                } else if is_directive(rest) {
                    continue;
                } else {
                    (rest, comment.span.start + 2)
                }
            } else {
                let inner = text
                    .strip_prefix("/*")
                    .and_then(|t| t.strip_suffix("*/"))
                    .unwrap_or(text);
                (inner, comment.span.start + 2)
            };

            let mut offset = body_offset;
            for line in body.split('\n') {
                lines.push(CommentLine {
                    text: line.trim_end().to_string(),
                    offset,
                });
                offset += line.len() + 1;
            }
        }

        // Drop leading blanks and collapse interior runs of blanks.
        let mut kept: Vec<CommentLine> = Vec::with_capacity(lines.len());
        for line in lines {
            let previous_blank = kept.last().is_none_or(|l| l.text.is_empty());
            if !line.text.is_empty() || !previous_blank {
                kept.push(line);
            }
        }
        while kept.last().is_some_and(|l| l.text.is_empty()) {
            kept.pop();
        }
        kept
    }

    /// Documentation text, lines joined with `\n`, without a trailing newline.
    pub fn text(&self) -> String {
        self.lines()
            .into_iter()
            .map(|l| l.text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build a `//`-style group holding `text`, anchored at the span of `orig`.
    ///
    /// The replacement keeps the original start and end offsets, so the group still sits between
    /// the same tokens as the comment it replaces.
    pub fn from_text(orig: &CommentGroup, text: &str) -> CommentGroup {
        let span = orig.span();
        let list = text
            .split('\n')
            .map(|line| Comment {
                text: if line.is_empty() {
                    "//".to_string()
                } else {
                    format!("// {line}")
                },
                span,
            })
            .collect();
        CommentGroup { list }
    }
}

fn is_directive(text: &str) -> bool {
    if text.starts_with("line ") {
        return true;
    }
    let Some((tool, rest)) = text.split_once(':') else {
        return false;
    };
    !tool.is_empty()
        && tool.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && rest.bytes().next().is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_comment(text: &str, start: usize) -> Comment {
        Comment {
            text: text.to_string(),
            span: Span::new(start, start + text.len()),
        }
    }

    #[test]
    fn text_strips_markers_and_blank_runs() {
        let group = CommentGroup::new(vec![
            line_comment("//", 0),
            line_comment("// Hello  ", 3),
            line_comment("//", 14),
            line_comment("//", 17),
            line_comment("//world", 20),
            line_comment("//", 28),
        ]);
        assert_eq!(group.text(), "Hello\n\nworld");
    }

    #[test]
    fn lines_keep_offsets() {
        let group = CommentGroup::new(vec![line_comment("// a", 10), line_comment("// +gunk x", 15)]);
        let lines = group.lines();
        assert_eq!(lines[0].offset, 13);
        assert_eq!(lines[1].offset, 18);
        assert_eq!(lines[1].text, "+gunk x");
    }

    #[test]
    fn block_comment_lines() {
        let text = "/* one\n   two */";
        let group = CommentGroup::new(vec![line_comment(text, 100)]);
        let lines = group.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, " one");
        assert_eq!(lines[0].offset, 102);
        assert_eq!(lines[1].text, "   two");
        assert_eq!(lines[1].offset, 107);
    }

    #[test]
    fn directives_are_skipped() {
        let group = CommentGroup::new(vec![line_comment("//go:generate x", 0), line_comment("// doc", 16)]);
        assert_eq!(group.text(), "doc");
    }

    #[test]
    fn from_text_keeps_span() {
        let orig = CommentGroup::new(vec![line_comment("// a", 10), line_comment("// +gunk x", 15)]);
        let replaced = CommentGroup::from_text(&orig, "a");
        assert_eq!(replaced.span(), orig.span());
        assert_eq!(replaced.text(), "a");
    }
}

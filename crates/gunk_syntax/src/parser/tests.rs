#[cfg(test)]
/// Parser unit tests.
///
/// These tests focus on comment attachment (docs, trailing field comments), the Gunk subset of
/// declarations, and the errors for syntax Gunk files may not use.
mod tests {
    use super::*;

    const ECHO: &str = r#"// Package echo is an echo service.
package echo

import (
	"github.com/gunk/opt/http"
)

// Message is a msg.
type Message struct {
	// Text is the text.
	Text string `pb:"1" json:"text"` // trailing
	Count int `pb:"2"`
}

// Util describes methods.
type Util interface {
	// Echo echoes.
	//
	// +gunk http.Match{Method: "POST", Path: "/echo"}
	Echo(Message) Message
}

const (
	A = iota
	B
)
"#;

    fn type_spec(decl: &GenDecl) -> &TypeSpec {
        match &decl.specs[0] {
            Spec::Type(spec) => spec,
            other => panic!("Expected type spec, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_attaches_docs() {
        let file = parse_file(ECHO, 1).unwrap();
        assert_eq!(file.name.node, "echo");
        assert_eq!(file.doc.as_ref().map(|d| d.text()).as_deref(), Some("Package echo is an echo service."));
        assert_eq!(file.decls.len(), 4);
        assert_eq!(file.imports().count(), 1);

        let message = &file.decls[1];
        assert!(!message.grouped);
        assert_eq!(message.doc.as_ref().map(|d| d.text()).as_deref(), Some("Message is a msg."));
        assert!(type_spec(message).doc.is_none());
    }

    #[test]
    fn test_struct_fields_tags_and_comments() {
        let file = parse_file(ECHO, 1).unwrap();
        let spec = type_spec(&file.decls[1]);
        let Expr::StructType(st) = &spec.ty.node else {
            panic!("Expected struct type");
        };
        assert_eq!(st.fields.len(), 2);

        let text = &st.fields[0];
        assert_eq!(text.names[0].node, "Text");
        assert_eq!(text.doc.as_ref().map(|d| d.text()).as_deref(), Some("Text is the text."));
        assert_eq!(text.comment.as_ref().map(|d| d.text()).as_deref(), Some("trailing"));
        assert_eq!(text.tag.as_ref().map(|t| t.node.as_str()), Some("`pb:\"1\" json:\"text\"`"));

        let count = &st.fields[1];
        assert!(count.doc.is_none());
        assert!(count.comment.is_none());
    }

    #[test]
    fn test_interface_method_doc_keeps_tag_lines() {
        let file = parse_file(ECHO, 1).unwrap();
        let spec = type_spec(&file.decls[2]);
        let Expr::InterfaceType(it) = &spec.ty.node else {
            panic!("Expected interface type");
        };
        let method = &it.methods[0];
        assert_eq!(method.name.node, "Echo");
        assert_eq!(method.params.len(), 1);
        assert_eq!(method.results.len(), 1);
        assert_eq!(
            method.doc.as_ref().map(|d| d.text()).as_deref(),
            Some("Echo echoes.\n\n+gunk http.Match{Method: \"POST\", Path: \"/echo\"}")
        );
    }

    #[test]
    fn test_const_group_counts_iota() {
        let file = parse_file(ECHO, 1).unwrap();
        let decl = &file.decls[3];
        assert!(decl.grouped);
        let iotas: Vec<usize> = decl
            .specs
            .iter()
            .map(|s| match s {
                Spec::Const(c) => c.iota,
                _ => panic!("Expected const spec"),
            })
            .collect();
        assert_eq!(iotas, vec![0, 1]);
    }

    #[test]
    fn test_spans_are_global() {
        let file = parse_file("package p\n", 100).unwrap();
        assert_eq!(file.name.span, Span::new(108, 109));
        assert_eq!(file.span, Span::new(100, 110));
    }

    #[test]
    fn test_grouped_params() {
        let source = "package p\ntype S interface {\n\tM(a, b int, c string) (ok bool)\n}\n";
        let file = parse_file(source, 1).unwrap();
        let Expr::InterfaceType(it) = &type_spec(&file.decls[0]).ty.node else {
            panic!("Expected interface type");
        };
        let names: Vec<&str> = it.methods[0]
            .params
            .iter()
            .filter_map(|p| p.name.as_ref().map(|n| n.node.as_str()))
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(it.methods[0].results.len(), 1);
    }

    #[test]
    fn test_mixed_params_rejected() {
        let source = "package p\ntype S interface {\n\tM(a int, string)\n}\n";
        let errs = parse_file(source, 1).unwrap_err();
        assert!(errs[0].message.contains("mixed named and unnamed parameters"), "got: {}", errs[0].message);
    }

    #[test]
    fn test_parse_expr_composite_literal() {
        let expr = parse_expr("http.Match{\n\tMethod: \"GET\",\n\tPath: \"/x\",\n}\n").unwrap();
        let Expr::CompositeLit { ty, elts } = &expr.node else {
            panic!("Expected composite literal, got {:?}", expr.node);
        };
        assert_eq!(ty.as_ref().map(|t| t.node.to_string()).as_deref(), Some("http.Match"));
        assert_eq!(elts.len(), 2);
        assert!(matches!(elts[0].node, Expr::KeyValue { .. }));
        assert_eq!(expr.span, Span::new(0, 42));
    }

    #[test]
    fn test_parse_expr_elided_elements() {
        let expr = parse_expr("[]T{{A: 1}, {A: 2}}").unwrap();
        let Expr::CompositeLit { elts, .. } = &expr.node else {
            panic!("Expected composite literal");
        };
        assert!(elts.iter().all(|e| matches!(e.node, Expr::CompositeLit { ty: None, .. })));
    }

    #[test]
    fn test_binary_precedence() {
        let expr = parse_expr("1 + 2 * 3").unwrap();
        assert_eq!(expr.node.to_string(), "1 + 2 * 3");
        let Expr::Binary { op, rhs, .. } = &expr.node else {
            panic!("Expected binary expression");
        };
        assert_eq!(*op, OperatorId::Plus);
        assert!(matches!(rhs.node, Expr::Binary { op: OperatorId::Star, .. }));
    }

    #[test]
    fn test_missing_comma_in_composite_literal() {
        let errs = parse_expr("T{\n\tA: 1\n}").unwrap_err();
        assert_eq!(errs[0].message, "missing ',' before newline in composite literal");
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let errs = parse_expr("A B").unwrap_err();
        assert!(errs[0].message.starts_with("expected EOF"), "got: {}", errs[0].message);
    }

    #[test]
    fn test_func_declaration_rejected() {
        let errs = parse_file("package p\n\nfunc F() {}\n\ntype T int\n", 1).unwrap_err();
        assert_eq!(errs.len(), 1, "Parser should recover at the next declaration");
        assert_eq!(errs[0].message, "function declarations are not supported in Gunk files");
    }

    #[test]
    fn test_array_types_rejected() {
        let errs = parse_file("package p\ntype T struct {\n\tA [3]int\n}\n", 1).unwrap_err();
        assert_eq!(errs[0].message, "array types are not supported in Gunk files");
    }

    #[test]
    fn test_const_without_value_in_first_spec() {
        let errs = parse_file("package p\nconst (\n\tA\n)\n", 1).unwrap_err();
        assert_eq!(errs[0].message, "missing init expr for const declaration");
    }

    #[test]
    fn test_import_after_type_rejected() {
        let errs = parse_file("package p\ntype T int\nimport \"x\"\n", 1).unwrap_err();
        assert_eq!(errs[0].message, "imports must appear before other declarations");
    }

    #[test]
    fn test_missing_package_clause() {
        let errs = parse_file("type T int\n", 1).unwrap_err();
        assert_eq!(errs[0].message, "expected 'package', found keyword type");
    }

    #[test]
    fn test_unsupported_syntax_messages() {
        let sources = [
            "package p\n\nfunc F() {}\n\ntype T int\n",
            "package p\ntype T struct {\n\tA [3]int\n}\n",
            "package p\ntype T int\nimport \"x\"\n",
        ];
        let messages: Vec<String> = sources
            .iter()
            .map(|src| parse_file(src, 1).unwrap_err()[0].message.clone())
            .collect();
        insta::assert_snapshot!(messages.join("\n"), @r"
        function declarations are not supported in Gunk files
        array types are not supported in Gunk files
        imports must appear before other declarations
        ");
    }
}

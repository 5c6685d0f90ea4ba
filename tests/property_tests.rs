//! Property-based tests for the Gunk front end
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use gunk::frontend::parser;
use gunk::frontend::tags::split_file;
use gunk::reflect::{NamedLiteral, ProtoLiteral};
use gunk_core::strings::names_match;
use gunk_core::structtag::StructTag;
use proptest::prelude::*;

// =============================================================================
// Name folding
// =============================================================================

proptest! {
    /// Case and underscores never change whether names match.
    #[test]
    fn names_match_ignores_case_and_underscores(name in "[A-Za-z][A-Za-z0-9]{0,12}", cut in 0usize..12) {
        prop_assert!(names_match(&name, &name.to_lowercase()));
        prop_assert!(names_match(&name.to_uppercase(), &name));
        let at = cut.min(name.len());
        let snake = format!("{}_{}", &name[..at], &name[at..]);
        prop_assert!(names_match(&name, &snake));
    }

    #[test]
    fn names_with_different_letters_do_not_match(name in "[a-z]{1,10}", extra in "[a-z]") {
        let longer = format!("{name}{extra}");
        prop_assert!(!names_match(&name, &longer));
    }
}

// =============================================================================
// Struct tags
// =============================================================================

proptest! {
    /// Every pair of a well-formed tag is found again, first value wins.
    #[test]
    fn struct_tag_pairs_are_found(pairs in prop::collection::vec(("[a-z]{1,6}", "[a-z0-9 ]{0,8}"), 1..5)) {
        let text: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}:\"{v}\"")).collect();
        let tag = StructTag::parse(&text.join(" ")).unwrap();
        for (key, _) in &pairs {
            let first = pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
            prop_assert_eq!(tag.lookup(key), first);
        }
        prop_assert_eq!(tag.pairs().count(), pairs.len());
    }
}

// =============================================================================
// Descriptor-language literals
// =============================================================================

fn proto_literal() -> impl Strategy<Value = ProtoLiteral> {
    let leaf = prop_oneof![
        "[a-z0-9][a-z0-9.]{0,6}".prop_map(ProtoLiteral::token),
        "[a-z ]{0,8}".prop_map(ProtoLiteral::string),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|elts| ProtoLiteral {
                array: Some(elts),
                ..ProtoLiteral::default()
            }),
            prop::collection::vec(("[a-z][a-z0-9_]{0,5}", inner), 0..4).prop_map(|entries| ProtoLiteral {
                entries: Some(
                    entries
                        .into_iter()
                        .map(|(name, literal)| NamedLiteral { name, literal })
                        .collect()
                ),
                ..ProtoLiteral::default()
            }),
        ]
    })
}

proptest! {
    /// A displayed literal parses back to itself.
    #[test]
    fn proto_literal_display_reparses(literal in proto_literal()) {
        let text = literal.to_string();
        let parsed = ProtoLiteral::parse(&text).unwrap();
        prop_assert_eq!(parsed, literal, "text: {}", text);
    }
}

// =============================================================================
// Tag splitting
// =============================================================================

proptest! {
    /// Each marker line yields one tag, in order, and the prose survives.
    #[test]
    fn every_marker_line_becomes_a_tag(values in prop::collection::vec(0u32..1000, 1..6)) {
        let mut source = String::from("package p\n\n// T is documented.\n");
        for value in &values {
            source.push_str(&format!("// +gunk T({value})\n"));
        }
        source.push_str("type T int\n");

        let mut file = parser::parse_file(&source, 1).unwrap();
        let out = split_file(&mut file, 0, None);
        prop_assert!(out.errors.is_empty());
        let tags: Vec<&gunk::Tag> = out.tags.values().flatten().collect();
        prop_assert_eq!(tags.len(), values.len());
        for (tag, value) in tags.iter().zip(&values) {
            let expected = format!("T({value})");
            prop_assert_eq!(tag.text.trim(), expected.as_str());
        }
    }
}

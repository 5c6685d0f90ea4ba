use std::collections::HashMap;

use gunk_core::lang::conventions;
use gunk_core::lang::keywords;
use gunk_core::lang::operators;
use gunk_core::lang::punctuation;
use gunk_core::lang::types;

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, keywords::KeywordId> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert_eq!(
            keywords::from_str(info.canonical),
            Some(info.id),
            "keyword canonical spelling not resolvable: {}",
            info.canonical
        );
        assert_eq!(
            keywords::as_str(info.id),
            info.canonical,
            "keyword as_str mismatch for {:?}",
            info.id
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate keyword spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
    }
}

#[test]
fn operators_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, operators::OperatorId> = HashMap::new();

    for info in operators::OPERATORS {
        assert_eq!(
            operators::from_str(info.spelling),
            Some(info.id),
            "operator spelling not resolvable: {}",
            info.spelling
        );
        if let Some(prev) = seen.insert(info.spelling, info.id) {
            panic!(
                "duplicate operator spelling {:?}: {:?} and {:?}",
                info.spelling, prev, info.id
            );
        }
        // Infix operators other than `=` must bind at a real precedence level.
        if info.fixity == operators::Fixity::Infix && info.id != operators::OperatorId::Eq {
            assert!(
                (1..=5).contains(&info.precedence),
                "infix operator {} has precedence {}",
                info.spelling,
                info.precedence
            );
        }
    }
}

#[test]
fn punctuation_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, punctuation::PunctuationId> = HashMap::new();

    for info in punctuation::PUNCTUATION {
        assert_eq!(
            punctuation::from_str(info.canonical),
            Some(info.id),
            "punctuation spelling not resolvable: {}",
            info.canonical
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate punctuation spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        assert!(
            operators::from_str(info.canonical).is_none(),
            "punctuation {} collides with an operator",
            info.canonical
        );
    }
}

#[test]
fn basic_types_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, types::BasicTypeId> = HashMap::new();

    for info in types::BASIC_TYPES {
        assert_eq!(types::from_str(info.canonical), Some(info.id));
        for &alias in info.aliases {
            assert_eq!(
                types::from_str(alias),
                Some(info.id),
                "type alias not resolvable: {}",
                alias
            );
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!("duplicate type alias {:?}: {:?} and {:?}", alias, prev, info.id);
            }
        }
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate type spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }
        if info.category.is_numeric() {
            assert!(info.bits > 0, "numeric type {} has no width", info.canonical);
        }
    }
}

#[test]
fn predeclared_names_do_not_shadow_keywords() {
    for info in types::BASIC_TYPES {
        assert!(keywords::from_str(info.canonical).is_none(), "{}", info.canonical);
    }
    for info in types::PREDECLARED_VALUES {
        assert!(keywords::from_str(info.canonical).is_none(), "{}", info.canonical);
        assert_eq!(types::predeclared_value(info.canonical), Some(info.id));
    }
}

#[test]
fn tag_marker_prefix_extends_marker() {
    assert!(conventions::TAG_MARKER_PREFIX.starts_with(conventions::TAG_MARKER));
    assert_eq!(conventions::TAG_MARKER_PREFIX.len(), conventions::TAG_MARKER.len() + 1);
    assert!(conventions::is_source_file("api.gunk"));
    assert!(!conventions::is_source_file("api.go"));
    assert!(!conventions::is_source_file(".gunk"));
    assert!(conventions::is_ignored_name("_vendor"));
}

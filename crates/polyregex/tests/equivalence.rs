#![allow(missing_docs)]

//! Cross-engine equivalence: on the capability subset every engine
//! supports, all engines must agree on every haystack.

use polyregex::{
    AdaptivePattern,
    Capability,
    Engine,
    Matchable,
    Pattern,
    PolyregexError,
};
use proptest::prelude::*;

const SAMPLES: &[&str] = &[
    "hello world",
    "The quick brown fox jumps over the lazy dog.",
    "It's a beautiful day, and I'll be taking my 3 dogs for a walk.",
    "Don't forget: the temperature is 72 degrees!",
    "  multiple   spaces  ",
    "line1\nline2\r\nline3",
    "123 + 456 = 789",
    "caf\u{00e9} na\u{00ef}ve \u{4f60}\u{597d}",
    "$$$!!!...---",
    " ",
    "a",
    "",
    "\t\ttabs\tand\tspaces ",
    "emoji: \u{1f600}\u{1f680}\u{1f4a1}",
];

/// Patterns restricted to syntax every engine accepts.
const PORTABLE_PATTERNS: &[&str] = &[
    r"\w+",
    r"\d+",
    r"\s+",
    r"[a-z]{2,}",
    r"fox|dog",
    r"x?",
    r".",
];

fn spans(
    pattern: &Pattern,
    haystack: &str,
) -> Vec<(usize, usize)> {
    let mut m = pattern.matcher(haystack);
    let mut out = Vec::new();
    while m.find().unwrap() {
        out.push((m.start().unwrap(), m.end().unwrap()));
    }
    out
}

#[test]
fn engines_agree_on_portable_patterns() {
    for source in PORTABLE_PATTERNS {
        let patterns = Pattern::compile_all(source).unwrap();
        let reference = &patterns[0];

        for text in SAMPLES {
            let expect_test = reference.test(text).unwrap();
            let expect_find = reference.find(text).unwrap();
            let expect_spans = spans(reference, text);
            let expect_split = reference.split(text).unwrap();

            for pattern in &patterns[1..] {
                let engine = pattern.engine();
                assert_eq!(
                    pattern.test(text).unwrap(),
                    expect_test,
                    "test mismatch ({engine}) for {source:?} on {text:?}"
                );
                assert_eq!(
                    pattern.find(text).unwrap(),
                    expect_find,
                    "find mismatch ({engine}) for {source:?} on {text:?}"
                );
                assert_eq!(
                    spans(pattern, text),
                    expect_spans,
                    "span mismatch ({engine}) for {source:?} on {text:?}"
                );
                assert_eq!(
                    pattern.split(text).unwrap(),
                    expect_split,
                    "split mismatch ({engine}) for {source:?} on {text:?}"
                );
            }
        }
    }
}

#[test]
fn engines_agree_on_literal_replacement() {
    for source in [r"\d+", r"\s+"] {
        for text in SAMPLES {
            let expected = Pattern::backtracking(source)
                .unwrap()
                .replace_all(text, "#")
                .unwrap();
            for engine in [Engine::Dfa, Engine::LinearNfa] {
                let pattern = Pattern::compile(engine, source).unwrap();
                assert_eq!(
                    pattern.replace_all(text, "#").unwrap(),
                    expected,
                    "replace_all mismatch ({engine}) for {source:?} on {text:?}"
                );
            }
        }
    }
}

#[test]
fn identity_replacement_preserves_input() {
    // Template replacement is gated off the DFA engine.
    for engine in [Engine::Backtracking, Engine::LinearNfa] {
        let pattern = Pattern::compile(engine, r"\w+").unwrap();
        for text in SAMPLES {
            assert_eq!(
                pattern.replace(text, |m| m.to_string()).unwrap(),
                *text,
                "identity replace mutated input on {engine}"
            );
        }
    }
}

#[test]
fn capability_gates_are_uniform_across_surfaces() {
    let dfa = Pattern::dfa(r"(\w+)").unwrap();

    // Boolean and positional queries work.
    assert!(dfa.test("word").unwrap());
    let mut m = dfa.matcher("word");
    assert!(m.find().unwrap());
    assert_eq!(m.group().unwrap(), "word");

    // Group, region, and template surfaces are rejected.
    assert!(matches!(
        m.group_at(1),
        Err(PolyregexError::Capability {
            capability: Capability::IndexedGroups,
            ..
        })
    ));
    assert!(matches!(
        m.set_region(0, 2),
        Err(PolyregexError::Capability {
            capability: Capability::RegionBounds,
            ..
        })
    ));
    assert!(matches!(
        dfa.replace("word", |s| s.to_string()),
        Err(PolyregexError::Capability {
            capability: Capability::IncrementalReplace,
            ..
        })
    ));
}

#[test]
fn adaptive_selector_converges_end_to_end() {
    let selector =
        AdaptivePattern::with_trial(Pattern::compile_all(r"[a-z]+").unwrap(), 30).unwrap();

    for text in SAMPLES.iter().cycle().take(64) {
        let _ = selector.test(text).unwrap();
    }

    assert!(selector.converged());
    let winner = selector.winner().unwrap();
    assert_eq!(winner.as_str(), r"[a-z]+");

    // Post-convergence answers still match a plain pattern.
    for text in SAMPLES {
        assert_eq!(
            selector.test(text).unwrap(),
            winner.test(text).unwrap(),
            "adaptive answer diverged on {text:?}"
        );
    }
}

#[test]
fn adaptive_selector_is_shareable_across_threads() {
    let selector = std::sync::Arc::new(
        AdaptivePattern::with_trial(Pattern::compile_all(r"\d+").unwrap(), 24).unwrap(),
    );

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let selector = selector.clone();
            scope.spawn(move || {
                for text in SAMPLES.iter().cycle().take(50) {
                    let _ = selector.find(text).unwrap();
                }
            });
        }
    });

    assert!(selector.converged());
}

proptest! {
    #[test]
    fn prop_engines_agree_on_random_haystacks(
        haystack in "[a-c0-2 .\\-]{0,40}",
    ) {
        for source in [r"\d+", r"[a-c]+", r"a.c"] {
            let patterns = Pattern::compile_all(source).unwrap();
            let reference = &patterns[0];

            let expect_test = reference.test(&haystack).unwrap();
            let expect_spans = spans(reference, &haystack);
            let expect_split = reference.split(&haystack).unwrap();

            for pattern in &patterns[1..] {
                prop_assert_eq!(pattern.test(&haystack).unwrap(), expect_test);
                prop_assert_eq!(&spans(pattern, &haystack), &expect_spans);
                prop_assert_eq!(&pattern.split(&haystack).unwrap(), &expect_split);
            }
        }
    }

    #[test]
    fn prop_split_tokens_never_contain_delimiter(
        haystack in "[a-z,]{0,30}",
    ) {
        for pattern in Pattern::compile_all(",").unwrap() {
            for token in pattern.split(&haystack).unwrap() {
                prop_assert!(!token.contains(','));
            }
        }
    }
}

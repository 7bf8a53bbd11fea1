//! Literal Union Patterns

use crate::engine::Engine;
use crate::errors::PolyResult;
use crate::pattern::Pattern;

/// Build a union pattern of escaped literals.
///
/// The result matches any of the alternatives verbatim; regex
/// metacharacters in the alternatives are escaped. The alternation is
/// wrapped in a non-capturing group, so the pattern compiles on every
/// [`Engine`].
///
/// ## Arguments
/// * `alts` - A slice of string-like alternatives to union.
///
/// ## Returns
/// The union pattern source.
pub fn literal_union<S: AsRef<str>>(alts: &[S]) -> String {
    let parts = alts
        .iter()
        .map(|s| regex::escape(s.as_ref()))
        .collect::<Vec<_>>();
    format!("(?:{})", parts.join("|"))
}

/// Compile a literal union on one engine.
pub fn compile_literal_union<S: AsRef<str>>(
    engine: Engine,
    alts: &[S],
) -> PolyResult<Pattern> {
    Pattern::compile(engine, &literal_union(alts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchable::Matchable;

    #[test]
    fn test_fixed_alternative_list() {
        let alternatives = ["apple", "[x]", "boat"];

        let source = literal_union(&alternatives);
        assert_eq!(source, r"(?:apple|\[x\]|boat)");

        for engine in Engine::ALL {
            let pattern = compile_literal_union(engine, &alternatives).unwrap();

            let text = "apple 123 [x] xyz boat";
            let found: Vec<&str> = pattern
                .matcher(text)
                .collect::<PolyResult<_>>()
                .unwrap();
            assert_eq!(found, ["apple", "[x]", "boat"]);
        }
    }

    #[test]
    fn test_single_alternative() {
        let pattern = compile_literal_union(Engine::LinearNfa, &["a.b"]).unwrap();
        assert!(pattern.test("a.b").unwrap());
        assert!(!pattern.test("axb").unwrap());
    }
}

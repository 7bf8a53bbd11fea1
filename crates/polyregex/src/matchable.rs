//! # Common Matching Surface
//!
//! [`Matchable`] is the query surface shared by
//! [`Pattern`](crate::pattern::Pattern) and
//! [`AdaptivePattern`](crate::adaptive::AdaptivePattern): everything is
//! a default method over `matcher()`, so an implementor only has to say
//! how to bind a cursor to an input.

use crate::errors::PolyResult;
use crate::matcher::Matcher;

/// The query surface of a compiled (or adaptively selected) pattern.
pub trait Matchable {
    /// The pattern source text.
    fn pattern(&self) -> &str;

    /// Bind a fresh match cursor to `haystack`.
    ///
    /// The haystack is borrowed for the lifetime of the cursor; the
    /// pattern never takes ownership of caller text.
    fn matcher<'h>(
        &self,
        haystack: &'h str,
    ) -> Matcher<'_, 'h>;

    /// Does the pattern match the whole of `haystack`?
    fn test(
        &self,
        haystack: &str,
    ) -> PolyResult<bool> {
        self.matcher(haystack).matches()
    }

    /// Does the pattern match anywhere inside `haystack`?
    fn find(
        &self,
        haystack: &str,
    ) -> PolyResult<bool> {
        self.matcher(haystack).find()
    }

    /// Tokenize `haystack` by the pattern, without a limit.
    ///
    /// Equivalent to `split_n(haystack, 0)`.
    fn split<'h>(
        &self,
        haystack: &'h str,
    ) -> PolyResult<Vec<&'h str>> {
        self.split_n(haystack, 0)
    }

    /// Tokenize `haystack` by the pattern.
    ///
    /// Follows `java.util.regex.Pattern::split` semantics: a positive
    /// `limit` caps the token count with the remainder left in the
    /// final token; `limit == 0` is unlimited and strips trailing empty
    /// tokens; a negative `limit` is unlimited and keeps them. A
    /// zero-width match at offset 0 produces no leading empty token,
    /// and a haystack the pattern never matches comes back whole as a
    /// single token.
    fn split_n<'h>(
        &self,
        haystack: &'h str,
        limit: isize,
    ) -> PolyResult<Vec<&'h str>> {
        let mut m = self.matcher(haystack);
        let limited = limit > 0;

        let mut parts: Vec<&'h str> = Vec::new();
        let mut index = 0;
        while m.find()? {
            let (start, end) = (m.start()?, m.end()?);
            if !limited || (parts.len() as isize) < limit - 1 {
                if index == 0 && index == start && start == end {
                    continue;
                }
                parts.push(&haystack[index..start]);
                index = end;
            } else if parts.len() as isize == limit - 1 {
                parts.push(&haystack[index..]);
                index = end;
            }
        }

        // No accepted match: the whole input is the only token.
        if index == 0 {
            return Ok(vec![haystack]);
        }

        if !limited || (parts.len() as isize) < limit {
            parts.push(&haystack[index..]);
        }

        if limit == 0 {
            while parts.last().is_some_and(|p| p.is_empty()) {
                parts.pop();
            }
        }

        Ok(parts)
    }

    /// Replace every match in `haystack` with the literal `replacement`.
    ///
    /// `replacement` is taken verbatim; `$` has no special meaning.
    /// Available on every engine.
    fn replace_all(
        &self,
        haystack: &str,
        replacement: &str,
    ) -> PolyResult<String> {
        self.replace_limited(haystack, replacement, usize::MAX)
    }

    /// Replace the first match in `haystack` with the literal
    /// `replacement`.
    fn replace_first(
        &self,
        haystack: &str,
        replacement: &str,
    ) -> PolyResult<String> {
        self.replace_limited(haystack, replacement, 1)
    }

    #[doc(hidden)]
    fn replace_limited(
        &self,
        haystack: &str,
        replacement: &str,
        max: usize,
    ) -> PolyResult<String> {
        let mut m = self.matcher(haystack);
        let mut out = String::new();
        let mut last = 0;
        let mut seen = 0;
        while seen < max && m.find()? {
            out.push_str(&haystack[last..m.start()?]);
            out.push_str(replacement);
            last = m.end()?;
            seen += 1;
        }
        out.push_str(&haystack[last..]);
        Ok(out)
    }

    /// Replace every match with the result of `f`, treating the result
    /// as a `$`-template (`$1`, `${name}`, `$$`).
    ///
    /// Requires the incremental-replace capability.
    fn replace<F>(
        &self,
        haystack: &str,
        f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.matcher(haystack).replace(f)
    }

    /// Replace every match with the result of `f`, escaping `$` so the
    /// result is substituted as literal text.
    ///
    /// Requires the incremental-replace capability.
    fn subst<F>(
        &self,
        haystack: &str,
        f: F,
    ) -> PolyResult<String>
    where
        F: FnMut(&str) -> String,
    {
        self.matcher(haystack).subst(f)
    }
}

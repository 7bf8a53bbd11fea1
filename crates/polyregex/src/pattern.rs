//! # Compiled Pattern Façade
//!
//! A [`Pattern`] owns exactly one engine-native compiled representation
//! and the pattern source text. It is immutable after construction and
//! safe to share across threads; per-search mutable state lives in the
//! [`Matcher`](crate::matcher::Matcher) it hands out.
//!
//! Alongside the plain compilation, every pattern eagerly compiles a
//! whole-input anchored sibling (`\A(?:pat)\z`). Leftmost-first engines
//! cannot decide a whole-input match by inspecting the span of an
//! unanchored search (`a|ab` against `"ab"` finds `"a"`), and the dense
//! DFA has no anchored-both-ends search mode, so `matches`/`test` run
//! against the sibling instead.

use core::fmt;
use core::hash::{Hash, Hasher};

use regex_automata::dfa::regex::Regex as DfaRegex;

use crate::engine::{Capability, Engine};
use crate::errors::{PolyResult, PolyregexError};
use crate::matchable::Matchable;
use crate::matcher::Matcher;

/// One compiled regex behind the common matching surface.
#[derive(Clone)]
pub struct Pattern {
    pub(crate) imp: EngineImpl,
}

/// Engine-native compiled representations.
///
/// Each variant carries the plain compilation and the whole-input
/// anchored sibling used by `matches`.
#[derive(Clone)]
pub(crate) enum EngineImpl {
    Backtracking {
        re: fancy_regex::Regex,
        full: fancy_regex::Regex,
    },
    Dfa {
        re: DfaRegex,
        full: DfaRegex,
        source: String,
    },
    LinearNfa {
        re: regex::Regex,
        full: regex::Regex,
    },
}

fn syntax_error(
    engine: Engine,
    pattern: &str,
    message: impl fmt::Display,
) -> PolyregexError {
    PolyregexError::Syntax {
        engine,
        pattern: pattern.to_string(),
        message: message.to_string(),
    }
}

impl Pattern {
    /// Compile `pattern` for the given engine.
    ///
    /// ## Arguments
    /// * `engine` - The engine variant to compile for.
    /// * `pattern` - The pattern source text.
    ///
    /// ## Returns
    /// The compiled pattern, or [`PolyregexError::Syntax`] carrying the
    /// offending text and the engine-reported diagnostic.
    pub fn compile(
        engine: Engine,
        pattern: &str,
    ) -> PolyResult<Self> {
        let anchored = format!(r"\A(?:{pattern})\z");

        let imp = match engine {
            Engine::Backtracking => EngineImpl::Backtracking {
                re: fancy_regex::Regex::new(pattern)
                    .map_err(|e| syntax_error(engine, pattern, e))?,
                full: fancy_regex::Regex::new(&anchored)
                    .map_err(|e| syntax_error(engine, pattern, e))?,
            },
            Engine::Dfa => EngineImpl::Dfa {
                re: DfaRegex::new(pattern).map_err(|e| syntax_error(engine, pattern, e))?,
                full: DfaRegex::new(&anchored).map_err(|e| syntax_error(engine, pattern, e))?,
                source: pattern.to_string(),
            },
            Engine::LinearNfa => EngineImpl::LinearNfa {
                re: regex::Regex::new(pattern).map_err(|e| syntax_error(engine, pattern, e))?,
                full: regex::Regex::new(&anchored)
                    .map_err(|e| syntax_error(engine, pattern, e))?,
            },
        };

        log::trace!("compiled `{pattern}` for {engine} engine");
        Ok(Self { imp })
    }

    /// Compile `pattern` on the backtracking engine.
    pub fn backtracking(pattern: &str) -> PolyResult<Self> {
        Self::compile(Engine::Backtracking, pattern)
    }

    /// Compile `pattern` on the dense-DFA engine.
    pub fn dfa(pattern: &str) -> PolyResult<Self> {
        Self::compile(Engine::Dfa, pattern)
    }

    /// Compile `pattern` on the linear-time NFA engine.
    pub fn linear_nfa(pattern: &str) -> PolyResult<Self> {
        Self::compile(Engine::LinearNfa, pattern)
    }

    /// Compile `pattern` on every engine, in [`Engine::ALL`] order.
    ///
    /// The pattern must stay inside the syntax subset all three engines
    /// accept; the result is the natural candidate set for
    /// [`AdaptivePattern`](crate::adaptive::AdaptivePattern).
    pub fn compile_all(pattern: &str) -> PolyResult<Vec<Self>> {
        Engine::ALL
            .iter()
            .map(|&engine| Self::compile(engine, pattern))
            .collect()
    }

    /// Which engine variant backs this pattern.
    pub fn engine(&self) -> Engine {
        match &self.imp {
            EngineImpl::Backtracking { .. } => Engine::Backtracking,
            EngineImpl::Dfa { .. } => Engine::Dfa,
            EngineImpl::LinearNfa { .. } => Engine::LinearNfa,
        }
    }

    /// The pattern source text.
    pub fn as_str(&self) -> &str {
        match &self.imp {
            EngineImpl::Backtracking { re, .. } => re.as_str(),
            EngineImpl::Dfa { source, .. } => source,
            EngineImpl::LinearNfa { re, .. } => re.as_str(),
        }
    }

    /// Does the engine behind this pattern implement `capability`?
    pub fn supports(
        &self,
        capability: Capability,
    ) -> bool {
        self.engine().supports(capability)
    }

    /// The number of capture groups in the pattern, excluding group 0.
    ///
    /// The DFA engine compiles captures away; its count is 0.
    pub fn group_count(&self) -> usize {
        match &self.imp {
            EngineImpl::Backtracking { re, .. } => re.capture_names().count().saturating_sub(1),
            EngineImpl::Dfa { .. } => 0,
            EngineImpl::LinearNfa { re, .. } => re.capture_names().count().saturating_sub(1),
        }
    }

    /// Does the pattern declare a capture group with the given name?
    pub fn has_group_name(
        &self,
        name: &str,
    ) -> bool {
        match &self.imp {
            EngineImpl::Backtracking { re, .. } => re.capture_names().flatten().any(|n| n == name),
            EngineImpl::Dfa { .. } => false,
            EngineImpl::LinearNfa { re, .. } => re.capture_names().flatten().any(|n| n == name),
        }
    }
}

impl Matchable for Pattern {
    fn pattern(&self) -> &str {
        self.as_str()
    }

    fn matcher<'h>(
        &self,
        haystack: &'h str,
    ) -> Matcher<'_, 'h> {
        Matcher::new(self, haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.engine() == other.engine() && self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.engine().hash(state);
        self.as_str().hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Pattern {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("engine", &self.engine())
            .field("pattern", &self.as_str())
            .finish()
    }
}

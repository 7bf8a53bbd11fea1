//! # `polyregex` Multi-Engine Regex Matching
//!
//! This is a common matching surface over several regex engine families,
//! with adaptive runtime engine selection.
//!
//! One pattern source can be compiled against:
//! * [`Engine::Backtracking`] - `fancy_regex`; look-around and the full
//!   capability set, worst-case exponential time.
//! * [`Engine::Dfa`] - `regex_automata` dense DFAs; positions only,
//!   guaranteed linear time.
//! * [`Engine::LinearNfa`] - `regex`; capture groups in guaranteed
//!   linear time.
//!
//! See:
//! * [`pattern::Pattern`] to compile a pattern on an engine.
//! * [`matcher::Matcher`] for the stateful match cursor.
//! * [`matchable::Matchable`] for the shared one-shot surface
//!   (`test` / `find` / `split` / `replace_all` / ...).
//! * [`adaptive::AdaptivePattern`] to race engines against each other
//!   and commit to the fastest.
//!
//! Engines differ in what they can express; operations beyond an
//! engine's capabilities fail with
//! [`errors::PolyregexError::Capability`] rather than degrading
//! silently. See [`engine::Capability`] for the gates.
//!
//! ```rust
//! use polyregex::{AdaptivePattern, Matchable, Pattern};
//!
//! # fn main() -> polyregex::PolyResult<()> {
//! let pattern = AdaptivePattern::new(Pattern::compile_all(r"\d+")?)?;
//!
//! assert!(pattern.test("42")?);
//! assert_eq!(pattern.split("a1b22c")?, vec!["a", "b", "c"]);
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs, unused)]

pub mod adaptive;
pub mod engine;
pub mod errors;
pub mod matchable;
pub mod matcher;
pub mod pattern;
pub mod union;

pub use adaptive::AdaptivePattern;
pub use engine::{Capability, Engine};
pub use errors::{PolyResult, PolyregexError};
pub use matchable::Matchable;
pub use matcher::Matcher;
pub use pattern::Pattern;
pub use union::literal_union;

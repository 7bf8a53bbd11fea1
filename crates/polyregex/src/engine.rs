//! # Engine Variants and Capabilities
//!
//! Three structurally different regex technologies sit behind one
//! matching surface:
//!
//! * [`Engine::Backtracking`] - [`fancy_regex`], full feature surface.
//! * [`Engine::Dfa`] - [`regex_automata`] dense DFAs, boolean test/find only.
//! * [`Engine::LinearNfa`] - [`regex`], groups and replacement but no
//!   region bounds.
//!
//! The engines do not agree on which operations exist. Rather than
//! every operation throwing from restricted engines, the supported
//! surface is a static matrix: [`Engine::supports`] answers capability
//! queries up front, and a call that lands on an unsupported operation
//! anyway fails with [`PolyregexError::Capability`].
//!
//! [`PolyregexError::Capability`]: crate::errors::PolyregexError::Capability

use core::fmt;

/// The regex execution strategy behind a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Full-featured backtracking search (`fancy_regex`).
    Backtracking,

    /// Automaton-compiled search (`regex_automata` dense DFA).
    ///
    /// Boolean test/find and group-0 positions only.
    Dfa,

    /// Linear-time NFA simulation (`regex`).
    LinearNfa,
}

impl Engine {
    /// Every engine variant, in candidate order.
    pub const ALL: [Engine; 3] = [Engine::Backtracking, Engine::Dfa, Engine::LinearNfa];

    /// Does this engine implement the given optional capability?
    ///
    /// ## Arguments
    /// * `capability` - The capability to query.
    ///
    /// ## Returns
    /// `true` if operations gated on `capability` will succeed.
    pub fn supports(
        &self,
        capability: Capability,
    ) -> bool {
        match self {
            Engine::Backtracking => true,
            Engine::Dfa => false,
            Engine::LinearNfa => matches!(
                capability,
                Capability::IndexedGroups
                    | Capability::NamedGroups
                    | Capability::IncrementalReplace
            ),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Engine::Backtracking => "backtracking",
            Engine::Dfa => "dfa",
            Engine::LinearNfa => "linear-nfa",
        };
        write!(f, "{name}")
    }
}

/// An optional feature which not every [`Engine`] implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Capture extraction by group index (beyond group 0).
    IndexedGroups,

    /// Capture extraction by group name.
    NamedGroups,

    /// Region bounds and transparent/anchoring bounds configuration.
    RegionBounds,

    /// Incremental `append_replacement` / `append_tail` rewriting.
    IncrementalReplace,
}

impl fmt::Display for Capability {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Capability::IndexedGroups => "indexed groups",
            Capability::NamedGroups => "named groups",
            Capability::RegionBounds => "region bounds",
            Capability::IncrementalReplace => "incremental replace",
        };
        write!(f, "{name}")
    }
}

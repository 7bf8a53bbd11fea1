//! # Error Types

use crate::engine::{Capability, Engine};

/// Errors from polyregex compilation, matching, and engine selection.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PolyregexError {
    /// The pattern text was rejected by the engine at compile time.
    ///
    /// The engine-reported message includes the offending position.
    #[error("invalid pattern `{pattern}` for {engine} engine: {message}")]
    Syntax {
        /// The engine that rejected the pattern.
        engine: Engine,
        /// The offending pattern text.
        pattern: String,
        /// The engine-reported diagnostic.
        message: String,
    },

    /// The operation is not implemented by the engine behind the pattern.
    #[error("{engine} engine does not support {capability}")]
    Capability {
        /// The engine the operation was routed to.
        engine: Engine,
        /// The missing capability.
        capability: Capability,
    },

    /// A group or position query was made against a matcher that holds
    /// no match, or a cursor operation received an invalid origin.
    #[error("{0}")]
    IllegalState(String),

    /// No group with the given index or name exists in the pattern.
    #[error("no such group: {0}")]
    NoSuchGroup(String),

    /// Invalid selector configuration.
    #[error("{0}")]
    Configuration(String),

    /// Runtime failure inside an engine, such as a backtrack limit
    /// or a DFA quit state.
    #[error("{engine} engine error: {message}")]
    Engine {
        /// The engine that failed.
        engine: Engine,
        /// The engine-reported diagnostic.
        message: String,
    },
}

/// Result type for polyregex operations.
pub type PolyResult<T> = core::result::Result<T, PolyregexError>;

//! The five compiler-internal fault kinds from spec.md §7.
//!
//! Grounded on the teacher's split between a structured error type at
//! subsystem boundaries and `anyhow::Result` at the public API
//! (`src/backend/module_resolver.rs` returns `anyhow::Result`; this crate's
//! pipeline stages return `Result<T, CompileError>` and the top-level
//! `compile_module` in `lib.rs` re-exposes that through `anyhow`).

use crate::debug::DebugInformation;
use thiserror::Error;

/// A compiler-internal fault, tagged with the spec.md §7 kind it belongs to.
///
/// Every variant carries the [`DebugInformation`] of the offending node when
/// one is derivable, so diagnostics stay source-locatable across rewrite
/// passes (spec.md §7, "All errors carry debug information").
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    /// Malformed surface syntax. This crate consumes an already-parsed
    /// `frontend::ast::Module`, so this variant exists for the taxonomy's
    /// sake (spec.md §7) and for callers that embed their own parser ahead
    /// of this pipeline and want one error type to report through.
    #[error("parse error: {message} at {debug_information}")]
    Parse {
        message: String,
        debug_information: DebugInformation,
    },

    /// Unresolved identifier or module alias.
    #[error("unresolved name `{name}` at {debug_information}")]
    Name {
        name: String,
        debug_information: DebugInformation,
    },

    /// Unsolvable equation, mismatched arity, or circular type inference.
    #[error("type error: {message} at {debug_information}")]
    Type {
        message: String,
        debug_information: DebugInformation,
    },

    /// Invariant violation: recursive value bind, missing default
    /// alternative where required, duplicate top-level name, free-variable
    /// mismatch, and so on.
    #[error("structural error: {message} at {debug_information}")]
    Structural {
        message: String,
        debug_information: DebugInformation,
    },

    /// Reaching a branch that should be unreachable once desugaring and
    /// inference have run (e.g. a literal surviving past `lift_literals`).
    /// Per spec.md §7 this kind aborts; the library surfaces it as an error
    /// rather than panicking so callers can still report it uniformly, but
    /// `debug_assert!`-guarded callers may choose to `unwrap`/log-and-abort.
    #[error("internal compiler error: {message}")]
    Internal { message: String },
}

impl CompileError {
    #[must_use]
    pub fn parse(message: impl Into<String>, debug_information: DebugInformation) -> Self {
        Self::Parse {
            message: message.into(),
            debug_information,
        }
    }

    #[must_use]
    pub fn name(name: impl Into<String>, debug_information: DebugInformation) -> Self {
        Self::Name {
            name: name.into(),
            debug_information,
        }
    }

    #[must_use]
    pub fn ty(message: impl Into<String>, debug_information: DebugInformation) -> Self {
        Self::Type {
            message: message.into(),
            debug_information,
        }
    }

    #[must_use]
    pub fn structural(message: impl Into<String>, debug_information: DebugInformation) -> Self {
        Self::Structural {
            message: message.into(),
            debug_information,
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the pipeline stages.
pub type CompileResult<T> = Result<T, CompileError>;

//! Core validator (spec.md §4.5): three ordered checks run once Core
//! translation has produced a full module, before canonicalisation.
//!
//! Grounded on `original_source/command/core/compile/type_checker.go` and
//! `original_source/command/core/ast/lambda_test.go`'s free-variable
//! fixtures.

mod free_variables;
mod recursive_binds;
mod tcheck;

use crate::core::ast::Module;
use crate::error::CompileResult;

/// Runs the free-variable closure check, then recursive-bind rejection,
/// then the second-pass type check, in that order (spec.md §4.5).
pub fn validate(module: &Module) -> CompileResult<()> {
    free_variables::check(module)?;
    recursive_binds::check(module)?;
    tcheck::check(module)?;
    Ok(())
}

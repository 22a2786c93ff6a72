//! Desugaring, type inference and STG-style Core-IR translation for a small
//! lazy functional language (spec.md §1-§4).
//!
//! The pipeline stages (`middleend::desugar`, `middleend::infer`,
//! `core::translate`, `core::validate`, `core::canonicalize`) each return
//! [`error::CompileResult`]; [`compile_module`] is the public boundary and
//! re-exposes the first failure through `anyhow::Result`, matching the
//! teacher's split between a structured internal error type and
//! `anyhow::Result` at subsystem edges (see `error` module doc).

pub mod core;
pub mod debug;
pub mod error;
pub mod frontend;
pub mod middleend;

use anyhow::Context;
use tracing::instrument;

use frontend::ast::Module as SurfaceModule;
use frontend::module_metadata::ModuleMetadata;

/// Knobs a caller can set for one compilation (spec.md §6, external
/// interfaces). Currently only toggles whether canonicalisation runs, so
/// callers that only need a validated (but not yet order-stable) Core
/// module for inspection can skip it; a full compile-to-codegen pipeline
/// should leave this at its default.
#[derive(Debug, Clone, Copy)]
pub struct CompilerOptions {
    pub canonicalize: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self { canonicalize: true }
    }
}

/// Runs the full pipeline over one already-parsed surface module: desugar,
/// infer, translate, validate, and (unless disabled) canonicalise.
///
/// `imports` supplies the declared types of every name this module imports
/// (spec.md §4.3, "Cross-module imports"); pass [`ModuleMetadata::new`] for
/// a module with no imports.
#[instrument(skip_all, fields(module = %module.name))]
pub fn compile_module(
    module: SurfaceModule,
    imports: &ModuleMetadata,
    options: CompilerOptions,
) -> anyhow::Result<core::ast::Module> {
    tracing::debug!(binds = module.binds.len(), "desugaring surface module");
    let desugared = middleend::desugar::desugar(module);

    tracing::debug!("running type inference");
    let typed = middleend::infer::infer(desugared, imports).context("type inference failed")?;

    tracing::debug!("translating to Core IR");
    let core_module = core::translate::translate_module(typed).context("Core translation failed")?;

    tracing::debug!(binds = core_module.binds.len(), "validating Core module");
    core::validate::validate(&core_module).context("Core validation failed")?;

    if options.canonicalize {
        tracing::debug!("canonicalising Core module");
        return core::canonicalize::canonicalize(core_module).context("canonicalisation failed");
    }

    Ok(core_module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::{Bind, Expression};
    use crate::frontend::types::Type;

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn empty_module_compiles_to_an_empty_core_module() {
        let module = SurfaceModule::new("Main", vec![], vec![], vec![]);
        let compiled = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default()).unwrap();
        assert!(compiled.binds.is_empty());
    }

    #[test]
    fn identity_function_compiles_and_validates() {
        let module = SurfaceModule::new(
            "Main",
            vec![],
            vec![],
            vec![Bind::new(
                "f",
                Type::function(Type::Number(d()), Type::Number(d()), d()),
                Expression::Lambda(vec!["x".into()], Box::new(Expression::variable("x", d())), d()),
            )],
        );
        let compiled = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default()).unwrap();
        assert_eq!(compiled.binds.len(), 1);
        assert_eq!(compiled.binds[0].name, "f");
        assert!(!compiled.binds[0].lambda.updatable);
    }

    #[test]
    fn unresolved_name_fails_compilation() {
        let module = SurfaceModule::new(
            "Main",
            vec![],
            vec![],
            vec![Bind::new("x", Type::Unknown(d()), Expression::variable("y", d()))],
        );
        assert!(compile_module(module, &ModuleMetadata::new(), CompilerOptions::default()).is_err());
    }
}

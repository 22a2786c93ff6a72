//! Check 2 (spec.md §4.5): a value bind is an updatable thunk; if its body
//! references its own name, directly or through nested `let`-bindings,
//! forcing it would black-hole immediately, so it is rejected rather than
//! translated into a self-referential closure.
//!
//! A nested value bind's own name can end up listed in its *own*
//! `free_variables` (translation resolves a `let` group's sibling names
//! before translating any of their bodies, so a self-reference looks like
//! any other free variable at that point). That is itself the rejection
//! condition, not a reason to skip the check — so this walks every nested
//! lambda the way `free_variables::check`'s `walk_lambdas` does, rather than
//! only the module's top-level binds.

use crate::core::ast::{Expression, Lambda, Module};
use crate::debug::DebugInformation;
use crate::error::{CompileError, CompileResult};

pub fn check(module: &Module) -> CompileResult<()> {
    for bind in &module.binds {
        check_lambda(&bind.name, &bind.lambda)?;
        walk_lambdas(&bind.lambda.body, &mut check_lambda)?;
    }
    Ok(())
}

fn check_lambda(name: &str, lambda: &Lambda) -> CompileResult<()> {
    if lambda.updatable && lambda.is_thunk() && lambda.body.referenced_names().iter().any(|n| n == name) {
        return Err(CompileError::structural(
            format!("value bind `{name}` recursively references itself"),
            DebugInformation::synthetic(),
        ));
    }
    Ok(())
}

/// Visits every lambda nested (via `let`) inside `expression`, calling `f`
/// with the bind name it belongs to.
fn walk_lambdas(
    expression: &Expression,
    f: &mut impl FnMut(&str, &Lambda) -> CompileResult<()>,
) -> CompileResult<()> {
    match expression {
        Expression::Atom(_) | Expression::FunctionApplication(..) | Expression::ConstructorApplication(..) => Ok(()),
        Expression::Let(binds, body) => {
            for bind in binds {
                f(&bind.name, &bind.lambda)?;
                walk_lambdas(&bind.lambda.body, f)?;
            }
            walk_lambdas(body, f)
        }
        Expression::PrimitiveCase(scrutinee, _, alternatives, default) => {
            walk_lambdas(scrutinee, f)?;
            for alternative in alternatives {
                walk_lambdas(&alternative.expression, f)?;
            }
            if let Some(default) = default {
                walk_lambdas(&default.expression, f)?;
            }
            Ok(())
        }
        Expression::AlgebraicCase(scrutinee, _, alternatives, default) => {
            walk_lambdas(scrutinee, f)?;
            for alternative in alternatives {
                walk_lambdas(&alternative.expression, f)?;
            }
            if let Some(default) = default {
                walk_lambdas(&default.expression, f)?;
            }
            Ok(())
        }
        Expression::PrimitiveOperation(..) => Ok(()),
    }
}

//! Check 1 (spec.md §4.5): every lambda's declared free-variable list must
//! match the names its body actually references, once its own arguments,
//! locally-bound names, and every top-level module name are excluded.

use std::collections::HashSet;

use crate::core::ast::{lambda_referenced_names, Expression, Lambda, Module};
use crate::error::{CompileError, CompileResult};
use crate::debug::DebugInformation;

pub fn check(module: &Module) -> CompileResult<()> {
    let top_level_names: HashSet<&str> = module.binds.iter().map(|b| b.name.as_str()).collect();

    for bind in &module.binds {
        check_lambda(&bind.name, &bind.lambda, &top_level_names)?;
        walk_lambdas(&bind.lambda.body, &mut |name, lambda| {
            check_lambda(name, lambda, &top_level_names)
        })?;
    }
    Ok(())
}

fn check_lambda(name: &str, lambda: &Lambda, top_level_names: &HashSet<&str>) -> CompileResult<()> {
    let mut actual: Vec<String> = lambda_referenced_names(lambda)
        .into_iter()
        .filter(|n| !top_level_names.contains(n.as_str()))
        .collect();
    actual.sort();
    actual.dedup();

    let mut declared: Vec<String> = lambda.free_variables.iter().map(|a| a.name.clone()).collect();
    declared.sort();
    declared.dedup();

    if actual != declared {
        return Err(CompileError::structural(
            format!(
                "bind `{name}` declares free variables {declared:?} but its body references {actual:?}"
            ),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ast::{Argument, Bind};
    use crate::core::types::CoreType;

    fn thunk(free_variables: Vec<Argument>, body: Expression) -> Lambda {
        Lambda::new(free_variables, true, vec![], body, CoreType::Float64)
    }

    #[test]
    fn matching_free_variable_list_passes() {
        let module = Module::new(
            vec![],
            vec![Bind::new(
                "f",
                thunk(
                    vec![Argument::new("x", CoreType::Float64)],
                    Expression::variable("x", CoreType::Float64),
                ),
            )],
        );
        assert!(check(&module).is_ok());
    }

    #[test]
    fn missing_free_variable_is_rejected() {
        let module = Module::new(
            vec![],
            vec![Bind::new("f", thunk(vec![], Expression::variable("x", CoreType::Float64)))],
        );
        assert!(check(&module).is_err());
    }
}

//! Hindley–Milner-style type inference over a desugared surface module
//! (spec.md §4.3): collection assigns fresh variables to every `Unknown`
//! position and emits equations; solving substitutes to a fixed point and
//! the result is written back onto the AST so that no `Unknown` survives.

mod collect;

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::frontend::ast::{Alternative, Bind, DefaultAlternative, Expression, ListArgument, Module};
use crate::frontend::module_metadata::ModuleMetadata;
use crate::frontend::types::{Equation, Substitution, Type, VariableGenerator};

use collect::{collect, Environment};

/// Infers and writes back concrete types for every bind in `module`,
/// seeding the initial environment with `imports`' exported declared types
/// keyed by `<alias>.<name>` (spec.md §4.3, "Cross-module imports").
pub fn infer(module: Module, imports: &ModuleMetadata) -> CompileResult<Module> {
    let mut generator = VariableGenerator::new();
    let mut equations = Vec::new();
    let mut environment: Environment = HashMap::new();

    for (key, ty) in imports.iter() {
        environment.insert(key.clone(), ty.clone());
    }

    let mut bind_types = Vec::with_capacity(module.binds.len());
    for bind in &module.binds {
        let ty = if bind.declared_type.is_unknown() {
            generator.fresh(bind.declared_type.debug_information().clone())
        } else {
            bind.declared_type.clone()
        };
        environment.insert(bind.name.clone(), ty.clone());
        bind_types.push(ty);
    }

    for (bind, ty) in module.binds.iter().zip(&bind_types) {
        let inferred = collect(&bind.expression, &environment, &mut generator, &mut equations)?;
        equations.push(Equation::new(ty.clone(), inferred));
    }

    let substitution = Substitution::solve(equations)?;

    let binds = module
        .binds
        .into_iter()
        .zip(bind_types)
        .map(|(bind, ty)| {
            let resolved = resolve(&substitution, &ty)?;
            let expression = apply(&substitution, bind.expression)?;
            Ok(Bind::new(bind.name, resolved, expression))
        })
        .collect::<CompileResult<Vec<_>>>()?;

    Ok(Module::new(module.name, module.exports, module.imports, binds))
}

fn resolve(substitution: &Substitution, ty: &Type) -> CompileResult<Type> {
    let resolved = substitution.apply(ty);
    if !substitution.is_fully_resolved(&resolved) {
        return Err(CompileError::ty(
            format!("type {resolved:?} did not resolve to a concrete type"),
            resolved.debug_information().clone(),
        ));
    }
    Ok(resolved)
}

fn apply(substitution: &Substitution, expression: Expression) -> CompileResult<Expression> {
    match expression {
        Expression::Number(..) | Expression::Variable(..) => Ok(expression),
        Expression::Unboxed(inner, debug) => Ok(Expression::Unboxed(Box::new(apply(substitution, *inner)?), debug)),
        Expression::Application(function, arguments, debug) => Ok(Expression::Application(
            Box::new(apply(substitution, *function)?),
            arguments
                .into_iter()
                .map(|a| apply(substitution, a))
                .collect::<CompileResult<Vec<_>>>()?,
            debug,
        )),
        Expression::Lambda(parameters, body, debug) => {
            Ok(Expression::Lambda(parameters, Box::new(apply(substitution, *body)?), debug))
        }
        Expression::BinaryOperation(operator, left, right, debug) => Ok(Expression::BinaryOperation(
            operator,
            Box::new(apply(substitution, *left)?),
            Box::new(apply(substitution, *right)?),
            debug,
        )),
        Expression::Let(binds, body, debug) => {
            let binds = binds
                .into_iter()
                .map(|b| -> CompileResult<Bind> {
                    let declared_type = resolve(substitution, &b.declared_type)?;
                    Ok(Bind::new(b.name, declared_type, apply(substitution, b.expression)?))
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(Expression::Let(binds, Box::new(apply(substitution, *body)?), debug))
        }
        Expression::List(element_type, arguments, debug) => {
            let element_type = resolve(substitution, &element_type)?;
            let arguments = arguments
                .into_iter()
                .map(|a| -> CompileResult<ListArgument> {
                    Ok(ListArgument {
                        expression: apply(substitution, a.expression)?,
                        expanded: a.expanded,
                    })
                })
                .collect::<CompileResult<Vec<_>>>()?;
            Ok(Expression::List(element_type, arguments, debug))
        }
        Expression::Case(scrutinee, result_type, alternatives, default, debug) => {
            let scrutinee = apply(substitution, *scrutinee)?;
            let result_type = resolve(substitution, &result_type)?;
            let alternatives = alternatives
                .into_iter()
                .map(|a| -> CompileResult<Alternative> {
                    let pattern = match a.pattern {
                        Expression::List(element_type, elements, debug) => {
                            let element_type = resolve(substitution, &element_type)?;
                            Expression::List(element_type, elements, debug)
                        }
                        other => other,
                    };
                    Ok(Alternative::new(pattern, apply(substitution, a.expression)?))
                })
                .collect::<CompileResult<Vec<_>>>()?;
            let default = default
                .map(|d| -> CompileResult<Box<DefaultAlternative>> {
                    Ok(Box::new(DefaultAlternative::new(d.variable, apply(substitution, d.expression)?)))
                })
                .transpose()?;
            Ok(Expression::Case(Box::new(scrutinee), result_type, alternatives, default, debug))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::Import;

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn identity_function_infers_its_declared_argument_type() {
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "f",
                Type::function(Type::Number(d()), Type::Number(d()), d()),
                Expression::Lambda(vec!["x".into()], Box::new(Expression::variable("x", d())), d()),
            )],
        );
        let inferred = infer(module, &ModuleMetadata::new()).unwrap();
        assert_eq!(
            inferred.binds[0].declared_type,
            Type::function(Type::Number(d()), Type::Number(d()), d())
        );
    }

    #[test]
    fn unknown_let_bind_type_is_solved_from_its_expression() {
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Unknown(d()),
                Expression::Let(
                    vec![Bind::new("y", Type::Unknown(d()), Expression::Number(1.0, d()))],
                    Box::new(Expression::variable("y", d())),
                    d(),
                ),
            )],
        );
        let inferred = infer(module, &ModuleMetadata::new()).unwrap();
        assert_eq!(inferred.binds[0].declared_type, Type::Number(d()));
    }

    #[test]
    fn unresolved_reference_is_a_name_error() {
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new("x", Type::Unknown(d()), Expression::variable("y", d()))],
        );
        assert!(infer(module, &ModuleMetadata::new()).is_err());
    }
}

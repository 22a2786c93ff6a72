//! Canonicaliser (spec.md §4.6): the last pipeline stage before a Core
//! module is handed to a code generator. Three passes, applied together in
//! one traversal: deterministic free-variable ordering, duplicate-bind
//! rejection, and on-demand α-conversion when a `let` would otherwise
//! shadow a name already bound in an enclosing scope.

use std::collections::{HashMap, HashSet};

use crate::core::ast::{
    AlgebraicAlternative, Argument, Atom, Bind, DefaultAlternative, Expression, Lambda, Module, PrimitiveAlternative,
};
use crate::debug::DebugInformation;
use crate::error::{CompileError, CompileResult};
use crate::frontend::names::NameGenerator;

pub fn canonicalize(module: Module) -> CompileResult<Module> {
    check_no_duplicate_names(&module.binds)?;

    let mut names = NameGenerator::new("");
    let top_level_bound: HashSet<String> = module.binds.iter().map(|b| b.name.clone()).collect();

    let binds = module
        .binds
        .into_iter()
        .map(|bind| -> CompileResult<Bind> {
            let lambda = canonicalize_lambda(bind.lambda, &top_level_bound, &mut names)?;
            Ok(Bind::new(bind.name, lambda))
        })
        .collect::<CompileResult<Vec<_>>>()?;

    Ok(Module::new(module.type_definitions, binds))
}

fn check_no_duplicate_names(binds: &[Bind]) -> CompileResult<()> {
    let mut seen = HashSet::new();
    for bind in binds {
        if !seen.insert(bind.name.as_str()) {
            return Err(CompileError::structural(
                format!("duplicate bind name `{}` in this scope", bind.name),
                DebugInformation::synthetic(),
            ));
        }
    }
    Ok(())
}

fn canonicalize_lambda(lambda: Lambda, outer_bound: &HashSet<String>, names: &mut NameGenerator) -> CompileResult<Lambda> {
    let free_variables = order_free_variables(&lambda);

    let mut bound = outer_bound.clone();
    for argument in &lambda.arguments {
        bound.insert(argument.name.clone());
    }
    for free in &free_variables {
        bound.insert(free.name.clone());
    }

    let body = canonicalize_expression(lambda.body, &bound, names)?;
    Ok(Lambda::new(free_variables, lambda.updatable, lambda.arguments, body, lambda.result_type))
}

/// Orders `lambda`'s declared free variables by first appearance in its
/// body (spec.md §4.6a); any free variable the body-traversal never
/// surfaces (shouldn't happen once the validator has run) is appended,
/// sorted by name, as the "ties" fallback.
fn order_free_variables(lambda: &Lambda) -> Vec<Argument> {
    let mut seen = HashSet::new();
    let mut first_appearance = Vec::new();
    for name in lambda.body.referenced_names() {
        if seen.insert(name.clone()) {
            first_appearance.push(name);
        }
    }

    let mut by_name: HashMap<String, Argument> =
        lambda.free_variables.iter().map(|a| (a.name.clone(), a.clone())).collect();

    let mut ordered = Vec::new();
    for name in first_appearance {
        if let Some(argument) = by_name.remove(&name) {
            ordered.push(argument);
        }
    }

    let mut leftover: Vec<Argument> = by_name.into_values().collect();
    leftover.sort_by(|a, b| a.name.cmp(&b.name));
    ordered.extend(leftover);
    ordered
}

fn canonicalize_expression(
    expression: Expression,
    bound: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<Expression> {
    match expression {
        Expression::Atom(_) | Expression::FunctionApplication(..) | Expression::ConstructorApplication(..) | Expression::PrimitiveOperation(..) => {
            Ok(expression)
        }

        Expression::Let(binds, body) => {
            check_no_duplicate_names(&binds)?;

            let mut renames: HashMap<String, String> = HashMap::new();
            let mut child_bound = bound.clone();
            let mut pending = Vec::with_capacity(binds.len());
            for bind in binds {
                let final_name = if bound.contains(&bind.name) {
                    let fresh = names.generate("alpha");
                    renames.insert(bind.name.clone(), fresh.clone());
                    fresh
                } else {
                    bind.name.clone()
                };
                child_bound.insert(final_name.clone());
                pending.push((final_name, bind.lambda));
            }

            let canonical_binds = pending
                .into_iter()
                .map(|(final_name, lambda)| -> CompileResult<Bind> {
                    let renamed_lambda = rename_lambda(lambda, &renames);
                    let canonical_lambda = canonicalize_lambda(renamed_lambda, &child_bound, names)?;
                    Ok(Bind::new(final_name, canonical_lambda))
                })
                .collect::<CompileResult<Vec<_>>>()?;

            let renamed_body = rename_expression(*body, &renames);
            let canonical_body = canonicalize_expression(renamed_body, &child_bound, names)?;
            Ok(Expression::Let(canonical_binds, Box::new(canonical_body)))
        }

        Expression::PrimitiveCase(scrutinee, ty, alternatives, default) => {
            let scrutinee = Box::new(canonicalize_expression(*scrutinee, bound, names)?);
            let alternatives = alternatives
                .into_iter()
                .map(|a| -> CompileResult<PrimitiveAlternative> {
                    Ok(PrimitiveAlternative {
                        literal: a.literal,
                        expression: canonicalize_expression(a.expression, bound, names)?,
                    })
                })
                .collect::<CompileResult<Vec<_>>>()?;
            let default = default
                .map(|d| -> CompileResult<Box<DefaultAlternative>> {
                    let mut child_bound = bound.clone();
                    if !d.variable.is_empty() {
                        child_bound.insert(d.variable.clone());
                    }
                    Ok(Box::new(DefaultAlternative {
                        variable: d.variable,
                        expression: canonicalize_expression(d.expression, &child_bound, names)?,
                    }))
                })
                .transpose()?;
            Ok(Expression::PrimitiveCase(scrutinee, ty, alternatives, default))
        }

        Expression::AlgebraicCase(scrutinee, ty, alternatives, default) => {
            let scrutinee = Box::new(canonicalize_expression(*scrutinee, bound, names)?);
            let alternatives = alternatives
                .into_iter()
                .map(|a| -> CompileResult<AlgebraicAlternative> {
                    let mut child_bound = bound.clone();
                    for element_name in &a.element_names {
                        child_bound.insert(element_name.clone());
                    }
                    Ok(AlgebraicAlternative {
                        constructor: a.constructor,
                        element_names: a.element_names,
                        expression: canonicalize_expression(a.expression, &child_bound, names)?,
                    })
                })
                .collect::<CompileResult<Vec<_>>>()?;
            let default = default
                .map(|d| -> CompileResult<Box<DefaultAlternative>> {
                    let mut child_bound = bound.clone();
                    if !d.variable.is_empty() {
                        child_bound.insert(d.variable.clone());
                    }
                    Ok(Box::new(DefaultAlternative {
                        variable: d.variable,
                        expression: canonicalize_expression(d.expression, &child_bound, names)?,
                    }))
                })
                .transpose()?;
            Ok(Expression::AlgebraicCase(scrutinee, ty, alternatives, default))
        }
    }
}

fn rename_expression(expression: Expression, renames: &HashMap<String, String>) -> Expression {
    if renames.is_empty() {
        return expression;
    }
    match expression {
        Expression::Atom(atom) => Expression::Atom(rename_atom(atom, renames)),
        Expression::FunctionApplication(callee, arguments) => Expression::FunctionApplication(
            renamed(&callee, renames),
            arguments.into_iter().map(|a| rename_atom(a, renames)).collect(),
        ),
        Expression::ConstructorApplication(constructor, arguments) => {
            Expression::ConstructorApplication(constructor, arguments.into_iter().map(|a| rename_atom(a, renames)).collect())
        }
        Expression::Let(binds, body) => Expression::Let(
            binds
                .into_iter()
                .map(|b| Bind::new(b.name, rename_lambda(b.lambda, renames)))
                .collect(),
            Box::new(rename_expression(*body, renames)),
        ),
        Expression::PrimitiveCase(scrutinee, ty, alternatives, default) => Expression::PrimitiveCase(
            Box::new(rename_expression(*scrutinee, renames)),
            ty,
            alternatives
                .into_iter()
                .map(|a| PrimitiveAlternative {
                    literal: a.literal,
                    expression: rename_expression(a.expression, renames),
                })
                .collect(),
            default.map(|d| {
                Box::new(DefaultAlternative {
                    variable: d.variable,
                    expression: rename_expression(d.expression, renames),
                })
            }),
        ),
        Expression::AlgebraicCase(scrutinee, ty, alternatives, default) => Expression::AlgebraicCase(
            Box::new(rename_expression(*scrutinee, renames)),
            ty,
            alternatives
                .into_iter()
                .map(|a| AlgebraicAlternative {
                    constructor: a.constructor,
                    element_names: a.element_names,
                    expression: rename_expression(a.expression, renames),
                })
                .collect(),
            default.map(|d| {
                Box::new(DefaultAlternative {
                    variable: d.variable,
                    expression: rename_expression(d.expression, renames),
                })
            }),
        ),
        Expression::PrimitiveOperation(operator, operands) => {
            Expression::PrimitiveOperation(operator, operands.into_iter().map(|a| rename_atom(a, renames)).collect())
        }
    }
}

fn rename_atom(atom: Atom, renames: &HashMap<String, String>) -> Atom {
    match atom {
        Atom::Variable(name, ty) => Atom::Variable(renamed(&name, renames), ty),
        other => other,
    }
}

fn rename_lambda(lambda: Lambda, renames: &HashMap<String, String>) -> Lambda {
    Lambda::new(
        lambda
            .free_variables
            .into_iter()
            .map(|a| Argument::new(renamed(&a.name, renames), a.ty))
            .collect(),
        lambda.updatable,
        lambda.arguments,
        rename_expression(lambda.body, renames),
        lambda.result_type,
    )
}

fn renamed(name: &str, renames: &HashMap<String, String>) -> String {
    renames.get(name).cloned().unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CoreType;

    #[test]
    fn duplicate_top_level_names_are_rejected() {
        let thunk = |body| Lambda::new(vec![], true, vec![], body, CoreType::Float64);
        let module = Module::new(
            vec![],
            vec![
                Bind::new("x", thunk(Expression::float64(1.0))),
                Bind::new("x", thunk(Expression::float64(2.0))),
            ],
        );
        assert!(canonicalize(module).is_err());
    }

    #[test]
    fn free_variables_are_ordered_by_first_appearance() {
        let body = Expression::PrimitiveOperation(
            crate::core::ast::PrimitiveOperator::AddFloat64,
            vec![
                Atom::Variable("b".to_string(), CoreType::Float64),
                Atom::Variable("a".to_string(), CoreType::Float64),
            ],
        );
        let lambda = Lambda::new(
            vec![Argument::new("a", CoreType::Float64), Argument::new("b", CoreType::Float64)],
            true,
            vec![],
            body,
            CoreType::Float64,
        );
        let module = Module::new(vec![], vec![Bind::new("x", lambda)]);
        let canonical = canonicalize(module).unwrap();
        let names: Vec<&str> = canonical.binds[0].lambda.free_variables.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn shadowing_let_bind_is_alpha_renamed() {
        let inner = Lambda::new(vec![], true, vec![], Expression::float64(1.0), CoreType::Float64);
        let body = Expression::Let(
            vec![Bind::new("x", inner)],
            Box::new(Expression::variable("x", CoreType::Float64)),
        );
        let outer_lambda = Lambda::new(
            vec![Argument::new("x", CoreType::Float64)],
            true,
            vec![],
            body,
            CoreType::Float64,
        );
        let module = Module::new(vec![], vec![Bind::new("outer", outer_lambda)]);
        let canonical = canonicalize(module).unwrap();
        let Expression::Let(binds, inner_body) = &canonical.binds[0].lambda.body else {
            panic!("expected a Let");
        };
        assert_ne!(binds[0].name, "x");
        assert_eq!(
            **inner_body,
            Expression::variable(binds[0].name.clone(), CoreType::Float64)
        );
    }
}

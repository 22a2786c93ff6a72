//! The equation-collection traversal (spec.md §4.3, "Collection"): walks a
//! desugared surface expression, assigning a fresh type variable to every
//! `Unknown` position it introduces and returning the type the expression
//! was inferred to have, plus the equations that type must satisfy.

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::frontend::ast::{Alternative, DefaultAlternative, Expression, ListArgument};
use crate::frontend::types::{Equation, Type, VariableGenerator};

pub type Environment = HashMap<String, Type>;

/// Infers `expression`'s type in `environment`, appending every equation
/// that type must satisfy to `equations`.
pub fn collect(
    expression: &Expression,
    environment: &Environment,
    generator: &mut VariableGenerator,
    equations: &mut Vec<Equation>,
) -> CompileResult<Type> {
    match expression {
        Expression::Number(_, debug) => Ok(Type::Number(debug.clone())),

        Expression::Variable(name, debug) => environment
            .get(&name.environment_key())
            .cloned()
            .ok_or_else(|| CompileError::name(name.environment_key(), debug.clone())),

        Expression::Unboxed(inner, debug) => {
            let inner_ty = collect(inner, environment, generator, equations)?;
            Ok(Type::Unboxed(Box::new(inner_ty), debug.clone()))
        }

        Expression::Application(function, arguments, debug) => {
            let function_ty = collect(function, environment, generator, equations)?;
            let argument_types = arguments
                .iter()
                .map(|a| collect(a, environment, generator, equations))
                .collect::<CompileResult<Vec<_>>>()?;
            let result_ty = generator.fresh(debug.clone());
            let expected_function_ty = argument_types
                .into_iter()
                .rev()
                .fold(result_ty.clone(), |acc, arg_ty| Type::function(arg_ty, acc, debug.clone()));
            equations.push(Equation::new(function_ty, expected_function_ty));
            Ok(result_ty)
        }

        Expression::Lambda(parameters, body, debug) => {
            let mut child = environment.clone();
            let parameter_types: Vec<Type> = parameters
                .iter()
                .map(|_| generator.fresh(debug.clone()))
                .collect();
            for (name, ty) in parameters.iter().zip(&parameter_types) {
                child.insert(name.clone(), ty.clone());
            }
            let body_ty = collect(body, &child, generator, equations)?;
            Ok(parameter_types
                .into_iter()
                .rev()
                .fold(body_ty, |acc, param_ty| Type::function(param_ty, acc, debug.clone())))
        }

        Expression::Let(binds, body, _) => {
            let mut child = environment.clone();
            let mut bind_types = Vec::with_capacity(binds.len());
            for bind in binds {
                let ty = if bind.declared_type.is_unknown() {
                    generator.fresh(bind.declared_type.debug_information().clone())
                } else {
                    bind.declared_type.clone()
                };
                child.insert(bind.name.clone(), ty.clone());
                bind_types.push(ty);
            }
            for (bind, ty) in binds.iter().zip(&bind_types) {
                let inferred = collect(&bind.expression, &child, generator, equations)?;
                equations.push(Equation::new(ty.clone(), inferred));
            }
            collect(body, &child, generator, equations)
        }

        Expression::Case(scrutinee, result_type, alternatives, default, debug) => {
            let scrutinee_ty = collect(scrutinee, environment, generator, equations)?;
            let result_ty = if result_type.is_unknown() {
                generator.fresh(debug.clone())
            } else {
                result_type.clone()
            };

            for alternative in alternatives {
                collect_alternative(alternative, &scrutinee_ty, &result_ty, environment, generator, equations)?;
            }

            if let Some(default) = default {
                collect_default(default, &scrutinee_ty, &result_ty, environment, generator, equations)?;
            }

            Ok(result_ty)
        }

        Expression::BinaryOperation(_, left, right, debug) => {
            let left_ty = collect(left, environment, generator, equations)?;
            let right_ty = collect(right, environment, generator, equations)?;
            equations.push(Equation::new(left_ty, Type::Number(debug.clone())));
            equations.push(Equation::new(right_ty, Type::Number(debug.clone())));
            Ok(Type::Number(debug.clone()))
        }

        Expression::List(element_type, arguments, debug) => {
            let element_type = if element_type.is_unknown() {
                generator.fresh(debug.clone())
            } else {
                element_type.clone()
            };
            for argument in arguments {
                let argument_ty = collect(&argument.expression, environment, generator, equations)?;
                let expected = if argument.expanded {
                    Type::list(element_type.clone(), debug.clone())
                } else {
                    element_type.clone()
                };
                equations.push(Equation::new(argument_ty, expected));
            }
            Ok(Type::list(element_type, debug.clone()))
        }
    }
}

fn collect_alternative(
    alternative: &Alternative,
    scrutinee_ty: &Type,
    result_ty: &Type,
    environment: &Environment,
    generator: &mut VariableGenerator,
    equations: &mut Vec<Equation>,
) -> CompileResult<()> {
    match &alternative.pattern {
        Expression::Number(_, debug) => {
            equations.push(Equation::new(scrutinee_ty.clone(), Type::Number(debug.clone())));
            let expr_ty = collect(&alternative.expression, environment, generator, equations)?;
            equations.push(Equation::new(expr_ty, result_ty.clone()));
            Ok(())
        }
        Expression::List(element_type, elements, debug) => {
            let element_type = if element_type.is_unknown() {
                generator.fresh(debug.clone())
            } else {
                element_type.clone()
            };
            equations.push(Equation::new(scrutinee_ty.clone(), Type::list(element_type.clone(), debug.clone())));

            let mut child = environment.clone();
            for ListArgument { expression, expanded } in elements {
                if let Expression::Variable(name, _) = expression {
                    let ty = if *expanded {
                        Type::list(element_type.clone(), debug.clone())
                    } else {
                        element_type.clone()
                    };
                    child.insert(name.environment_key(), ty);
                }
            }

            let expr_ty = collect(&alternative.expression, &child, generator, equations)?;
            equations.push(Equation::new(expr_ty, result_ty.clone()));
            Ok(())
        }
        _ => unreachable!("alternative patterns are restricted to Number or List"),
    }
}

fn collect_default(
    default: &DefaultAlternative,
    scrutinee_ty: &Type,
    result_ty: &Type,
    environment: &Environment,
    generator: &mut VariableGenerator,
    equations: &mut Vec<Equation>,
) -> CompileResult<()> {
    let mut child = environment.clone();
    if !default.variable.is_empty() {
        child.insert(default.variable.clone(), scrutinee_ty.clone());
    }
    let expr_ty = collect(&default.expression, &child, generator, equations)?;
    equations.push(Equation::new(expr_ty, result_ty.clone()));
    Ok(())
}

//! Surface → Core translation (spec.md §4.4): each surface bind becomes one
//! or more top-level Core binds, with lambdas, applications, cases and
//! binary operations mapped to their STG-style Core forms.
//!
//! Grounded on `original_source/command/core/compile/{compile,module_generator}.go`
//! and `original_source/command/core/ast/{lambda,let,function_application}.go`
//! for the updatable-thunk-vs-function-closure split and the "callee is
//! always a variable" invariant.

use std::collections::{HashMap, HashSet};

use crate::core::ast as core;
use crate::core::builtins::{cons_constructor, nil_constructor, number_constructor};
use crate::core::types::CoreType;
use crate::debug::DebugInformation;
use crate::error::{CompileError, CompileResult};
use crate::frontend::ast as surface;
use crate::frontend::names::NameGenerator;
use crate::frontend::types::Type;

type Environment = HashMap<String, CoreType>;

/// Translates a fully desugared, fully typed surface module into a Core
/// module (spec.md §4.4).
pub fn translate_module(module: surface::Module) -> CompileResult<core::Module> {
    let mut environment: Environment = HashMap::new();
    let top_level_names: HashSet<String> = module.binds.iter().map(|b| b.name.clone()).collect();

    for bind in &module.binds {
        environment.insert(bind.name.clone(), bind_signature(bind)?);
    }

    let mut names = NameGenerator::new(module.name.clone());
    let binds = module
        .binds
        .into_iter()
        .map(|bind| translate_bind(bind, &environment, &top_level_names, &mut names))
        .collect::<CompileResult<Vec<_>>>()?;

    Ok(core::Module::new(Vec::new(), binds))
}

/// The Core type a bind's own name resolves to wherever it is referenced
/// (spec.md §4.4): `Boxed(<T>)` for a value bind, a `Function` type for a
/// function bind.
fn bind_signature(bind: &surface::Bind) -> CompileResult<CoreType> {
    if bind.is_function() {
        let surface::Expression::Lambda(parameters, _, debug) = &bind.expression else {
            unreachable!("is_function() guarantees a Lambda expression");
        };
        let parameter_surface_types = function_parameter_types(&bind.declared_type, parameters.len(), debug)?;
        let result_surface_type = function_result_type(&bind.declared_type, parameters.len(), debug)?;
        let argument_types = parameter_surface_types
            .iter()
            .map(argument_core_type)
            .collect::<CompileResult<Vec<_>>>()?;
        Ok(CoreType::function(argument_types, argument_core_type(&result_surface_type)?))
    } else {
        Ok(CoreType::boxed(to_core_type(unwrap_unboxed(&bind.declared_type))?))
    }
}

fn unwrap_unboxed(ty: &Type) -> &Type {
    match ty {
        Type::Unboxed(inner, _) => inner,
        other => other,
    }
}

/// An argument or value-bind-result Core type: `Boxed(<T>)` unless the
/// surface type is itself declared `Unboxed` (spec.md §4.4).
fn argument_core_type(ty: &Type) -> CompileResult<CoreType> {
    match ty {
        Type::Unboxed(inner, _) => to_core_type(inner),
        other => Ok(CoreType::boxed(to_core_type(other)?)),
    }
}

fn to_core_type(ty: &Type) -> CompileResult<CoreType> {
    match ty {
        Type::Number(_) => Ok(CoreType::Float64),
        Type::Unboxed(inner, _) => to_core_type(inner),
        Type::List(element, _) => Ok(crate::core::builtins::list_algebraic(to_core_type(element)?)),
        Type::Function(argument, result, _) => Ok(CoreType::function(
            vec![argument_core_type(argument)?],
            argument_core_type(result)?,
        )),
        Type::Unknown(_) | Type::Variable(..) => {
            Err(CompileError::internal("encountered an unresolved type after inference"))
        }
    }
}

fn function_parameter_types(declared: &Type, arity: usize, debug: &DebugInformation) -> CompileResult<Vec<Type>> {
    let mut current = declared;
    let mut parameters = Vec::with_capacity(arity);
    for _ in 0..arity {
        match current {
            Type::Function(argument, result, _) => {
                parameters.push((**argument).clone());
                current = result;
            }
            _ => {
                return Err(CompileError::ty(
                    "function bind's declared type has fewer arrows than parameters",
                    debug.clone(),
                ))
            }
        }
    }
    Ok(parameters)
}

fn function_result_type(declared: &Type, arity: usize, debug: &DebugInformation) -> CompileResult<Type> {
    let mut current = declared.clone();
    for _ in 0..arity {
        match current {
            Type::Function(_, result, _) => current = *result,
            _ => {
                return Err(CompileError::ty(
                    "function bind's declared type has fewer arrows than parameters",
                    debug.clone(),
                ))
            }
        }
    }
    Ok(current)
}

fn translate_bind(
    bind: surface::Bind,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<core::Bind> {
    let lambda = translate_bind_lambda(&bind, environment, top_level_names, names)?;
    Ok(core::Bind::new(bind.name, lambda))
}

fn translate_bind_lambda(
    bind: &surface::Bind,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<core::Lambda> {
    if bind.is_function() {
        let surface::Expression::Lambda(parameters, body, debug) = &bind.expression else {
            unreachable!("is_function() guarantees a Lambda expression");
        };
        let parameter_surface_types = function_parameter_types(&bind.declared_type, parameters.len(), debug)?;
        let argument_types = parameter_surface_types
            .iter()
            .map(argument_core_type)
            .collect::<CompileResult<Vec<_>>>()?;
        let arguments: Vec<core::Argument> = parameters
            .iter()
            .cloned()
            .zip(argument_types)
            .map(|(name, ty)| core::Argument::new(name, ty))
            .collect();

        let mut body_env = environment.clone();
        for argument in &arguments {
            body_env.insert(argument.name.clone(), argument.ty.clone());
        }
        let (body_core, result_ty) = translate_expression(body, &body_env, top_level_names, names)?;

        let free_variables = free_variable_arguments(&body_core, &arguments, top_level_names, &body_env);
        Ok(core::Lambda::new(free_variables, false, arguments, body_core, result_ty))
    } else if let (Type::Unboxed(_, _), surface::Expression::Unboxed(inner, inner_debug)) =
        (&bind.declared_type, &bind.expression)
    {
        let surface::Expression::Number(value, _) = &**inner else {
            return Err(CompileError::internal("Unboxed bind body must be a Number literal after lift_literals"));
        };
        let body = core::Expression::ConstructorApplication(number_constructor(), vec![core::Atom::Float64(*value)]);
        let _ = inner_debug;
        Ok(core::Lambda::new(vec![], true, vec![], body, crate::core::builtins::boxed_number()))
    } else {
        let (body_core, _) = translate_expression(&bind.expression, environment, top_level_names, names)?;
        let result_ty = bind_signature(bind)?;
        let free_variables = free_variable_arguments(&body_core, &[], top_level_names, environment);
        Ok(core::Lambda::new(free_variables, true, vec![], body_core, result_ty))
    }
}

fn free_variable_arguments(
    body: &core::Expression,
    arguments: &[core::Argument],
    top_level_names: &HashSet<String>,
    environment: &Environment,
) -> Vec<core::Argument> {
    let argument_names: HashSet<&str> = arguments.iter().map(|a| a.name.as_str()).collect();
    let mut seen = HashSet::new();
    let mut free = Vec::new();
    for name in body.referenced_names() {
        if argument_names.contains(name.as_str()) || top_level_names.contains(&name) || !seen.insert(name.clone()) {
            continue;
        }
        if let Some(ty) = environment.get(&name) {
            free.push(core::Argument::new(name, ty.clone()));
        }
    }
    free
}

fn translate_expression(
    expression: &surface::Expression,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    match expression {
        surface::Expression::Variable(name, _) => {
            let key = name.environment_key();
            let ty = environment
                .get(&key)
                .cloned()
                .ok_or_else(|| CompileError::internal(format!("no Core type recorded for `{key}`")))?;
            Ok((core::Expression::variable(key, ty.clone()), ty))
        }

        surface::Expression::Unboxed(inner, _) => match &**inner {
            surface::Expression::Number(value, _) => Ok((core::Expression::float64(*value), CoreType::Float64)),
            other => translate_expression(other, environment, top_level_names, names),
        },

        surface::Expression::Number(value, _) => Ok((core::Expression::float64(*value), CoreType::Float64)),

        surface::Expression::Application(function, arguments, debug) => {
            let (function_core, function_ty) = translate_expression(function, environment, top_level_names, names)?;
            let callee = match function_core {
                core::Expression::Atom(core::Atom::Variable(name, _)) => name,
                _ => {
                    return Err(CompileError::internal(
                        "application callee did not translate to a variable atom",
                    ))
                }
            };
            let CoreType::Function(_, result_ty) = function_ty else {
                return Err(CompileError::ty(
                    format!("`{callee}` is applied but its type is not a function"),
                    debug.clone(),
                ));
            };
            let atoms = arguments
                .iter()
                .map(|a| translate_atom(a, environment))
                .collect::<CompileResult<Vec<_>>>()?;
            Ok((core::Expression::FunctionApplication(callee, atoms), *result_ty))
        }

        surface::Expression::Lambda(..) => Err(CompileError::internal(
            "a Lambda may only appear as a bind's own top-level expression after desugaring",
        )),

        surface::Expression::Let(binds, body, _) => {
            let mut child_env = environment.clone();
            let mut core_binds = Vec::with_capacity(binds.len());
            for bind in binds {
                let signature = bind_signature(bind)?;
                child_env.insert(bind.name.clone(), signature);
            }
            for bind in binds {
                let lambda = translate_bind_lambda(bind, &child_env, top_level_names, names)?;
                core_binds.push(core::Bind::new(bind.name.clone(), lambda));
            }
            let (body_core, body_ty) = translate_expression(body, &child_env, top_level_names, names)?;
            Ok((core::Expression::Let(core_binds, Box::new(body_core)), body_ty))
        }

        surface::Expression::BinaryOperation(operator, left, right, debug) => {
            translate_binary_operation(*operator, left, right, debug, environment, top_level_names, names)
        }

        surface::Expression::List(element_type, arguments, debug) => {
            translate_list_literal(element_type, arguments, debug, environment, top_level_names, names)
        }

        surface::Expression::Case(scrutinee, result_type, alternatives, default, debug) => {
            translate_case(scrutinee, result_type, alternatives, default, debug, environment, top_level_names, names)
        }
    }
}

fn translate_atom(expression: &surface::Expression, environment: &Environment) -> CompileResult<core::Atom> {
    match expression {
        surface::Expression::Variable(name, _) => {
            let key = name.environment_key();
            let ty = environment
                .get(&key)
                .cloned()
                .ok_or_else(|| CompileError::internal(format!("no Core type recorded for `{key}`")))?;
            Ok(core::Atom::Variable(key, ty))
        }
        surface::Expression::Unboxed(inner, _) => match &**inner {
            surface::Expression::Number(value, _) => Ok(core::Atom::Float64(*value)),
            _ => Err(CompileError::internal("only Number literals are ever Unboxed")),
        },
        surface::Expression::Number(value, _) => Ok(core::Atom::Float64(*value)),
        _ => Err(CompileError::internal("application argument is not atomic after desugaring")),
    }
}

fn translate_binary_operation(
    operator: surface::BinaryOperator,
    left: &surface::Expression,
    right: &surface::Expression,
    debug: &DebugInformation,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    let left_atom = translate_atom(left, environment)?;
    let right_atom = translate_atom(right, environment)?;
    let _ = (top_level_names, names);

    let left_name = NameGenerator::fixed("lhs");
    let right_name = NameGenerator::fixed("rhs");
    let result_name = NameGenerator::fixed("result");
    let boxed_result_name = NameGenerator::fixed("boxedResult");

    let operation = match operator {
        surface::BinaryOperator::Add => core::PrimitiveOperator::AddFloat64,
        surface::BinaryOperator::Subtract => core::PrimitiveOperator::SubtractFloat64,
        surface::BinaryOperator::Multiply => core::PrimitiveOperator::MultiplyFloat64,
        surface::BinaryOperator::Divide => core::PrimitiveOperator::DivideFloat64,
    };

    // Force each (boxed) operand to its Float64 payload via an algebraic
    // case on the number constructor, then apply the primitive operation
    // and rebox the result (spec.md §4.4, "Binary operation").
    let compute = core::Expression::PrimitiveOperation(
        operation,
        vec![core::Atom::Variable(left_name.clone(), CoreType::Float64), core::Atom::Variable(right_name.clone(), CoreType::Float64)],
    );
    let reboxed = core::Expression::Let(
        vec![core::Bind::new(
            boxed_result_name.clone(),
            core::Lambda::new(
                vec![core::Argument::new(result_name.clone(), CoreType::Float64)],
                true,
                vec![],
                core::Expression::ConstructorApplication(number_constructor(), vec![core::Atom::Variable(result_name.clone(), CoreType::Float64)]),
                crate::core::builtins::boxed_number(),
            ),
        )],
        Box::new(core::Expression::variable(boxed_result_name, crate::core::builtins::boxed_number())),
    );
    let with_result = core::Expression::PrimitiveCase(
        Box::new(compute),
        CoreType::Float64,
        vec![],
        Some(Box::new(core::DefaultAlternative { variable: result_name, expression: reboxed })),
    );

    let force_right = force_boxed_number(right_atom, &right_name, with_result);
    let force_left = force_boxed_number(left_atom, &left_name, force_right);
    let _ = debug;
    Ok((force_left, crate::core::builtins::boxed_number()))
}

/// `AlgebraicCase(atom, numberAlgebraic, [], Some(default(name, continuation)))`:
/// forces a boxed-number atom to its `Float64` payload (spec.md §4.4).
fn force_boxed_number(atom: core::Atom, bound_name: &str, continuation: core::Expression) -> core::Expression {
    core::Expression::AlgebraicCase(
        Box::new(core::Expression::Atom(atom)),
        crate::core::builtins::number_algebraic(),
        vec![core::AlgebraicAlternative {
            constructor: number_constructor(),
            element_names: vec![bound_name.to_string()],
            expression: continuation,
        }],
        None,
    )
}

fn translate_list_literal(
    element_type: &Type,
    arguments: &[surface::ListArgument],
    debug: &DebugInformation,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    let element_core_ty = argument_core_type(element_type)?;
    let list_ty = CoreType::boxed(crate::core::builtins::list_algebraic(to_core_type(element_type)?));
    let nil_name = NameGenerator::fixed("nil");
    let nil_bind = core::Bind::new(
        nil_name.clone(),
        core::Lambda::new(
            vec![],
            true,
            vec![],
            core::Expression::ConstructorApplication(nil_constructor(to_core_type(element_type)?), vec![]),
            list_ty.clone(),
        ),
    );

    let mut binds = vec![nil_bind];
    let mut tail_name = nil_name;

    for (index, argument) in arguments.iter().enumerate().rev() {
        let head_atom = translate_atom(&argument.expression, environment)?;
        let list_name = names.generate("list");
        binds.push(core::Bind::new(
            list_name.clone(),
            core::Lambda::new(
                vec![],
                true,
                vec![],
                core::Expression::ConstructorApplication(
                    cons_constructor(to_core_type(element_type)?),
                    vec![head_atom, core::Atom::Variable(tail_name.clone(), list_ty.clone())],
                ),
                list_ty.clone(),
            ),
        ));
        tail_name = list_name;
        let _ = index;
    }

    let _ = (element_core_ty, top_level_names, debug);
    Ok((core::Expression::Let(binds, Box::new(core::Expression::variable(tail_name, list_ty.clone()))), list_ty))
}

#[allow(clippy::too_many_arguments)]
fn translate_case(
    scrutinee: &surface::Expression,
    result_type: &Type,
    alternatives: &[surface::Alternative],
    default: &Option<Box<surface::DefaultAlternative>>,
    debug: &DebugInformation,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    let (scrutinee_core, scrutinee_ty) = translate_expression(scrutinee, environment, top_level_names, names)?;
    let result_core_ty = argument_core_type(result_type).or_else(|_| to_core_type(result_type))?;

    if scrutinee_ty.is_list_or_boxed_list() {
        translate_list_case(scrutinee_core, &scrutinee_ty, alternatives, default, &result_core_ty, environment, top_level_names, names)
    } else if scrutinee_ty.is_number_or_boxed_number() || alternatives.iter().all(|a| matches!(a.pattern, surface::Expression::Number(..))) {
        translate_number_case(scrutinee_core, &scrutinee_ty, alternatives, default, &result_core_ty, environment, top_level_names, names)
    } else {
        Err(CompileError::internal(format!(
            "case scrutinee at {debug} has neither number nor list shape"
        )))
    }
}

#[allow(clippy::too_many_arguments)]
fn translate_number_case(
    scrutinee_core: core::Expression,
    scrutinee_ty: &CoreType,
    alternatives: &[surface::Alternative],
    default: &Option<Box<surface::DefaultAlternative>>,
    result_core_ty: &CoreType,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    let primitive_alternatives = alternatives
        .iter()
        .map(|a| {
            let surface::Expression::Number(literal, _) = &a.pattern else {
                return Err(CompileError::internal("number case alternative pattern is not Number"));
            };
            let (expression, _) = translate_expression(&a.expression, environment, top_level_names, names)?;
            Ok(core::PrimitiveAlternative { literal: *literal, expression })
        })
        .collect::<CompileResult<Vec<_>>>()?;

    let core_default = translate_default(default, environment, top_level_names, names, CoreType::Float64)?;

    let scrutinee_atom = match scrutinee_core {
        core::Expression::Atom(atom) => atom,
        other => return Err(CompileError::internal(format!("non-atomic number case scrutinee: {other:?}"))),
    };

    let primitive_case = core::Expression::PrimitiveCase(
        Box::new(core::Expression::Atom(if scrutinee_ty.is_primitive() {
            scrutinee_atom.clone()
        } else {
            core::Atom::Variable("$forced".to_string(), CoreType::Float64)
        })),
        CoreType::Float64,
        primitive_alternatives,
        core_default,
    );

    let expression = if scrutinee_ty.is_primitive() {
        primitive_case
    } else {
        force_boxed_number(scrutinee_atom, "$forced", primitive_case)
    };
    Ok((expression, result_core_ty.clone()))
}

#[allow(clippy::too_many_arguments)]
fn translate_list_case(
    scrutinee_core: core::Expression,
    scrutinee_ty: &CoreType,
    alternatives: &[surface::Alternative],
    default: &Option<Box<surface::DefaultAlternative>>,
    result_core_ty: &CoreType,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
) -> CompileResult<(core::Expression, CoreType)> {
    let list_algebraic_ty = match scrutinee_ty {
        CoreType::Boxed(inner) => (**inner).clone(),
        other => other.clone(),
    };
    let element_ty = match &list_algebraic_ty {
        CoreType::Algebraic(cs) => match &cs[1].elements[0] {
            CoreType::Boxed(e) => (**e).clone(),
            other => other.clone(),
        },
        _ => unreachable!("is_list_or_boxed_list guarantees Algebraic"),
    };

    let mut core_alternatives = Vec::new();
    for alternative in alternatives {
        match &alternative.pattern {
            surface::Expression::List(_, elements, _) if elements.is_empty() => {
                let (expression, _) = translate_expression(&alternative.expression, environment, top_level_names, names)?;
                core_alternatives.push(core::AlgebraicAlternative {
                    constructor: nil_constructor(element_ty.clone()),
                    element_names: vec![],
                    expression,
                });
            }
            surface::Expression::List(_, elements, _) => {
                let (head_name, tail_name) = match elements.as_slice() {
                    [head, tail] if !head.expanded && tail.expanded => {
                        let head_name = variable_name_of(&head.expression)?;
                        let tail_name = variable_name_of(&tail.expression)?;
                        (head_name, tail_name)
                    }
                    _ => return Err(CompileError::internal("list case pattern is not the desugared cons shape")),
                };
                let mut child_env = environment.clone();
                child_env.insert(head_name.clone(), CoreType::boxed(element_ty.clone()));
                child_env.insert(tail_name.clone(), CoreType::boxed(list_algebraic_ty.clone()));
                let (expression, _) = translate_expression(&alternative.expression, &child_env, top_level_names, names)?;
                core_alternatives.push(core::AlgebraicAlternative {
                    constructor: cons_constructor(element_ty.clone()),
                    element_names: vec![head_name, tail_name],
                    expression,
                });
            }
            _ => return Err(CompileError::internal("list case alternative pattern is not List")),
        }
    }

    let core_default = translate_default(default, environment, top_level_names, names, CoreType::boxed(list_algebraic_ty.clone()))?;

    Ok((
        core::Expression::AlgebraicCase(Box::new(scrutinee_core), list_algebraic_ty, core_alternatives, core_default),
        result_core_ty.clone(),
    ))
}

fn variable_name_of(expression: &surface::Expression) -> CompileResult<String> {
    match expression {
        surface::Expression::Variable(name, _) => Ok(name.environment_key()),
        _ => Err(CompileError::internal("expected a bare variable in a desugared list pattern")),
    }
}

fn translate_default(
    default: &Option<Box<surface::DefaultAlternative>>,
    environment: &Environment,
    top_level_names: &HashSet<String>,
    names: &mut NameGenerator,
    scrutinee_ty: CoreType,
) -> CompileResult<Option<Box<core::DefaultAlternative>>> {
    let Some(default) = default else { return Ok(None) };
    let mut child_env = environment.clone();
    if !default.variable.is_empty() {
        child_env.insert(default.variable.clone(), scrutinee_ty);
    }
    let (expression, _) = translate_expression(&default.expression, &child_env, top_level_names, names)?;
    Ok(Some(Box::new(core::DefaultAlternative {
        variable: default.variable.clone(),
        expression,
    })))
}

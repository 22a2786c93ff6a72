//! Desugars list-pattern case alternatives into nested `cons`/`nil` and
//! per-element matches (spec.md §4.2 step 3).
//!
//! Grounded on `original_source/command/compile/desugar/desugar_list_cases_test.go`:
//! alternatives are tried in source order exactly like ordinary pattern
//! matching, constant head elements at the same position are merged into one
//! nested branch, a `Variable`-headed element unconditionally consumes the
//! head (binding it via the branch's own default binder, not a separate
//! `let`) but still lets its own tail match fail through to later
//! alternatives, and a sole rest-splice element (`...xs`) degenerates into a
//! default that rebinds the whole remaining list — irreversibly shadowing
//! any user-written default with the same name (spec.md §9, Open Question).

use crate::frontend::ast::{Alternative, Bind, DefaultAlternative, Expression, ListArgument, QualifiedName};
use crate::frontend::names::NameGenerator;
use crate::frontend::types::Type;

/// Runs list-case desugaring over every `Case` in `expression`, recursively.
pub fn desugar_list_cases(expression: Expression) -> Expression {
    match expression {
        Expression::Case(scrutinee, result_type, alternatives, default, debug) => {
            let scrutinee = desugar_list_cases(*scrutinee);
            let alternatives: Vec<Alternative> = alternatives
                .into_iter()
                .map(|a| Alternative::new(a.pattern, desugar_list_cases(a.expression)))
                .collect();
            let default = default.map(|d| {
                Box::new(DefaultAlternative::new(d.variable, desugar_list_cases(d.expression)))
            });

            if !alternatives.iter().any(|a| matches!(a.pattern, Expression::List(..))) {
                return Expression::Case(Box::new(scrutinee), result_type, alternatives, default, debug);
            }

            desugar_one_list_case(scrutinee, result_type, alternatives, default, debug)
        }
        other => other.map_children(&mut desugar_list_cases),
    }
}

/// One "still to be matched" alternative: the remaining pattern elements at
/// the current recursion depth, plus its (already-desugared) body.
#[derive(Clone)]
struct ActiveAlternative {
    remaining: Vec<ListArgument>,
    expression: Expression,
}

fn desugar_one_list_case(
    scrutinee: Expression,
    result_type: Type,
    alternatives: Vec<Alternative>,
    default: Option<Box<DefaultAlternative>>,
    debug: crate::debug::DebugInformation,
) -> Expression {
    let active: Vec<ActiveAlternative> = alternatives
        .into_iter()
        .map(|a| match a.pattern {
            Expression::List(_, elements, _) => ActiveAlternative {
                remaining: elements,
                expression: a.expression,
            },
            other => ActiveAlternative {
                remaining: vec![],
                expression: other,
            },
        })
        .collect();

    // Open Question (spec.md §9): a sole rest-splice pattern degenerates into
    // a default that rebinds the whole list, discarding any user default.
    if let [only] = active.as_slice() {
        if let [ListArgument { expression: rest_name, expanded: true }] = only.remaining.as_slice() {
            if let Some(name) = variable_name(rest_name) {
                return Expression::Case(
                    Box::new(scrutinee),
                    result_type,
                    vec![],
                    Some(Box::new(DefaultAlternative::new(name, only.expression.clone()))),
                    debug,
                );
            }
        }
    }

    let witness = default.as_ref().map(|d| NameGenerator::default_alternative_witness(&d.variable));

    let ultimate_default = match (&default, &witness) {
        (Some(d), Some(witness)) => Some(DefaultAlternative::new(
            "",
            Expression::Let(
                vec![Bind::new(
                    d.variable.clone(),
                    Type::Unknown(debug.clone()),
                    Expression::variable(witness.clone(), debug.clone()),
                )],
                Box::new(d.expression.clone()),
                debug.clone(),
            ),
        )),
        _ => None,
    };

    let case_scrutinee = match &witness {
        Some(witness) => Expression::variable(witness.clone(), debug.clone()),
        None => scrutinee.clone(),
    };

    let compiled = compile_list_level(case_scrutinee, &result_type, active, ultimate_default, &debug);

    match witness {
        Some(witness) => Expression::Let(
            vec![Bind::new(witness, Type::Unknown(debug.clone()), scrutinee)],
            Box::new(compiled),
            debug,
        ),
        None => compiled,
    }
}

fn variable_name(expression: &Expression) -> Option<String> {
    match expression {
        Expression::Variable(QualifiedName { alias: None, name }, _) => Some(name.clone()),
        _ => None,
    }
}

fn is_rest_terminal(alt: &ActiveAlternative) -> bool {
    matches!(alt.remaining.as_slice(), [ListArgument { expanded: true, .. }])
}

/// Decides nil vs. cons at one list depth.
fn compile_list_level(
    scrutinee: Expression,
    result_type: &Type,
    alts: Vec<ActiveAlternative>,
    default: Option<DefaultAlternative>,
    debug: &crate::debug::DebugInformation,
) -> Expression {
    let exhausted = alts.iter().find(|a| a.remaining.is_empty()).cloned();
    let non_empty: Vec<ActiveAlternative> = alts.into_iter().filter(|a| !a.remaining.is_empty()).collect();

    let mut alternatives = Vec::new();

    if !non_empty.is_empty() {
        let head_name = "$head".to_string();
        let tail_name = "$tail".to_string();
        let cons_body = compile_head_level(&head_name, &tail_name, non_empty, default.clone(), result_type, debug);
        alternatives.push(Alternative::new(
            Expression::List(
                result_type.clone(),
                vec![
                    ListArgument::plain(Expression::variable(head_name, debug.clone())),
                    ListArgument::rest(Expression::variable(tail_name, debug.clone())),
                ],
                debug.clone(),
            ),
            cons_body,
        ));
    }

    if let Some(exhausted) = exhausted {
        alternatives.push(Alternative::new(
            Expression::List(result_type.clone(), vec![], debug.clone()),
            exhausted.expression,
        ));
    }

    Expression::Case(
        Box::new(scrutinee),
        result_type.clone(),
        alternatives,
        default.map(Box::new),
        debug.clone(),
    )
}

/// Discriminates on `$head`'s value among alternatives that all still have
/// at least one remaining pattern element.
fn compile_head_level(
    head_name: &str,
    tail_name: &str,
    alts: Vec<ActiveAlternative>,
    default: Option<DefaultAlternative>,
    result_type: &Type,
    debug: &crate::debug::DebugInformation,
) -> Expression {
    let (candidates, local_default) = match alts.iter().position(is_rest_terminal) {
        Some(index) => {
            let rest_alt = alts[index].clone();
            let rest_name = match rest_alt.remaining.as_slice() {
                [ListArgument { expression, .. }] => variable_name(expression).expect("rest pattern binds a name"),
                _ => unreachable!(),
            };
            (
                alts[..index].to_vec(),
                Some(DefaultAlternative::new(rest_name, rest_alt.expression)),
            )
        }
        None => (alts, default.clone()),
    };

    match candidates.iter().position(|a| variable_name(&a.remaining[0].expression).is_some() && !is_number(&a.remaining[0].expression)) {
        Some(variable_index) => {
            let before = &candidates[..variable_index];
            let variable_alt = candidates[variable_index].clone();
            let after = candidates[variable_index + 1..].to_vec();

            let retry_default = if after.is_empty() {
                local_default.clone()
            } else {
                Some(DefaultAlternative::new(
                    "",
                    compile_head_level(head_name, tail_name, after, local_default.clone(), result_type, debug),
                ))
            };

            let binder_name = variable_name(&variable_alt.remaining[0].expression).unwrap();
            let continuation = compile_list_level(
                Expression::variable(tail_name, debug.clone()),
                result_type,
                vec![ActiveAlternative {
                    remaining: variable_alt.remaining[1..].to_vec(),
                    expression: variable_alt.expression,
                }],
                retry_default,
                debug,
            );

            let number_alternatives = build_number_alternatives(before, head_name, tail_name, local_default.clone(), result_type, debug);

            Expression::Case(
                Box::new(Expression::variable(head_name, debug.clone())),
                result_type.clone(),
                number_alternatives,
                Some(Box::new(DefaultAlternative::new(binder_name, continuation))),
                debug.clone(),
            )
        }
        None => {
            let number_alternatives = build_number_alternatives(&candidates, head_name, tail_name, local_default.clone(), result_type, debug);
            Expression::Case(
                Box::new(Expression::variable(head_name, debug.clone())),
                result_type.clone(),
                number_alternatives,
                local_default.map(Box::new),
                debug.clone(),
            )
        }
    }
}

fn is_number(expression: &Expression) -> bool {
    matches!(expression, Expression::Number(..))
}

/// Groups constant-headed alternatives by their literal value (merging
/// duplicates, spec.md §4.2 step 3) and builds one nested `compile_list_level`
/// continuation per distinct value, in first-seen order.
fn build_number_alternatives(
    alts: &[ActiveAlternative],
    _head_name: &str,
    tail_name: &str,
    local_default: Option<DefaultAlternative>,
    result_type: &Type,
    debug: &crate::debug::DebugInformation,
) -> Vec<Alternative> {
    let mut groups: Vec<(f64, Vec<ActiveAlternative>)> = Vec::new();
    for alt in alts {
        let value = match &alt.remaining[0].expression {
            Expression::Number(v, _) => *v,
            _ => continue,
        };
        match groups.iter_mut().find(|(v, _)| *v == value) {
            Some((_, members)) => members.push(alt.clone()),
            None => groups.push((value, vec![alt.clone()])),
        }
    }

    groups
        .into_iter()
        .map(|(value, members)| {
            let stripped: Vec<ActiveAlternative> = members
                .into_iter()
                .map(|a| ActiveAlternative {
                    remaining: a.remaining[1..].to_vec(),
                    expression: a.expression,
                })
                .collect();
            let continuation = compile_list_level(
                Expression::variable(tail_name.to_string(), debug.clone()),
                result_type,
                stripped,
                local_default.clone(),
                debug,
            );
            Alternative::new(Expression::Number(value, debug.clone()), continuation)
        })
        .collect()
}

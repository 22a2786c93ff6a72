//! Linearises complex applications: every non-atomic callee or argument is
//! hoisted into a preceding `let`-bound name of `Unknown` type (spec.md
//! §4.2 step 2).
//!
//! Nested applications of the shape `(f x) y` are handled uniformly: the
//! inner `Application` is itself non-atomic, so it gets hoisted into its own
//! bind exactly like any other complex argument. Names are qualified by the
//! enclosing module name to avoid cross-module clashes.

use crate::frontend::ast::{Bind, Expression, Module};
use crate::frontend::names::NameGenerator;
use crate::frontend::types::Type;

pub fn linearise_applications(module: Module) -> Module {
    let mut names = NameGenerator::new(module.name.clone());
    module.map_binds(|bind| {
        let expression = linearise(bind.expression, &mut names);
        vec![Bind::new(bind.name, bind.declared_type, expression)]
    })
}

fn linearise(expression: Expression, names: &mut NameGenerator) -> Expression {
    match expression {
        Expression::Application(function, arguments, debug) => {
            let function = linearise(*function, names);
            let arguments: Vec<Expression> = arguments.into_iter().map(|a| linearise(a, names)).collect();

            let mut lets = Vec::new();
            let function = hoist_if_needed(function, names, &mut lets);
            let arguments = arguments.into_iter().map(|a| hoist_if_needed(a, names, &mut lets)).collect();

            let application = Expression::Application(Box::new(function), arguments, debug.clone());
            if lets.is_empty() {
                application
            } else {
                Expression::Let(lets, Box::new(application), debug)
            }
        }
        other => other.map_children(&mut |child| linearise(child, names)),
    }
}

fn hoist_if_needed(expression: Expression, names: &mut NameGenerator, lets: &mut Vec<Bind>) -> Expression {
    if expression.is_atomic() {
        return expression;
    }
    let debug = expression.debug_information().clone();
    let name = names.generate_qualified("application");
    lets.push(Bind::new(name.clone(), Type::Unknown(debug.clone()), expression));
    Expression::variable(name, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::Import;
    use crate::frontend::types::Type;

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn non_atomic_argument_is_hoisted_into_a_preceding_let() {
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(d()),
                Expression::Application(
                    Box::new(Expression::variable("f", d())),
                    vec![Expression::Number(1.0, d())],
                    d(),
                ),
            )],
        );
        let linearised = linearise_applications(module);
        match &linearised.binds[0].expression {
            Expression::Let(binds, body, _) => {
                assert_eq!(binds.len(), 1);
                assert_eq!(binds[0].name, "$Main.application-0");
                match &**body {
                    Expression::Application(_, arguments, _) => {
                        assert!(matches!(arguments[0], Expression::Variable(..)));
                    }
                    _ => panic!("expected an application"),
                }
            }
            _ => panic!("expected a let wrapping the hoisted argument"),
        }
    }

    #[test]
    fn already_atomic_application_is_left_untouched() {
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(d()),
                Expression::Application(
                    Box::new(Expression::variable("f", d())),
                    vec![Expression::variable("y", d())],
                    d(),
                ),
            )],
        );
        let linearised = linearise_applications(module);
        assert!(matches!(linearised.binds[0].expression, Expression::Application(..)));
    }
}

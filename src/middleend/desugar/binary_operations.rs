//! Hoists non-atomic binary-operation operands into preceding `let`-bound
//! names so Core translation can emit a case-on-boxed-operand form without
//! nesting non-atomic work in atom position (spec.md §4.2 step 4).
//!
//! Grounded on
//! `original_source/command/compile/desugar/desugar_binary_operations_test.go`.

use crate::frontend::ast::{Bind, Expression, Module};
use crate::frontend::names::NameGenerator;
use crate::frontend::types::Type;

pub fn desugar_binary_operations(module: Module) -> Module {
    let mut names = NameGenerator::new("");
    module.map_binds(|bind| {
        let expression = desugar(bind.expression, &mut names);
        vec![Bind::new(bind.name, bind.declared_type, expression)]
    })
}

fn desugar(expression: Expression, names: &mut NameGenerator) -> Expression {
    match expression {
        Expression::BinaryOperation(operator, left, right, debug) => {
            let left = desugar(*left, names);
            let right = desugar(*right, names);

            let mut lets = Vec::new();
            let left = hoist_if_needed(left, names, &mut lets);
            let right = hoist_if_needed(right, names, &mut lets);

            let operation = Expression::BinaryOperation(operator, Box::new(left), Box::new(right), debug.clone());
            if lets.is_empty() {
                operation
            } else {
                Expression::Let(lets, Box::new(operation), debug)
            }
        }
        other => other.map_children(&mut |child| desugar(child, names)),
    }
}

fn hoist_if_needed(expression: Expression, names: &mut NameGenerator, lets: &mut Vec<Bind>) -> Expression {
    if expression.is_atomic() {
        return expression;
    }
    let debug = expression.debug_information().clone();
    let name = names.binary_operation_argument();
    lets.push(Bind::new(name.clone(), Type::Unknown(debug.clone()), expression));
    Expression::variable(name, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::{BinaryOperator, Import};

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn non_atomic_operand_is_hoisted() {
        let module = Module::new(
            "m".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(d()),
                Expression::BinaryOperation(
                    BinaryOperator::Add,
                    Box::new(Expression::BinaryOperation(
                        BinaryOperator::Multiply,
                        Box::new(Expression::variable("a", d())),
                        Box::new(Expression::variable("b", d())),
                        d(),
                    )),
                    Box::new(Expression::variable("c", d())),
                    d(),
                ),
            )],
        );
        let desugared = desugar_binary_operations(module);
        match &desugared.binds[0].expression {
            Expression::Let(binds, body, _) => {
                assert_eq!(binds.len(), 1);
                assert_eq!(binds[0].name, "$binary-operation.argument-0");
                match &**body {
                    Expression::BinaryOperation(_, left, _, _) => {
                        assert!(matches!(**left, Expression::Variable(..)));
                    }
                    _ => panic!("expected a binary operation"),
                }
            }
            _ => panic!("expected a let wrapping the hoisted multiplication"),
        }
    }

    #[test]
    fn already_atomic_operands_are_left_untouched() {
        let module = Module::new(
            "m".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(d()),
                Expression::BinaryOperation(
                    BinaryOperator::Add,
                    Box::new(Expression::variable("a", d())),
                    Box::new(Expression::variable("b", d())),
                    d(),
                ),
            )],
        );
        let desugared = desugar_binary_operations(module);
        assert!(matches!(desugared.binds[0].expression, Expression::BinaryOperation(..)));
    }
}

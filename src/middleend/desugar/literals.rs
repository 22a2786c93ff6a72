//! Lifts `Number` literals out of sub-expression position into dedicated
//! top-level `Unboxed` binds (spec.md §4.2 step 1).
//!
//! Grounded on `original_source/command/compile/desugar/desugar_literals.go`:
//! a bind whose entire expression is already a bare literal is rewritten in
//! place to an `Unboxed` bind with no new name; every other literal
//! occurrence is hoisted to a fresh `$literal-<n>` bind and replaced by a
//! variable reference.

use crate::frontend::ast::{Bind, Expression, Module};
use crate::frontend::names::NameGenerator;
use crate::frontend::types::Type;

pub fn lift_literals(module: Module) -> Module {
    let mut names = NameGenerator::new("");
    let mut extra_binds = Vec::new();

    let binds = module
        .binds
        .into_iter()
        .map(|bind| {
            if let Expression::Number(value, debug) = bind.expression {
                return Bind::new(
                    bind.name,
                    Type::unboxed(bind.declared_type, debug.clone()),
                    Expression::Unboxed(Box::new(Expression::Number(value, debug.clone())), debug),
                );
            }

            let expression = lift_within(bind.expression, &mut names, &mut extra_binds);
            Bind::new(bind.name, bind.declared_type, expression)
        })
        .collect::<Vec<_>>();

    let mut binds = binds;
    binds.extend(extra_binds);
    Module::new(module.name, module.exports, module.imports, binds)
}

fn lift_within(expression: Expression, names: &mut NameGenerator, extra_binds: &mut Vec<Bind>) -> Expression {
    match expression {
        Expression::Number(value, debug) => {
            let name = names.generate("literal");
            extra_binds.push(Bind::new(
                name.clone(),
                Type::unboxed(Type::Number(debug.clone()), debug.clone()),
                Expression::Unboxed(Box::new(Expression::Number(value, debug.clone())), debug.clone()),
            ));
            Expression::variable(name, debug)
        }
        other => other.map_children(&mut |child| lift_within(child, names, extra_binds)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::{BinaryOperator, Import};

    fn debug() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn bare_literal_bind_becomes_unboxed_in_place_with_no_new_bind() {
        let module = Module::new(
            "m",
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new("x", Type::Number(debug()), Expression::Number(1.0, debug()))],
        );
        let lifted = lift_literals(module);
        assert_eq!(lifted.binds.len(), 1);
        assert!(matches!(lifted.binds[0].declared_type, Type::Unboxed(..)));
        assert!(matches!(lifted.binds[0].expression, Expression::Unboxed(..)));
    }

    #[test]
    fn nested_literal_is_hoisted_to_a_fresh_bind() {
        let module = Module::new(
            "m",
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(debug()),
                Expression::BinaryOperation(
                    BinaryOperator::Add,
                    Box::new(Expression::Number(1.0, debug())),
                    Box::new(Expression::Number(2.0, debug())),
                    debug(),
                ),
            )],
        );
        let lifted = lift_literals(module);
        assert_eq!(lifted.binds.len(), 3);
        assert_eq!(lifted.binds[1].name, "$literal-0");
        assert_eq!(lifted.binds[2].name, "$literal-1");
        match &lifted.binds[0].expression {
            Expression::BinaryOperation(_, left, right, _) => {
                assert!(matches!(**left, Expression::Variable(..)));
                assert!(matches!(**right, Expression::Variable(..)));
            }
            _ => panic!("expected a binary operation"),
        }
    }
}

//! The fixed-order desugar pipeline (spec.md §4.2). Each pass is a pure
//! module-to-module rewrite; order is part of the contract and must not be
//! reordered.

mod applications;
mod binary_operations;
mod list_cases;
mod literals;

use crate::frontend::ast::{Expression, Module};

/// Runs the four desugar passes in their mandated order: lift literals,
/// linearise complex applications, desugar list cases, desugar binary
/// operations. "Annotate unknowns" (spec.md §4.2 step 5) is not a rewrite —
/// it is simply the absence of further desugaring, left for
/// [`crate::middleend::infer`].
#[must_use]
pub fn desugar(module: Module) -> Module {
    let module = literals::lift_literals(module);
    let module = applications::linearise_applications(module);
    let module = desugar_list_cases(module);
    desugar_binary_operations(module)
}

fn desugar_list_cases(module: Module) -> Module {
    module.map_binds(|bind| {
        let expression = list_cases::desugar_list_cases(bind.expression);
        vec![crate::frontend::ast::Bind::new(bind.name, bind.declared_type, expression)]
    })
}

fn desugar_binary_operations(module: Module) -> Module {
    binary_operations::desugar_binary_operations(module)
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use crate::debug::DebugInformation;
    use crate::frontend::ast::{Bind, Import};
    use crate::frontend::types::Type;

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    fn empty_module_desugars_to_itself() {
        let module = Module::new("Main".to_string(), vec![], Vec::<Import>::new(), vec![]);
        let desugared = desugar(module.clone());
        assert_eq!(desugared, module);
    }

    #[test]
    fn literal_lifting_runs_before_binary_operation_desugaring() {
        // `1 + 2` first lifts both literals to `$literal-0`/`$literal-1`
        // binds (already atomic variables), so binary-operation desugaring
        // finds nothing left to hoist.
        let module = Module::new(
            "Main".to_string(),
            vec![],
            Vec::<Import>::new(),
            vec![Bind::new(
                "x",
                Type::Number(d()),
                Expression::BinaryOperation(
                    crate::frontend::ast::BinaryOperator::Add,
                    Box::new(Expression::Number(1.0, d())),
                    Box::new(Expression::Number(2.0, d())),
                    d(),
                ),
            )],
        );
        let desugared = desugar(module);
        assert_eq!(desugared.binds.len(), 3);
        assert!(matches!(desugared.binds[0].expression, Expression::BinaryOperation(..)));
    }
}

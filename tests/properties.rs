//! Property-based tests for the invariants in spec.md §8.

use lazycore::core::ast::Expression as CoreExpression;
use lazycore::core::types::{structurally_equal, ConstructorSignature, CoreType};
use lazycore::core::validate::validate;
use lazycore::debug::DebugInformation;
use lazycore::frontend::ast::{BinaryOperator, Bind, Expression, Import, Module};
use lazycore::frontend::module_metadata::ModuleMetadata;
use lazycore::frontend::types::Type;
use lazycore::middleend::desugar::desugar;
use lazycore::middleend::infer::infer;
use lazycore::{compile_module, CompilerOptions};
use proptest::prelude::*;

fn d() -> DebugInformation {
    DebugInformation::synthetic()
}

/// Small arithmetic expression trees over literals and one free variable
/// `v`, used to exercise the desugarer and the inferencer without hand
/// writing every case.
fn arithmetic_expression() -> impl Strategy<Value = Expression> {
    let leaf = prop_oneof![
        (-100i32..100).prop_map(|n| Expression::Number(f64::from(n), d())),
        Just(Expression::variable("v", d())),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (inner.clone(), inner, binary_operator()).prop_map(|(left, right, operator)| {
            Expression::BinaryOperation(operator, Box::new(left), Box::new(right), d())
        })
    })
}

fn binary_operator() -> impl Strategy<Value = BinaryOperator> {
    prop_oneof![
        Just(BinaryOperator::Add),
        Just(BinaryOperator::Subtract),
        Just(BinaryOperator::Multiply),
        Just(BinaryOperator::Divide),
    ]
}

fn module_with_body(expression: Expression) -> Module {
    Module::new(
        "Main",
        vec![],
        Vec::<Import>::new(),
        vec![
            Bind::new("v", Type::Number(d()), Expression::Number(7.0, d())),
            Bind::new("x", Type::Number(d()), expression),
        ],
    )
}

fn is_atomic_operand(expression: &Expression) -> bool {
    matches!(expression, Expression::Variable(..) | Expression::Unboxed(..))
}

/// No `BinaryOperation` has a non-atomic operand, and no bare `Number`
/// literal survives outside a top-level `Unboxed` bind (spec.md §8,
/// property 2).
fn assert_desugar_postconditions(expression: &Expression) {
    match expression {
        Expression::Number(..) => panic!("a bare Number literal survived desugaring: {expression:?}"),
        Expression::BinaryOperation(_, left, right, _) => {
            assert!(is_atomic_operand(left), "non-atomic left operand: {left:?}");
            assert!(is_atomic_operand(right), "non-atomic right operand: {right:?}");
            assert_desugar_postconditions(left);
            assert_desugar_postconditions(right);
        }
        Expression::Application(function, arguments, _) => {
            assert_desugar_postconditions(function);
            for argument in arguments {
                assert!(is_atomic_operand(argument), "non-atomic application argument: {argument:?}");
            }
        }
        Expression::Lambda(_, body, _) => assert_desugar_postconditions(body),
        Expression::Let(binds, body, _) => {
            for bind in binds {
                assert_desugar_postconditions(&bind.expression);
            }
            assert_desugar_postconditions(body);
        }
        Expression::Case(scrutinee, _, alternatives, default, _) => {
            assert_desugar_postconditions(scrutinee);
            for alternative in alternatives {
                assert!(
                    matches!(alternative.pattern, Expression::Number(..))
                        || matches!(&alternative.pattern, Expression::List(_, elements, _) if elements.is_empty()),
                    "a non-trivial list pattern survived list-case desugaring: {:?}",
                    alternative.pattern
                );
                assert_desugar_postconditions(&alternative.expression);
            }
            if let Some(default) = default {
                assert_desugar_postconditions(&default.expression);
            }
        }
        Expression::List(_, arguments, _) => {
            for argument in arguments {
                assert_desugar_postconditions(&argument.expression);
            }
        }
        Expression::Variable(..) | Expression::Unboxed(..) => {}
    }
}

proptest! {
    /// spec.md §8, property 2.
    #[test]
    fn desugar_leaves_no_non_atomic_operands_or_bare_literals(expression in arithmetic_expression()) {
        let module = module_with_body(expression);
        let desugared = desugar(module);
        for bind in &desugared.binds {
            if bind.name == "x" || !bind.name.starts_with('$') {
                // Top-level literal binds ($literal-N, or a bind whose whole
                // expression is a bare literal) are themselves exempt — the
                // exemption is what makes them the *top* bind position.
                if let Expression::Unboxed(..) = bind.expression {
                    continue;
                }
                assert_desugar_postconditions(&bind.expression);
            }
        }
    }

    /// spec.md §8, property 3: re-running inference on an already-typed
    /// module is a no-op.
    #[test]
    fn type_inference_is_a_fixed_point(expression in arithmetic_expression()) {
        let module = module_with_body(expression);
        let desugared = desugar(module);
        let once = infer(desugared, &ModuleMetadata::new()).unwrap();
        let twice = infer(once.clone(), &ModuleMetadata::new()).unwrap();
        prop_assert_eq!(once.binds, twice.binds);
    }

    /// spec.md §8, property 1: validating a validated module is a no-op.
    #[test]
    fn validation_is_idempotent(expression in arithmetic_expression()) {
        let module = module_with_body(expression);
        let compiled = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default()).unwrap();
        prop_assert!(validate(&compiled).is_ok());
        prop_assert!(validate(&compiled).is_ok());
    }

    /// spec.md §8, property 4: every lambda's declared free-variable list
    /// matches exactly the names its body actually references (outside its
    /// own arguments and the module's top-level names).
    #[test]
    fn core_translation_preserves_free_variable_sets(expression in arithmetic_expression()) {
        let module = module_with_body(expression);
        let compiled = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default()).unwrap();
        let top_level: std::collections::HashSet<&str> = compiled.binds.iter().map(|b| b.name.as_str()).collect();
        for bind in &compiled.binds {
            let argument_names: std::collections::HashSet<&str> =
                bind.lambda.arguments.iter().map(|a| a.name.as_str()).collect();
            let mut actual: Vec<String> = bind
                .lambda
                .body
                .referenced_names()
                .into_iter()
                .filter(|n| !argument_names.contains(n.as_str()) && !top_level.contains(n.as_str()))
                .collect();
            actual.sort();
            actual.dedup();
            let mut declared: Vec<String> = bind.lambda.free_variables.iter().map(|a| a.name.clone()).collect();
            declared.sort();
            declared.dedup();
            prop_assert_eq!(actual, declared);
        }
    }
}

fn core_type_tree() -> impl Strategy<Value = CoreType> {
    let leaf = Just(CoreType::Float64);
    leaf.prop_recursive(3, 16, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(CoreType::boxed),
            prop::collection::vec(inner.clone(), 0..3)
                .prop_map(|elements| CoreType::Algebraic(vec![ConstructorSignature::new(elements)])),
            (prop::collection::vec(inner.clone(), 0..3), inner)
                .prop_map(|(arguments, result)| CoreType::function(arguments, result)),
        ]
    })
}

proptest! {
    /// spec.md §8, property 5 (reflexivity and symmetry; termination is
    /// exercised directly by every call since the strategy is acyclic and
    /// finite, and separately by the cyclic-type unit tests in
    /// `core::types`).
    #[test]
    fn structural_equality_is_reflexive_and_symmetric(a in core_type_tree(), b in core_type_tree()) {
        prop_assert!(structurally_equal(&a, &a));
        prop_assert_eq!(structurally_equal(&a, &b), structurally_equal(&b, &a));
    }
}

/// spec.md §8, property 6: a value bind that transitively references
/// itself without an intervening lambda is rejected.
#[test]
fn directly_self_referential_value_bind_is_rejected() {
    let module = Module::new(
        "Main",
        vec![],
        Vec::<Import>::new(),
        vec![Bind::new(
            "x",
            Type::Number(d()),
            Expression::BinaryOperation(
                BinaryOperator::Add,
                Box::new(Expression::variable("x", d())),
                Box::new(Expression::Number(1.0, d())),
                d(),
            ),
        )],
    );
    let result = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default());
    assert!(result.is_err());
}

#[test]
fn self_referential_value_bind_through_a_let_is_also_rejected() {
    let module = Module::new(
        "Main",
        vec![],
        Vec::<Import>::new(),
        vec![Bind::new(
            "x",
            Type::Number(d()),
            Expression::Let(
                vec![Bind::new("y", Type::Number(d()), Expression::variable("x", d()))],
                Box::new(Expression::variable("y", d())),
                d(),
            ),
        )],
    );
    let result = compile_module(module, &ModuleMetadata::new(), CompilerOptions::default());
    assert!(result.is_err());
}

#[allow(dead_code)]
fn unused_core_expression_reference(e: CoreExpression) -> CoreExpression {
    e
}

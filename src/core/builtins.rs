//! The two built-in algebraic types this language has (spec.md §1,
//! Non-goals: "only built-in `Number` and cons-list `[T]` algebraics
//! exist"): the boxed `Number` wrapper around a `Float64`, and the
//! polymorphic `cons`/`nil` list, recursive via [`CoreType::Index`].

use crate::core::ast::Constructor;
use crate::core::types::{ConstructorSignature, CoreType};

/// Tag of the single `Number` constructor.
pub const NUMBER_TAG: usize = 0;
/// Tag of the list's `nil` constructor.
pub const NIL_TAG: usize = 0;
/// Tag of the list's `cons` constructor.
pub const CONS_TAG: usize = 1;

/// `Algebraic([ number(Float64) ])`.
#[must_use]
pub fn number_algebraic() -> CoreType {
    CoreType::Algebraic(vec![ConstructorSignature::new(vec![CoreType::Float64])])
}

#[must_use]
pub fn number_constructor() -> Constructor {
    Constructor::new(number_algebraic(), NUMBER_TAG)
}

/// `Boxed(Algebraic([ number(Float64) ]))`, the core type every surface
/// `Number` translates to when not explicitly `Unboxed` (spec.md §4.4).
#[must_use]
pub fn boxed_number() -> CoreType {
    CoreType::boxed(number_algebraic())
}

/// `Algebraic([ nil(), cons(Boxed(element), Boxed(Index(0))) ])`: the list's
/// tail refers back to the enclosing `Algebraic` via a de-Bruijn index
/// rather than a shared mutable cell (spec.md §9, "Cyclic types").
#[must_use]
pub fn list_algebraic(element: CoreType) -> CoreType {
    CoreType::Algebraic(vec![
        ConstructorSignature::new(vec![]),
        ConstructorSignature::new(vec![CoreType::boxed(element), CoreType::boxed(CoreType::Index(0))]),
    ])
}

#[must_use]
pub fn boxed_list(element: CoreType) -> CoreType {
    CoreType::boxed(list_algebraic(element))
}

#[must_use]
pub fn nil_constructor(element: CoreType) -> Constructor {
    Constructor::new(list_algebraic(element), NIL_TAG)
}

#[must_use]
pub fn cons_constructor(element: CoreType) -> Constructor {
    Constructor::new(list_algebraic(element), CONS_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::structurally_equal;

    #[test]
    fn list_algebraic_is_self_referential_and_stable() {
        assert!(structurally_equal(
            &list_algebraic(CoreType::Float64),
            &list_algebraic(CoreType::Float64)
        ));
    }

    #[test]
    fn cons_has_arity_two_and_nil_has_arity_zero() {
        assert_eq!(cons_constructor(CoreType::Float64).arity(), 2);
        assert_eq!(nil_constructor(CoreType::Float64).arity(), 0);
    }
}

//! STG-style Core types (spec.md §3, "Core types"): `Float64`, `Boxed`,
//! `Algebraic`, `Function`, and the de-Bruijn `Index` back-reference used to
//! represent cyclic type graphs without shared mutable cells (spec.md §9,
//! "Cyclic types").
//!
//! The equality checker below is a direct structural port of
//! `original_source/command/core/types/equality_checker.go`: two parallel
//! binder stacks plus a set of already-visited pairs, so that a pair
//! observed twice is assumed equal and recursion through `Index`
//! back-references terminates.

/// One constructor's ordered element types (e.g. `cons`'s `[Boxed(Number),
/// Boxed(List)]`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorSignature {
    pub elements: Vec<CoreType>,
}

impl ConstructorSignature {
    #[must_use]
    pub fn new(elements: Vec<CoreType>) -> Self {
        Self { elements }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.elements.len()
    }
}

/// A Core type (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum CoreType {
    /// A register-resident double.
    Float64,
    /// A pointer to a heap closure yielding `T`.
    Boxed(Box<CoreType>),
    /// A sum of constructors, each with a fixed element-type tuple.
    Algebraic(Vec<ConstructorSignature>),
    /// A function's argument types and result type.
    Function(Vec<CoreType>, Box<CoreType>),
    /// A de-Bruijn back-reference to the `k`-th enclosing recursive
    /// `Algebraic`/`Function` binder (counting outward from the innermost).
    Index(usize),
}

impl CoreType {
    #[must_use]
    pub fn boxed(content: CoreType) -> Self {
        CoreType::Boxed(Box::new(content))
    }

    #[must_use]
    pub fn function(arguments: Vec<CoreType>, result: CoreType) -> Self {
        CoreType::Function(arguments, Box::new(result))
    }

    /// `true` for a bare `Float64`, used where a value is already known to
    /// be unboxed (e.g. a `PrimitiveCase` scrutinee after forcing).
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, CoreType::Float64)
    }

    #[must_use]
    pub fn is_algebraic_or_boxed_algebraic(&self) -> bool {
        match self {
            CoreType::Algebraic(_) => true,
            CoreType::Boxed(inner) => matches!(**inner, CoreType::Algebraic(_)),
            _ => false,
        }
    }

    /// `true` for `Float64` or the built-in boxed-`Number` shape
    /// `Boxed(Algebraic([ (Float64) ]))`; used by the Core translator and
    /// validator to decide whether a case scrutinee is number-like and
    /// needs an implicit unboxing step (spec.md §4.5).
    #[must_use]
    pub fn is_number_or_boxed_number(&self) -> bool {
        match self {
            CoreType::Float64 => true,
            CoreType::Boxed(inner) => matches!(
                &**inner,
                CoreType::Algebraic(cs) if cs.len() == 1 && cs[0].elements == vec![CoreType::Float64]
            ),
            _ => false,
        }
    }

    /// `true` for the built-in list shape (bare or boxed): an `Algebraic`
    /// with exactly two constructors, `nil` (arity 0) and `cons` (arity 2) —
    /// the only non-number `Algebraic` this language ever produces (spec.md
    /// §1, Non-goals: no user-defined algebraic types), so the constructor
    /// count and arities alone are enough to tell list apart from number
    /// without resolving any `Index` back-reference.
    #[must_use]
    pub fn is_list_or_boxed_list(&self) -> bool {
        let unwrapped = match self {
            CoreType::Boxed(inner) => &**inner,
            other => other,
        };
        matches!(
            unwrapped,
            CoreType::Algebraic(cs) if cs.len() == 2 && cs[0].arity() == 0 && cs[1].arity() == 2
        )
    }
}

/// Co-inductive structural equality over (possibly cyclic) Core type
/// graphs. This is the only correct way to compare two [`CoreType`]s that
/// may contain `Index` back-references — a derived `PartialEq` would either
/// loop forever or reject legitimately-equal recursive types, so the
/// validator and canonicaliser must call this instead of `==`.
#[must_use]
pub fn structurally_equal(left: &CoreType, right: &CoreType) -> bool {
    let mut checker = EqualityChecker {
        pairs: Vec::new(),
        left_stack: vec![left.clone()],
        right_stack: vec![right.clone()],
    };
    checker.check(left, right)
}

struct EqualityChecker {
    pairs: Vec<(CoreType, CoreType)>,
    left_stack: Vec<CoreType>,
    right_stack: Vec<CoreType>,
}

impl EqualityChecker {
    fn check(&mut self, t: &CoreType, u: &CoreType) -> bool {
        if self.is_pair_checked(t, u) {
            return true;
        }
        self.pairs.push((t.clone(), u.clone()));

        if let CoreType::Index(k) = t {
            let resolved = self.left_stack[self.left_stack.len() - 1 - k].clone();
            return self.check(&resolved, u);
        }
        if let CoreType::Index(k) = u {
            let resolved = self.right_stack[self.right_stack.len() - 1 - k].clone();
            return self.check(t, &resolved);
        }

        match (t, u) {
            (CoreType::Float64, CoreType::Float64) => true,
            (CoreType::Boxed(a), CoreType::Boxed(b)) => self.check(a, b),
            (CoreType::Algebraic(cs1), CoreType::Algebraic(cs2)) => {
                if cs1.len() != cs2.len() {
                    return false;
                }
                self.push_frame(t.clone(), u.clone());
                let equal = cs1.iter().zip(cs2.iter()).all(|(c1, c2)| {
                    c1.elements.len() == c2.elements.len()
                        && c1
                            .elements
                            .iter()
                            .zip(c2.elements.iter())
                            .all(|(e1, e2)| self.check(e1, e2))
                });
                self.pop_frame();
                equal
            }
            (CoreType::Function(args1, r1), CoreType::Function(args2, r2)) => {
                if args1.len() != args2.len() {
                    return false;
                }
                self.push_frame(t.clone(), u.clone());
                let equal = args1.iter().zip(args2.iter()).all(|(a, b)| self.check(a, b))
                    && self.check(r1, r2);
                self.pop_frame();
                equal
            }
            _ => false,
        }
    }

    fn push_frame(&mut self, left: CoreType, right: CoreType) {
        self.left_stack.push(left);
        self.right_stack.push(right);
    }

    fn pop_frame(&mut self) {
        self.left_stack.pop();
        self.right_stack.pop();
    }

    fn is_pair_checked(&self, t: &CoreType, u: &CoreType) -> bool {
        self.pairs.iter().any(|(a, b)| a == t && b == u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float64_equals_itself() {
        assert!(structurally_equal(&CoreType::Float64, &CoreType::Float64));
    }

    #[test]
    fn mismatched_primitives_are_unequal() {
        assert!(!structurally_equal(&CoreType::Float64, &CoreType::boxed(CoreType::Float64)));
    }

    #[test]
    fn self_referential_list_type_is_equal_to_itself_via_index() {
        // list = Algebraic[ nil(), cons(Boxed(Float64), Boxed(Index(0))) ]
        let list_type = CoreType::Algebraic(vec![
            ConstructorSignature::new(vec![]),
            ConstructorSignature::new(vec![
                CoreType::boxed(CoreType::Float64),
                CoreType::boxed(CoreType::Index(0)),
            ]),
        ]);
        assert!(structurally_equal(&list_type, &list_type.clone()));
    }

    #[test]
    fn mutually_recursive_graphs_terminate_and_compare_equal() {
        // Two independently-built but isomorphic self-referential graphs.
        let build = || {
            CoreType::Algebraic(vec![ConstructorSignature::new(vec![CoreType::boxed(
                CoreType::Index(0),
            )])])
        };
        assert!(structurally_equal(&build(), &build()));
    }

    #[test]
    fn differing_arity_algebraics_are_unequal() {
        let a = CoreType::Algebraic(vec![ConstructorSignature::new(vec![])]);
        let b = CoreType::Algebraic(vec![
            ConstructorSignature::new(vec![]),
            ConstructorSignature::new(vec![CoreType::Float64]),
        ]);
        assert!(!structurally_equal(&a, &b));
    }
}

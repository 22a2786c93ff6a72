//! Surface types: `Number`, `Function`, `List`, `Unboxed`, `Unknown`,
//! `Variable` (spec.md §3), plus the unification/substitution machinery
//! type inference drives (spec.md §4.3).
//!
//! Grounded on `original_source/command/types/{unboxed,variable}.go`: each
//! constructor panics on the combinations the language forbids outright
//! (`Unboxed` over `Function` or `Unboxed`) rather than deferring that to a
//! validation pass, and every node carries its own [`DebugInformation`].

use crate::debug::DebugInformation;
use crate::error::CompileError;
use std::collections::{HashMap, VecDeque};

/// A surface type (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Number(DebugInformation),
    Function(Box<Type>, Box<Type>, DebugInformation),
    List(Box<Type>, DebugInformation),
    Unboxed(Box<Type>, DebugInformation),
    Unknown(DebugInformation),
    Variable(u64, DebugInformation),
}

impl Type {
    /// Wraps `content` as an unboxed type. Panics if `content` is itself a
    /// `Function` or `Unboxed` type, matching
    /// `original_source/command/types/unboxed.go`'s `NewUnboxed`, which the
    /// Go implementation treats as a programmer error rather than a
    /// recoverable one.
    #[must_use]
    pub fn unboxed(content: Type, debug_information: DebugInformation) -> Self {
        match &content {
            Type::Function(..) => panic!("cannot unbox function types"),
            Type::Unboxed(..) => panic!("cannot unbox unboxed types"),
            _ => {}
        }
        Type::Unboxed(Box::new(content), debug_information)
    }

    #[must_use]
    pub fn function(argument: Type, result: Type, debug_information: DebugInformation) -> Self {
        Type::Function(Box::new(argument), Box::new(result), debug_information)
    }

    #[must_use]
    pub fn list(element: Type, debug_information: DebugInformation) -> Self {
        Type::List(Box::new(element), debug_information)
    }

    #[must_use]
    pub fn debug_information(&self) -> &DebugInformation {
        match self {
            Type::Number(d)
            | Type::Function(_, _, d)
            | Type::List(_, d)
            | Type::Unboxed(_, d)
            | Type::Unknown(d)
            | Type::Variable(_, d) => d,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown(_))
    }

    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Type::Variable(..))
    }

    /// Structural decomposition used by [`Substitution::solve`] once neither
    /// side of an equation is a bare `Variable` (that case is handled
    /// directly by the solver's occurs-check). Returns the sub-equations
    /// implied by matching two compound types one level deep, an empty list
    /// for two equal primitives, or a [`CompileError::Type`] on a kind
    /// mismatch.
    pub fn unify(&self, other: &Type) -> Result<Vec<Equation>, CompileError> {
        match (self, other) {
            (Type::Number(_), Type::Number(_)) => Ok(vec![]),
            (Type::Function(a1, r1, _), Type::Function(a2, r2, _)) => {
                Ok(vec![Equation::new(*a1.clone(), *a2.clone()), Equation::new(*r1.clone(), *r2.clone())])
            }
            (Type::List(e1, _), Type::List(e2, _)) => Ok(vec![Equation::new(*e1.clone(), *e2.clone())]),
            (Type::Unboxed(c1, _), Type::Unboxed(c2, _)) => {
                Ok(vec![Equation::new(*c1.clone(), *c2.clone())])
            }
            // A literal-lifted bind's declared type is `Unboxed(Number)` (spec.md
            // §4.2 step 1), but every other use site still expects a bare
            // `Number` — `Unboxed` only distinguishes representations at Core
            // translation time, so unification unwraps it transparently here
            // rather than treating it as a distinct nominal type.
            (Type::Unboxed(c, _), other) | (other, Type::Unboxed(c, _)) => c.unify(other),
            _ => Err(CompileError::ty(
                format!("cannot unify `{self:?}` with `{other:?}`"),
                self.debug_information().clone(),
            )),
        }
    }
}

/// `left = right`, produced by the collection phase of type inference
/// (spec.md §4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub left: Type,
    pub right: Type,
}

impl Equation {
    #[must_use]
    pub fn new(left: Type, right: Type) -> Self {
        Self { left, right }
    }
}

/// A solved mapping from type-variable identifier to concrete type.
#[derive(Debug, Default, Clone)]
pub struct Substitution {
    bindings: HashMap<u64, Type>,
}

impl Substitution {
    /// Solves a set of equations by repeated substitution (spec.md §4.3,
    /// "Solving"). Any variable observed inside the type it would be bound
    /// to is a fatal (implicit) occurs-check failure.
    pub fn solve(equations: Vec<Equation>) -> Result<Self, CompileError> {
        let mut queue: VecDeque<Equation> = equations.into();
        let mut subst = Self::default();

        while let Some(equation) = queue.pop_front() {
            let left = subst.apply(&equation.left);
            let right = subst.apply(&equation.right);

            if let Type::Variable(id, _) = &left {
                if let Type::Variable(id2, _) = &right {
                    if id == id2 {
                        continue;
                    }
                }
                subst.bind(*id, right, &mut queue)?;
                continue;
            }

            if let Type::Variable(id, _) = &right {
                subst.bind(*id, left, &mut queue)?;
                continue;
            }

            for sub_equation in left.unify(&right)? {
                queue.push_back(sub_equation);
            }
        }

        Ok(subst)
    }

    fn bind(&mut self, id: u64, ty: Type, queue: &mut VecDeque<Equation>) -> Result<(), CompileError> {
        if occurs(id, &ty) {
            return Err(CompileError::ty(
                format!("circular type: variable {id} occurs in its own solution"),
                ty.debug_information().clone(),
            ));
        }

        for equation in queue.iter_mut() {
            equation.left = substitute_variable(&equation.left, id, &ty);
            equation.right = substitute_variable(&equation.right, id, &ty);
        }
        for existing in self.bindings.values_mut() {
            *existing = substitute_variable(existing, id, &ty);
        }
        self.bindings.insert(id, ty);
        Ok(())
    }

    /// Applies the current (possibly partial) substitution to `ty`.
    #[must_use]
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Variable(id, _) => self.bindings.get(id).cloned().unwrap_or_else(|| ty.clone()),
            Type::Function(a, r, d) => Type::Function(
                Box::new(self.apply(a)),
                Box::new(self.apply(r)),
                d.clone(),
            ),
            Type::List(e, d) => Type::List(Box::new(self.apply(e)), d.clone()),
            Type::Unboxed(c, d) => Type::Unboxed(Box::new(self.apply(c)), d.clone()),
            Type::Number(_) | Type::Unknown(_) => ty.clone(),
        }
    }

    /// `true` once every variable this substitution was asked to resolve
    /// maps to a concrete (variable-free) type.
    #[must_use]
    pub fn is_fully_resolved(&self, ty: &Type) -> bool {
        !matches!(self.apply(ty), Type::Variable(..) | Type::Unknown(_))
            && !contains_unresolved(&self.apply(ty))
    }
}

fn contains_unresolved(ty: &Type) -> bool {
    match ty {
        Type::Variable(..) | Type::Unknown(_) => true,
        Type::Function(a, r, _) => contains_unresolved(a) || contains_unresolved(r),
        Type::List(e, _) => contains_unresolved(e),
        Type::Unboxed(c, _) => contains_unresolved(c),
        Type::Number(_) => false,
    }
}

fn occurs(id: u64, ty: &Type) -> bool {
    match ty {
        Type::Variable(other, _) => *other == id,
        Type::Function(a, r, _) => occurs(id, a) || occurs(id, r),
        Type::List(e, _) => occurs(id, e),
        Type::Unboxed(c, _) => occurs(id, c),
        Type::Number(_) | Type::Unknown(_) => false,
    }
}

fn substitute_variable(ty: &Type, id: u64, replacement: &Type) -> Type {
    match ty {
        Type::Variable(other, _) if *other == id => replacement.clone(),
        Type::Variable(..) | Type::Number(_) | Type::Unknown(_) => ty.clone(),
        Type::Function(a, r, d) => Type::Function(
            Box::new(substitute_variable(a, id, replacement)),
            Box::new(substitute_variable(r, id, replacement)),
            d.clone(),
        ),
        Type::List(e, d) => Type::List(Box::new(substitute_variable(e, id, replacement)), d.clone()),
        Type::Unboxed(c, d) => {
            Type::Unboxed(Box::new(substitute_variable(c, id, replacement)), d.clone())
        }
    }
}

/// Mints fresh, uniquely-identified type variables during the collection
/// phase (spec.md §4.3).
#[derive(Debug, Default, Clone)]
pub struct VariableGenerator {
    next: u64,
}

impl VariableGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self, debug_information: DebugInformation) -> Type {
        let id = self.next;
        self.next += 1;
        Type::Variable(id, debug_information)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d() -> DebugInformation {
        DebugInformation::synthetic()
    }

    #[test]
    #[should_panic(expected = "cannot unbox function types")]
    fn unboxing_a_function_type_panics() {
        let _ = Type::unboxed(Type::function(Type::Number(d()), Type::Number(d()), d()), d());
    }

    #[test]
    #[should_panic(expected = "cannot unbox unboxed types")]
    fn unboxing_an_unboxed_type_panics() {
        let _ = Type::unboxed(Type::unboxed(Type::Number(d()), d()), d());
    }

    #[test]
    fn solves_a_chain_of_variable_equations() {
        let mut gen = VariableGenerator::new();
        let v0 = gen.fresh(d());
        let v1 = gen.fresh(d());
        let equations = vec![
            Equation::new(v0.clone(), v1.clone()),
            Equation::new(v1.clone(), Type::Number(d())),
        ];
        let subst = Substitution::solve(equations).unwrap();
        assert_eq!(subst.apply(&v0), Type::Number(d()));
        assert_eq!(subst.apply(&v1), Type::Number(d()));
    }

    #[test]
    fn solves_function_equation_structurally() {
        let mut gen = VariableGenerator::new();
        let arg_var = gen.fresh(d());
        let result_var = gen.fresh(d());
        let equations = vec![Equation::new(
            Type::function(arg_var.clone(), result_var.clone(), d()),
            Type::function(Type::Number(d()), Type::Number(d()), d()),
        )];
        let subst = Substitution::solve(equations).unwrap();
        assert_eq!(subst.apply(&arg_var), Type::Number(d()));
        assert_eq!(subst.apply(&result_var), Type::Number(d()));
    }

    #[test]
    fn mismatched_kinds_are_a_type_error() {
        let equations = vec![Equation::new(
            Type::Number(d()),
            Type::list(Type::Number(d()), d()),
        )];
        assert!(Substitution::solve(equations).is_err());
    }

    #[test]
    fn circular_equations_are_rejected() {
        let mut gen = VariableGenerator::new();
        let v0 = gen.fresh(d());
        let equations = vec![Equation::new(v0.clone(), Type::list(v0, d()))];
        assert!(Substitution::solve(equations).is_err());
    }
}

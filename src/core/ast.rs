//! STG-style Core AST (spec.md §3, "Core entities").
//!
//! One pattern match per pass again replaces the teacher-predecessor's
//! visitor double-dispatch (spec.md §9): `Expression` exposes
//! [`Expression::map_children`] for validator/canonicaliser rewrites instead
//! of a `ConvertTypes`/`VisitExpressions` trait object, mirroring
//! `original_source/command/core/ast/let.go`'s `ConvertTypes` but as a free
//! function over an owned sum type.

use crate::core::types::CoreType;

/// A named, typed formal parameter or free-variable slot (spec.md §3,
/// "Lambda form").
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub ty: CoreType,
}

impl Argument {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: CoreType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// An atom: a variable reference or primitive literal, neither of which
/// allocates (spec.md §3, "Atom").
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Variable(String, CoreType),
    Float64(f64),
}

impl Atom {
    #[must_use]
    pub fn ty(&self) -> CoreType {
        match self {
            Atom::Variable(_, ty) => ty.clone(),
            Atom::Float64(_) => CoreType::Float64,
        }
    }

    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Atom::Variable(name, _) => Some(name),
            Atom::Float64(_) => None,
        }
    }
}

/// `(owning algebraic type, zero-based tag index)` (spec.md §3,
/// "Constructor").
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub algebraic_type: CoreType,
    pub tag: usize,
}

impl Constructor {
    #[must_use]
    pub fn new(algebraic_type: CoreType, tag: usize) -> Self {
        Self { algebraic_type, tag }
    }

    /// The constructor's own element-type tuple, looked up from its owning
    /// algebraic type. Panics (an internal invariant violation, not a user
    /// error) if `tag` is out of range or `algebraic_type` is not
    /// `Algebraic`.
    #[must_use]
    pub fn arity(&self) -> usize {
        match &self.algebraic_type {
            CoreType::Algebraic(constructors) => constructors[self.tag].arity(),
            _ => unreachable!("a Constructor's algebraic_type must be CoreType::Algebraic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveOperator {
    AddFloat64,
    SubtractFloat64,
    MultiplyFloat64,
    DivideFloat64,
}

/// `(literal value, expression)` (spec.md §3, "Primitive alternative").
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveAlternative {
    pub literal: f64,
    pub expression: Expression,
}

/// `(constructor, element-name list, expression)` (spec.md §3, "Algebraic
/// alternative").
#[derive(Debug, Clone, PartialEq)]
pub struct AlgebraicAlternative {
    pub constructor: Constructor,
    pub element_names: Vec<String>,
    pub expression: Expression,
}

/// `(bound-variable name, expression)` (spec.md §3, "Default alternative").
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAlternative {
    pub variable: String,
    pub expression: Expression,
}

/// A Core expression (spec.md §3, "Core Expression").
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Atom(Atom),
    /// Callee is always a variable (spec.md invariant), never a literal or
    /// another expression.
    FunctionApplication(String, Vec<Atom>),
    ConstructorApplication(Constructor, Vec<Atom>),
    Let(Vec<Bind>, Box<Expression>),
    PrimitiveCase(
        Box<Expression>,
        CoreType,
        Vec<PrimitiveAlternative>,
        Option<Box<DefaultAlternative>>,
    ),
    AlgebraicCase(
        Box<Expression>,
        CoreType,
        Vec<AlgebraicAlternative>,
        Option<Box<DefaultAlternative>>,
    ),
    PrimitiveOperation(PrimitiveOperator, Vec<Atom>),
}

impl Expression {
    #[must_use]
    pub fn variable(name: impl Into<String>, ty: CoreType) -> Self {
        Expression::Atom(Atom::Variable(name.into(), ty))
    }

    #[must_use]
    pub fn float64(value: f64) -> Self {
        Expression::Atom(Atom::Float64(value))
    }

    /// All names free in this expression, excluding those it binds itself
    /// (`Let`/case element names/default binders) — the raw reference set
    /// the free-variable closure check subtracts a lambda's own arguments
    /// and local binds from (spec.md §4.5, check 1).
    #[must_use]
    pub fn referenced_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_referenced_names(&mut names);
        names
    }

    fn collect_referenced_names(&self, out: &mut Vec<String>) {
        match self {
            Expression::Atom(Atom::Variable(name, _)) => out.push(name.clone()),
            Expression::Atom(Atom::Float64(_)) => {}
            Expression::FunctionApplication(callee, arguments) => {
                out.push(callee.clone());
                for atom in arguments {
                    if let Some(name) = atom.variable_name() {
                        out.push(name.to_string());
                    }
                }
            }
            Expression::ConstructorApplication(_, arguments) => {
                for atom in arguments {
                    if let Some(name) = atom.variable_name() {
                        out.push(name.to_string());
                    }
                }
            }
            Expression::Let(binds, body) => {
                let bound: Vec<&str> = binds.iter().map(|b| b.name.as_str()).collect();
                for bind in binds {
                    out.extend(lambda_referenced_names(&bind.lambda));
                }
                body.collect_referenced_names(out);
                out.retain(|n| !bound.contains(&n.as_str()));
            }
            Expression::PrimitiveCase(scrutinee, _, alternatives, default) => {
                scrutinee.collect_referenced_names(out);
                for alternative in alternatives {
                    alternative.expression.collect_referenced_names(out);
                }
                if let Some(default) = default {
                    let mut inner = Vec::new();
                    default.expression.collect_referenced_names(&mut inner);
                    inner.retain(|n| n != &default.variable);
                    out.extend(inner);
                }
            }
            Expression::AlgebraicCase(scrutinee, _, alternatives, default) => {
                scrutinee.collect_referenced_names(out);
                for alternative in alternatives {
                    let mut inner = Vec::new();
                    alternative.expression.collect_referenced_names(&mut inner);
                    inner.retain(|n| !alternative.element_names.contains(n));
                    out.extend(inner);
                }
                if let Some(default) = default {
                    let mut inner = Vec::new();
                    default.expression.collect_referenced_names(&mut inner);
                    inner.retain(|n| n != &default.variable);
                    out.extend(inner);
                }
            }
            Expression::PrimitiveOperation(_, operands) => {
                for atom in operands {
                    if let Some(name) = atom.variable_name() {
                        out.push(name.to_string());
                    }
                }
            }
        }
    }
}

/// Names referenced in `lambda`'s body that are not among its own
/// arguments. Used both internally (to aggregate a `Let`'s contribution to
/// its enclosing scope's referenced names) and by the validator's
/// free-variable closure check (spec.md §4.5, check 1), which additionally
/// subtracts top-level module bind names — this function only knows about
/// `lambda`'s own argument list.
#[must_use]
pub fn lambda_referenced_names(lambda: &Lambda) -> Vec<String> {
    let mut names = lambda.body.referenced_names();
    let arguments: Vec<&str> = lambda.arguments.iter().map(|a| a.name.as_str()).collect();
    names.retain(|n| !arguments.contains(&n.as_str()));
    names
}

/// A lambda form: free variables, updatability, arguments, body, result
/// type (spec.md §3, "Lambda form").
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub free_variables: Vec<Argument>,
    pub updatable: bool,
    pub arguments: Vec<Argument>,
    pub body: Expression,
    pub result_type: CoreType,
}

impl Lambda {
    #[must_use]
    pub fn new(
        free_variables: Vec<Argument>,
        updatable: bool,
        arguments: Vec<Argument>,
        body: Expression,
        result_type: CoreType,
    ) -> Self {
        Self {
            free_variables,
            updatable,
            arguments,
            body,
            result_type,
        }
    }

    /// A lambda with zero arguments is a thunk (spec.md §3).
    #[must_use]
    pub fn is_thunk(&self) -> bool {
        self.arguments.is_empty()
    }

    #[must_use]
    pub fn signature(&self) -> CoreType {
        if self.arguments.is_empty() {
            self.result_type.clone()
        } else {
            CoreType::function(
                self.arguments.iter().map(|a| a.ty.clone()).collect(),
                self.result_type.clone(),
            )
        }
    }
}

/// `(name, Lambda form)` (spec.md §3, "Core Bind").
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub name: String,
    pub lambda: Lambda,
}

impl Bind {
    #[must_use]
    pub fn new(name: impl Into<String>, lambda: Lambda) -> Self {
        Self { name: name.into(), lambda }
    }
}

/// A named type definition surfaced to the code generator (spec.md §3,
/// "Core Module"); in this language only the built-in `Number` and `[T]`
/// algebraics are ever emitted (spec.md §1, Non-goals: no user-defined
/// ADTs).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub ty: CoreType,
}

/// `(type definitions, ordered binds)` (spec.md §3, "Core Module").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub type_definitions: Vec<TypeDefinition>,
    pub binds: Vec<Bind>,
}

impl Module {
    #[must_use]
    pub fn new(type_definitions: Vec<TypeDefinition>, binds: Vec<Bind>) -> Self {
        Self { type_definitions, binds }
    }
}

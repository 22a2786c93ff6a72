//! Surface AST (spec.md §3). Re-expressed as a sum-type walker rather than
//! the teacher-predecessor's visitor double-dispatch (spec.md §9,
//! "Visitor-heavy AST traversals") — every pass below pattern-matches once
//! per node kind instead of calling a `ConvertExpressions`/`VisitTypes`
//! method on a trait object.

use crate::debug::DebugInformation;
use crate::frontend::types::Type;

/// A name, optionally qualified by a module alias (`alias.name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub alias: Option<String>,
    pub name: String,
}

impl QualifiedName {
    #[must_use]
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn qualified(alias: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            name: name.into(),
        }
    }

    /// The `<alias>.<name>` key used to look imported binds up in the type
    /// environment (spec.md §4.3, "Cross-module imports").
    #[must_use]
    pub fn environment_key(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{alias}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// One element of a list literal or list pattern: `e` or `...e` (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct ListArgument {
    pub expression: Expression,
    pub expanded: bool,
}

impl ListArgument {
    #[must_use]
    pub fn plain(expression: Expression) -> Self {
        Self {
            expression,
            expanded: false,
        }
    }

    #[must_use]
    pub fn rest(expression: Expression) -> Self {
        Self {
            expression,
            expanded: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// A surface expression (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64, DebugInformation),
    Variable(QualifiedName, DebugInformation),
    Application(Box<Expression>, Vec<Expression>, DebugInformation),
    Lambda(Vec<String>, Box<Expression>, DebugInformation),
    Let(Vec<Bind>, Box<Expression>, DebugInformation),
    Case(
        Box<Expression>,
        Type,
        Vec<Alternative>,
        Option<Box<DefaultAlternative>>,
        DebugInformation,
    ),
    BinaryOperation(BinaryOperator, Box<Expression>, Box<Expression>, DebugInformation),
    List(Type, Vec<ListArgument>, DebugInformation),
    Unboxed(Box<Expression>, DebugInformation),
}

impl Expression {
    #[must_use]
    pub fn variable(name: impl Into<String>, debug_information: DebugInformation) -> Self {
        Expression::Variable(QualifiedName::unqualified(name), debug_information)
    }

    #[must_use]
    pub fn debug_information(&self) -> &DebugInformation {
        match self {
            Expression::Number(_, d)
            | Expression::Variable(_, d)
            | Expression::Application(_, _, d)
            | Expression::Lambda(_, _, d)
            | Expression::Let(_, _, d)
            | Expression::Case(_, _, _, _, d)
            | Expression::BinaryOperation(_, _, _, d)
            | Expression::List(_, _, d)
            | Expression::Unboxed(_, d) => d,
        }
    }

    /// `true` for the atoms the desugarer may leave in argument/operand
    /// position without hoisting: a bare variable reference, or an already
    /// `Unboxed`-wrapped literal (spec.md §4.2 steps 2 and 4).
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        matches!(self, Expression::Variable(..) | Expression::Unboxed(..))
    }

    /// Applies `f` to every direct child expression, rebuilding this node.
    /// The one-pattern-match-per-pass replacement for the original
    /// `ConvertExpressions` visitor (spec.md §9).
    pub fn map_children(self, f: &mut impl FnMut(Expression) -> Expression) -> Expression {
        match self {
            Expression::Number(..) | Expression::Variable(..) => self,
            Expression::Application(function, arguments, d) => Expression::Application(
                Box::new(f(*function)),
                arguments.into_iter().map(f).collect(),
                d,
            ),
            Expression::Lambda(parameters, body, d) => {
                Expression::Lambda(parameters, Box::new(f(*body)), d)
            }
            Expression::Let(binds, body, d) => Expression::Let(
                binds
                    .into_iter()
                    .map(|b| Bind::new(b.name, b.declared_type, f(b.expression)))
                    .collect(),
                Box::new(f(*body)),
                d,
            ),
            Expression::Case(scrutinee, result_type, alternatives, default, d) => Expression::Case(
                Box::new(f(*scrutinee)),
                result_type,
                alternatives
                    .into_iter()
                    .map(|a| Alternative::new(a.pattern, f(a.expression)))
                    .collect(),
                default.map(|d0| Box::new(DefaultAlternative::new(d0.variable, f(d0.expression)))),
                d,
            ),
            Expression::BinaryOperation(operator, left, right, d) => {
                Expression::BinaryOperation(operator, Box::new(f(*left)), Box::new(f(*right)), d)
            }
            Expression::List(element_type, arguments, d) => Expression::List(
                element_type,
                arguments
                    .into_iter()
                    .map(|a| ListArgument {
                        expression: f(a.expression),
                        expanded: a.expanded,
                    })
                    .collect(),
                d,
            ),
            Expression::Unboxed(inner, d) => Expression::Unboxed(Box::new(f(*inner)), d),
        }
    }
}

/// A case alternative (spec.md §3): a literal pattern paired with its
/// right-hand-side expression. The pattern is itself an [`Expression`]
/// restricted by construction to `Number` or `List` (mirroring
/// `original_source/command/ast/alternative.go`, whose `Literal` field is
/// the same `Expression` interface narrowed to those two kinds).
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub pattern: Expression,
    pub expression: Expression,
}

impl Alternative {
    #[must_use]
    pub fn new(pattern: Expression, expression: Expression) -> Self {
        debug_assert!(
            matches!(pattern, Expression::Number(..) | Expression::List(..)),
            "alternative patterns must be Number or List literals"
        );
        Self { pattern, expression }
    }
}

/// The optional `_ -> expr` (or named-binder) arm of a `case` (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAlternative {
    pub variable: String,
    pub expression: Expression,
}

impl DefaultAlternative {
    #[must_use]
    pub fn new(variable: impl Into<String>, expression: Expression) -> Self {
        Self {
            variable: variable.into(),
            expression,
        }
    }
}

/// A top-level or `let`-bound name (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Bind {
    pub name: String,
    pub declared_type: Type,
    pub expression: Expression,
}

impl Bind {
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: Type, expression: Expression) -> Self {
        Self {
            name: name.into(),
            declared_type,
            expression,
        }
    }

    /// `true` when this bind's expression is a `Lambda` (a function bind);
    /// `false` for value binds (spec.md §3).
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self.expression, Expression::Lambda(..))
    }
}

/// One imported module's exported surface (spec.md §3, §6).
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub alias: String,
    pub exports: Vec<(String, Type)>,
}

/// A surface module: name, export set, imports, ordered binds (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub exports: Vec<String>,
    pub imports: Vec<Import>,
    pub binds: Vec<Bind>,
}

impl Module {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        exports: Vec<String>,
        imports: Vec<Import>,
        binds: Vec<Bind>,
    ) -> Self {
        Self {
            name: name.into(),
            exports,
            imports,
            binds,
        }
    }

    /// Rebuilds every bind's expression through `f`, preserving order and
    /// names/types — the module-level counterpart to
    /// [`Expression::map_children`].
    #[must_use]
    pub fn map_binds(self, mut f: impl FnMut(Bind) -> Vec<Bind>) -> Module {
        let binds = self.binds.into_iter().flat_map(&mut f).collect();
        Module::new(self.name, self.exports, self.imports, binds)
    }
}

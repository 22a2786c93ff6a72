//! Desugaring and type inference over the surface AST (spec.md §4.2-4.3):
//! the two passes between parsing and Core translation.

pub mod desugar;
pub mod infer;

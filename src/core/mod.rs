//! Core (STG-style) IR: types, AST, built-in algebraics, translation,
//! validation and canonicalisation (spec.md §3, §4.4-4.6).

pub mod ast;
pub mod builtins;
pub mod canonicalize;
pub mod translate;
pub mod types;
pub mod validate;

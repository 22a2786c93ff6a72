//! Deterministic fresh-name source per desugar scope (spec.md §4.1).
//!
//! Grounded on `original_source/command/compile/desugar/desugar_literals.go`,
//! which threads a `names.NameGenerator` explicitly through one pass rather
//! than reaching for a module-global counter (spec.md §9, "Name generators as
//! implicit state").

/// A per-scope counter that mints identifiers shaped `$<prefix>-<n>`.
///
/// One generator is created per desugar pass invocation and threaded linearly
/// through that pass's bind-by-bind traversal; it is never shared across
/// passes or reset mid-pass.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    module_prefix: String,
    counters: std::collections::HashMap<&'static str, u32>,
}

impl NameGenerator {
    /// Creates a generator scoped to `module_prefix` (used to avoid
    /// cross-module clashes when hoisting complex applications, spec.md
    /// §4.2 step 2).
    #[must_use]
    pub fn new(module_prefix: impl Into<String>) -> Self {
        Self {
            module_prefix: module_prefix.into(),
            counters: std::collections::HashMap::new(),
        }
    }

    /// Generates the next `$<kind>-<n>` name for `kind` (e.g. `"literal"`,
    /// `"list"`).
    pub fn generate(&mut self, kind: &'static str) -> String {
        let n = self.counters.entry(kind).or_insert(0);
        let name = format!("${kind}-{n}");
        *n += 1;
        name
    }

    /// Generates a module-prefixed name for a hoisted complex-application
    /// bind, avoiding clashes between sibling modules' synthetic binds.
    pub fn generate_qualified(&mut self, kind: &'static str) -> String {
        let n = self.counters.entry(kind).or_insert(0);
        let name = if self.module_prefix.is_empty() {
            format!("${kind}-{n}")
        } else {
            format!("${}.{kind}-{n}", self.module_prefix)
        };
        *n += 1;
        name
    }

    /// A fixed compiler-internal scrutinee temporary, e.g. `$head`, `$tail`.
    /// These never carry a counter suffix: every list-case desugaring in a
    /// given nested match reuses the same `$head`/`$tail` pair.
    #[must_use]
    pub fn fixed(kind: &'static str) -> String {
        format!("${kind}")
    }

    /// `$default-alternative.<x>`, the shared witness a surviving default
    /// alternative is captured into (spec.md §4.2 step 3).
    #[must_use]
    pub fn default_alternative_witness(bound_name: &str) -> String {
        format!("$default-alternative.{bound_name}")
    }

    /// `$binary-operation.argument-<n>`.
    pub fn binary_operation_argument(&mut self) -> String {
        let n = self.counters.entry("binary-operation.argument").or_insert(0);
        let name = format!("$binary-operation.argument-{n}");
        *n += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_increasing_suffixes_per_kind() {
        let mut g = NameGenerator::new("");
        assert_eq!(g.generate("literal"), "$literal-0");
        assert_eq!(g.generate("literal"), "$literal-1");
        assert_eq!(g.generate("list"), "$list-0");
        assert_eq!(g.generate("literal"), "$literal-2");
    }

    #[test]
    fn qualifies_with_module_prefix() {
        let mut g = NameGenerator::new("Main");
        assert_eq!(g.generate_qualified("application"), "$Main.application-0");
    }

    #[test]
    fn fixed_names_are_stable() {
        assert_eq!(NameGenerator::fixed("head"), "$head");
        assert_eq!(NameGenerator::fixed("head"), "$head");
    }

    #[test]
    fn default_alternative_witness_is_namespaced_by_bound_name() {
        assert_eq!(
            NameGenerator::default_alternative_witness("x"),
            "$default-alternative.x"
        );
    }
}

//! Source-location metadata threaded through every AST and type node.
//!
//! Grounded on `original_source/command/types/{unboxed,variable}.go`, both of
//! which carry a `*debug.Information` alongside their payload so that a type
//! error can still point at source text after several rewrite passes.

use std::fmt;

/// File, line, column and source-line excerpt for one AST or type node.
///
/// Cloned freely: a single parse produces these once, and every subsequent
/// desugar/infer/translate pass just carries the same `DebugInformation`
/// forward onto the nodes it rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DebugInformation {
    file: String,
    line: u32,
    column: u32,
    source_line: String,
}

impl DebugInformation {
    /// Creates debug information for one source position.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32, column: u32, source_line: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            source_line: source_line.into(),
        }
    }

    /// Debug information for compiler-synthesised nodes that have no source
    /// position of their own (e.g. a lifted `$literal-0` bind).
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new("<synthetic>", 0, 0, "")
    }

    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[must_use]
    pub fn source_line(&self) -> &str {
        &self.source_line
    }
}

impl fmt::Display for DebugInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)?;
        if !self.source_line.is_empty() {
            write!(f, "\n  {}", self.source_line)?;
        }
        Ok(())
    }
}

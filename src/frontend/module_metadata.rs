//! Exported-name/type tables for imported modules (spec.md §3, "Module
//! metadata"; §6, Inputs: "a list of imported module metadata").
//!
//! This is the interface boundary with the out-of-scope module loader: the
//! loader hands this crate a flat list of `(alias, exported name, declared
//! type)` triples, and this module turns it into the lookup table type
//! inference's collection phase consults (spec.md §4.3, "Cross-module
//! imports").

use crate::frontend::ast::Import;
use crate::frontend::types::Type;
use std::collections::HashMap;

/// The initial type environment contributed by a module's imports, keyed by
/// `<alias>.<name>` exactly as surface `Variable` references spell qualified
/// names.
#[derive(Debug, Default, Clone)]
pub struct ModuleMetadata {
    declared_types: HashMap<String, Type>,
}

impl ModuleMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds metadata from a module's import list.
    #[must_use]
    pub fn from_imports(imports: &[Import]) -> Self {
        let mut declared_types = HashMap::new();
        for import in imports {
            for (name, ty) in &import.exports {
                declared_types.insert(format!("{}.{name}", import.alias), ty.clone());
            }
        }
        Self { declared_types }
    }

    #[must_use]
    pub fn lookup(&self, environment_key: &str) -> Option<&Type> {
        self.declared_types.get(environment_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Type)> {
        self.declared_types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugInformation;

    #[test]
    fn looks_up_qualified_exports() {
        let imports = vec![Import {
            alias: "list".to_string(),
            exports: vec![("map".to_string(), Type::Number(DebugInformation::synthetic()))],
        }];
        let metadata = ModuleMetadata::from_imports(&imports);
        assert_eq!(
            metadata.lookup("list.map"),
            Some(&Type::Number(DebugInformation::synthetic()))
        );
        assert_eq!(metadata.lookup("list.filter"), None);
    }
}

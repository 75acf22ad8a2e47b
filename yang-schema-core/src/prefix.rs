//! Prefix resolver (§4.B): map `(module, prefix)` to the module it names,
//! either the module itself or one of its imports. Works identically over
//! the parsed and compiled facets through [`PrefixScope`]; the context
//! (§context) supplies which facet to scan and turns the resulting module
//! name into a [`crate::model::ModuleId`].

use crate::model::{CompiledModule, Import, ParsedModule, ParsedSubmodule};

/// Whatever a module/submodule facet needs to expose for prefix lookup: its
/// own prefix and its import list. Implemented separately by the parsed and
/// compiled facets of [`crate::model::ModuleRecord`] (and by submodules,
/// whose "own prefix" is the prefix copied from `belongs-to`), so 4.B's
/// "both variants share the same algorithm" holds by construction: there is
/// only one algorithm, [`resolve_prefix_name`].
pub trait PrefixScope {
    fn own_prefix(&self) -> &str;
    fn own_name(&self) -> &str;
    fn imports(&self) -> &[Import];
}

/// Resolve `prefix` against `scope`, returning the name of the module it
/// refers to (either `scope` itself or one of its imports). No diagnostic
/// is produced on a miss — the caller decides what a missing prefix means.
pub fn resolve_prefix_name<'a, S: PrefixScope>(scope: &'a S, prefix: &str) -> Option<&'a str> {
    if scope.own_prefix() == prefix {
        return Some(scope.own_name());
    }
    scope
        .imports()
        .iter()
        .find(|imp| imp.prefix == prefix)
        .map(|imp| imp.module.as_str())
}

impl PrefixScope for ParsedModule {
    fn own_prefix(&self) -> &str {
        &self.prefix
    }
    fn own_name(&self) -> &str {
        &self.name
    }
    fn imports(&self) -> &[Import] {
        &self.imports
    }
}

impl PrefixScope for CompiledModule {
    fn own_prefix(&self) -> &str {
        &self.prefix
    }
    fn own_name(&self) -> &str {
        &self.name
    }
    fn imports(&self) -> &[Import] {
        &self.imports
    }
}

/// A submodule's "own prefix" is the prefix it copies from its
/// `belongs-to` parent, so resolving it returns the parent module's name,
/// not the submodule's own (submodules have no namespace of their own).
impl PrefixScope for ParsedSubmodule {
    fn own_prefix(&self) -> &str {
        &self.belongs_to.prefix
    }
    fn own_name(&self) -> &str {
        &self.belongs_to.module
    }
    fn imports(&self) -> &[Import] {
        &self.imports
    }
}

//! The per-context arena (Design Notes §9): modules, submodules and
//! compiled schema nodes are never owned by value elsewhere, only referred
//! to by the `Copy` handles in [`crate::model`]. `Context` is the single
//! mutable-state owner the library keeps (§9 "never as process-global
//! state"); every entry point takes one explicitly.

use std::path::PathBuf;

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::error::{Error, ErrorKind, Result};
use crate::loader::ImportCallback;
use crate::model::{
    CompiledNode, LatestRevision, ModuleId, ModuleRecord, NodeId, SubmoduleId, SubmoduleRecord,
};
use crate::prefix::resolve_prefix_name;

bitflags! {
    /// Loader configuration bits, mirroring the `ContextFlags` bitset this
    /// library family's FFI-backed sibling exposes on its own `Context`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ContextFlags: u8 {
        /// Consult search directories before the import callback, rather
        /// than after (§4.G step 3).
        const PREFER_SEARCHDIRS      = 1 << 0;
        /// Never consult search directories at all.
        const DISABLE_SEARCHDIRS     = 1 << 1;
        /// Search directories are consulted, but not the current working
        /// directory specifically.
        const DISABLE_SEARCHDIR_CWD  = 1 << 2;
    }
}

/// Which facet of a module/submodule a prefix or type lookup should scan
/// (§4.B: "Runs on either the parsed or compiled facet").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Parsed,
    Compiled,
}

/// Holds every module, submodule and compiled node in one schema graph,
/// plus the loader's acquisition configuration (search dirs, callback,
/// flag bits). One `Context` per thread (§5): nothing here is behind a
/// `Mutex`, so sharing one across threads is a compile error, not a
/// runtime race.
#[derive(Default)]
pub struct Context {
    modules: Vec<ModuleRecord>,
    submodules: Vec<SubmoduleRecord>,
    nodes: Vec<CompiledNode>,
    /// Module name -> every loaded revision's handle, in insertion order.
    by_name: IndexMap<String, Vec<ModuleId>>,
    pub flags: ContextFlags,
    pub search_dirs: Vec<PathBuf>,
    pub import_callback: Option<ImportCallback>,
}

impl Context {
    pub fn new(flags: ContextFlags) -> Self {
        Context {
            flags,
            ..Default::default()
        }
    }

    pub fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    pub fn set_import_callback(&mut self, callback: ImportCallback) {
        self.import_callback = Some(callback);
    }

    // ----- module arena -----

    pub fn module(&self, id: ModuleId) -> &ModuleRecord {
        &self.modules[id.0 as usize]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut ModuleRecord {
        &mut self.modules[id.0 as usize]
    }

    /// Insert a freshly acquired module, indexing it by name for lookup.
    /// Per §5's ordering guarantee, callers must clear `parsing` on the
    /// record themselves before any other code can observe it (insertion
    /// alone does not clear it).
    pub fn insert_module(&mut self, record: ModuleRecord) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.by_name.entry(record.name.clone()).or_default().push(id);
        self.modules.push(record);
        id
    }

    /// Remove a module that failed to load or to compile (§7 "a module
    /// that fails to load is never inserted into the context" — for a
    /// module removed *after* tentative insertion, e.g. a compile failure,
    /// this restores that guarantee). Only ever removes the most recently
    /// inserted record for a name to keep handles to other revisions
    /// stable.
    pub fn remove_module(&mut self, id: ModuleId) {
        let idx = id.0 as usize;
        let name = self.modules[idx].name.clone();
        if let Some(revisions) = self.by_name.get_mut(&name) {
            revisions.retain(|&m| m != id);
            if revisions.is_empty() {
                self.by_name.shift_remove(&name);
            }
        }
        // Leave a dead placeholder so other ModuleIds stay valid indices.
        self.modules[idx] = ModuleRecord {
            name,
            ..Default::default()
        };
    }

    pub fn submodule(&self, id: SubmoduleId) -> &SubmoduleRecord {
        &self.submodules[id.0 as usize]
    }

    pub fn submodule_mut(&mut self, id: SubmoduleId) -> &mut SubmoduleRecord {
        &mut self.submodules[id.0 as usize]
    }

    pub fn insert_submodule(&mut self, record: SubmoduleRecord) -> SubmoduleId {
        let id = SubmoduleId(self.submodules.len() as u32);
        self.submodules.push(record);
        id
    }

    /// Find a submodule already known to this context by name, regardless
    /// of which module includes it — the `parsing` re-entry guard is a
    /// per-name property (§4.G post-parse check), not a per-including-module
    /// one, so include-cycle detection must see it across the whole arena.
    pub fn find_submodule_by_name(&self, name: &str) -> Option<SubmoduleId> {
        self.submodules
            .iter()
            .position(|s| s.name == name)
            .map(|idx| SubmoduleId(idx as u32))
    }

    /// Remove a submodule placeholder that failed to acquire or parse, so a
    /// later, independent load attempt under the same name does not find a
    /// record stuck with `parsing = true` forever.
    pub fn remove_submodule(&mut self, id: SubmoduleId) {
        self.submodules[id.0 as usize] = SubmoduleRecord::default();
    }

    // ----- node arena -----

    pub fn node(&self, id: NodeId) -> &CompiledNode {
        &self.nodes[id.0 as usize]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CompiledNode {
        &mut self.nodes[id.0 as usize]
    }

    pub fn alloc_node(&mut self, node: CompiledNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // ----- registry lookups (§4.G step 1) -----

    /// All loaded revisions of `name`, insertion order.
    pub fn revisions_of(&self, name: &str) -> &[ModuleId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find `name` at an exact revision.
    pub fn find_module_at_revision(&self, name: &str, revision: &str) -> Option<ModuleId> {
        self.revisions_of(name).iter().copied().find(|&id| {
            self.module(id)
                .revisions
                .first()
                .is_some_and(|r| r.date == revision)
        })
    }

    /// Find any revision of `name`, preferring the one confirmed latest
    /// (§4.G step 1: "preferring the one marked `latest_revision=2`").
    pub fn find_module_latest(&self, name: &str) -> Option<ModuleId> {
        let ids = self.revisions_of(name);
        ids.iter()
            .copied()
            .find(|&id| self.module(id).latest_revision == LatestRevision::Confirmed)
            .or_else(|| ids.first().copied())
    }

    /// The currently implemented revision of `name`, if any (§4.G step 2).
    pub fn implemented_revision(&self, name: &str) -> Option<ModuleId> {
        self.revisions_of(name)
            .iter()
            .copied()
            .find(|&id| self.module(id).implemented)
    }

    // ----- prefix resolution (§4.B), threaded through the context -----

    pub fn resolve_prefix(&self, module: ModuleId, prefix: &str, facet: Facet) -> Option<ModuleId> {
        let rec = self.module(module);
        let name = match facet {
            Facet::Parsed => resolve_prefix_name(rec.parsed.as_ref()?, prefix)?,
            Facet::Compiled => resolve_prefix_name(rec.compiled.as_ref()?, prefix)?,
        };
        if name == rec.name {
            Some(module)
        } else {
            self.find_module_latest(name)
        }
    }

    /// §4.G step 2: reject implementing a module if a *different* revision
    /// of the same name is already implemented. `revision` must be the
    /// concrete revision of the module about to be implemented (callers
    /// that have already resolved a candidate id should pass its own
    /// revision, not the caller's possibly-unspecified request, so that
    /// re-implementing the already-implemented revision itself is not
    /// treated as a conflict).
    pub fn check_implemented_conflict(&self, name: &str, revision: Option<&str>) -> Result<()> {
        if let Some(existing) = self.implemented_revision(name) {
            let existing_rev = self.module(existing).revisions.first().map(|r| r.date.as_str());
            if existing_rev != revision {
                return Err(Error::with_path(
                    ErrorKind::Denied,
                    format!("{name}@{}", revision.unwrap_or("")),
                ));
            }
        }
        Ok(())
    }
}

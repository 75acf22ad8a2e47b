//! The data model shared by every component of the core: the parsed and
//! compiled facets of a module/submodule, the closed built-in type set, and
//! the tagged-variant compiled schema tree.
//!
//! Modules and submodules are not owned by value anywhere in this crate;
//! they live in the [`crate::context::Context`] arena and are referred to by
//! the `Copy` handles defined here ([`ModuleId`], [`SubmoduleId`],
//! [`NodeId`]), per the arena-over-raw-pointers guidance for cyclic schema
//! graphs.

use bitflags::bitflags;
use std::path::PathBuf;

/// Opaque, `Copy` handle into a [`crate::context::Context`]'s module arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub(crate) u32);

/// Opaque, `Copy` handle into a [`crate::context::Context`]'s submodule arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmoduleId(pub(crate) u32);

/// Opaque, `Copy` handle into a [`crate::context::Context`]'s compiled schema
/// node arena, shared by every module in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

/// The closed set of 20 YANG built-in type names (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Binary,
    Bits,
    Boolean,
    Decimal64,
    Empty,
    Enumeration,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    String,
    Identityref,
    InstanceIdentifier,
    Leafref,
    Union,
}

impl BuiltinType {
    /// All 20 variants, used by tests and by [`Self::from_name`]'s scan.
    pub const ALL: [BuiltinType; 19] = [
        BuiltinType::Binary,
        BuiltinType::Bits,
        BuiltinType::Boolean,
        BuiltinType::Decimal64,
        BuiltinType::Empty,
        BuiltinType::Enumeration,
        BuiltinType::Int8,
        BuiltinType::Int16,
        BuiltinType::Int32,
        BuiltinType::Int64,
        BuiltinType::Uint8,
        BuiltinType::Uint16,
        BuiltinType::Uint32,
        BuiltinType::Uint64,
        BuiltinType::String,
        BuiltinType::Identityref,
        BuiltinType::InstanceIdentifier,
        BuiltinType::Leafref,
        BuiltinType::Union,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinType::Binary => "binary",
            BuiltinType::Bits => "bits",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Decimal64 => "decimal64",
            BuiltinType::Empty => "empty",
            BuiltinType::Enumeration => "enumeration",
            BuiltinType::Int8 => "int8",
            BuiltinType::Int16 => "int16",
            BuiltinType::Int32 => "int32",
            BuiltinType::Int64 => "int64",
            BuiltinType::Uint8 => "uint8",
            BuiltinType::Uint16 => "uint16",
            BuiltinType::Uint32 => "uint32",
            BuiltinType::Uint64 => "uint64",
            BuiltinType::String => "string",
            BuiltinType::Identityref => "identityref",
            BuiltinType::InstanceIdentifier => "instance-identifier",
            BuiltinType::Leafref => "leafref",
            BuiltinType::Union => "union",
        }
    }

    /// Exact, case-sensitive match against a YANG built-in type name.
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Whether `name` names one of the 20 built-ins (invariant 3, §8).
    pub fn is_builtin_name(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

/// Lifecycle status of a definition. Declaration order doubles as the
/// ordering used by the status auditor (current < deprecated < obsolete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Status {
    #[default]
    Current,
    Deprecated,
    Obsolete,
}

/// `latest_revision` tri-state from the Module data model in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestRevision {
    #[default]
    No,
    Tentative,
    Confirmed,
}

/// `(date: YYYY-MM-DD)` revision entry (§3).
#[derive(Debug, Clone, Default)]
pub struct Revision {
    pub date: String,
    pub description: Option<String>,
    pub reference: Option<String>,
}

/// `(prefix, module-name, optional revision)` import entry (§3). Shared by
/// the parsed and compiled facets; resolution to a [`ModuleId`] happens
/// through [`crate::prefix::resolve_prefix`], not by storing the handle
/// inline, so that an import recorded before its target is loaded is still
/// representable.
#[derive(Debug, Clone, Default)]
pub struct Import {
    pub module: String,
    pub prefix: String,
    pub revision_date: Option<String>,
}

/// `(submodule-name, optional revision)` include entry (§3).
#[derive(Debug, Clone, Default)]
pub struct Include {
    pub submodule: String,
    pub revision_date: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BelongsTo {
    pub module: String,
    pub prefix: String,
}

/// A named derived type (§3 Typedef). `type_ref` is the possibly-prefixed
/// reference string handed to [`crate::types::resolve_type`]; the core does
/// not interpret range/pattern/length restrictions on it (that is the
/// semantic compiler's job, out of scope per §1).
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub type_ref: String,
    pub status: Status,
}

/// The handful of YANG statements that matter to this crate's data model:
/// enough shape to drive typedef scoping, type resolution and
/// schema-nodeid walking. Statements with no bearing on those three
/// concerns (`feature`, `identity`, `extension`, `augment`, `deviation`,
/// `refine`) are the full semantic compiler's province and are not
/// represented — see `DESIGN.md`.
#[derive(Debug, Clone)]
pub enum ParsedSchemaNode {
    Container(ParsedContainer),
    Leaf(ParsedLeaf),
    LeafList(ParsedLeafList),
    List(ParsedList),
    Choice(ParsedChoice),
    Case(ParsedCase),
    Anydata(ParsedLeafLike),
    Anyxml(ParsedLeafLike),
    Uses(ParsedUses),
    TypeDef(TypeDef),
    Grouping(ParsedGrouping),
    Rpc(ParsedAction),
    Action(ParsedAction),
    Notification(ParsedNotification),
}

#[derive(Debug, Clone, Default)]
pub struct ParsedContainer {
    pub name: String,
    pub status: Status,
    pub typedefs: Vec<TypeDef>,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLeaf {
    pub name: String,
    pub status: Status,
    pub type_ref: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLeafList {
    pub name: String,
    pub status: Status,
    pub type_ref: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedLeafLike {
    pub name: String,
    pub status: Status,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedList {
    pub name: String,
    pub status: Status,
    pub key: Option<String>,
    pub typedefs: Vec<TypeDef>,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedChoice {
    pub name: String,
    pub status: Status,
    pub cases: Vec<ParsedCase>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCase {
    pub name: String,
    pub status: Status,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedUses {
    pub grouping: String,
    pub status: Status,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedGrouping {
    pub name: String,
    pub status: Status,
    pub typedefs: Vec<TypeDef>,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedIo {
    pub typedefs: Vec<TypeDef>,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedAction {
    pub name: String,
    pub status: Status,
    pub typedefs: Vec<TypeDef>,
    pub input: Option<ParsedIo>,
    pub output: Option<ParsedIo>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedNotification {
    pub name: String,
    pub status: Status,
    pub typedefs: Vec<TypeDef>,
    pub children: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct MetaInfo {
    pub organization: Option<String>,
    pub contact: Option<String>,
    pub description: Option<String>,
    pub reference: Option<String>,
}

/// Parsed (AST) facet of a module, as a textual parser collaborator would
/// hand back (§6). Shape follows the teacher's pre-merge `ast.rs`, which
/// already keeps `imports`/`includes` directly on the module rather than
/// folding them away during parsing.
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub name: String,
    pub yang_version: Option<String>,
    pub namespace: String,
    pub prefix: String,
    pub imports: Vec<Import>,
    pub includes: Vec<Include>,
    pub meta: MetaInfo,
    pub revisions: Vec<Revision>,
    pub body: Vec<ParsedSchemaNode>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedSubmodule {
    pub name: String,
    pub yang_version: Option<String>,
    pub belongs_to: BelongsTo,
    pub imports: Vec<Import>,
    pub includes: Vec<Include>,
    pub meta: MetaInfo,
    pub revisions: Vec<Revision>,
    pub body: Vec<ParsedSchemaNode>,
}

/// A unit handed back by a [`crate::loader::TextualParser`]: either facet,
/// before the loader has decided which arena slot it belongs in.
#[derive(Debug, Clone)]
pub enum ParsedUnit {
    Module(ParsedModule),
    Submodule(ParsedSubmodule),
}

bitflags! {
    /// Acceptable terminal node types for a schema-nodeid resolution (§4.E).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeTypeMask: u32 {
        const CONTAINER    = 1 << 0;
        const CHOICE       = 1 << 1;
        const CASE         = 1 << 2;
        const LEAF         = 1 << 3;
        const LEAF_LIST    = 1 << 4;
        const LIST         = 1 << 5;
        const ANYXML       = 1 << 6;
        const ANYDATA      = 1 << 7;
        const GROUPING     = 1 << 8;
        const ACTION       = 1 << 9;
        const NOTIFICATION = 1 << 10;
        const INPUT        = 1 << 11;
        const OUTPUT       = 1 << 12;

        /// Convenience mask: any "data node" (the set most callers allow).
        const ANY_DATA_NODE = Self::CONTAINER.bits()
            | Self::LEAF.bits()
            | Self::LEAF_LIST.bits()
            | Self::LIST.bits()
            | Self::ANYXML.bits()
            | Self::ANYDATA.bits()
            | Self::CHOICE.bits()
            | Self::CASE.bits();
    }
}

/// Compiled schema tree node: a tagged variant over the closed nodetype set
/// (§3), not an inheritance hierarchy (Design Notes §9). `parent`/children
/// are [`NodeId`] handles into the context's shared node arena so the tree
/// can be cross-referenced by augment/deviation targeting in the (external)
/// semantic compiler without lifetime gymnastics here.
#[derive(Debug, Clone)]
pub struct CompiledNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub module: ModuleId,
    pub status: Status,
    pub kind: NodeKind,
}

impl CompiledNode {
    pub fn mask(&self) -> NodeTypeMask {
        match &self.kind {
            NodeKind::Container { .. } => NodeTypeMask::CONTAINER,
            NodeKind::Choice { .. } => NodeTypeMask::CHOICE,
            NodeKind::Case { .. } => NodeTypeMask::CASE,
            NodeKind::Leaf => NodeTypeMask::LEAF,
            NodeKind::LeafList => NodeTypeMask::LEAF_LIST,
            NodeKind::List { .. } => NodeTypeMask::LIST,
            NodeKind::Anyxml => NodeTypeMask::ANYXML,
            NodeKind::Anydata => NodeTypeMask::ANYDATA,
            NodeKind::Grouping { .. } => NodeTypeMask::GROUPING,
            NodeKind::Action { .. } => NodeTypeMask::ACTION,
            NodeKind::Notification { .. } => NodeTypeMask::NOTIFICATION,
            NodeKind::Input { .. } => NodeTypeMask::INPUT,
            NodeKind::Output { .. } => NodeTypeMask::OUTPUT,
        }
    }

    /// Typedefs declared directly in this node's lexical scope, if any.
    pub fn typedefs(&self) -> &[TypeDef] {
        match &self.kind {
            NodeKind::Container { typedefs, .. }
            | NodeKind::List { typedefs, .. }
            | NodeKind::Grouping { typedefs, .. }
            | NodeKind::Action { typedefs, .. }
            | NodeKind::Notification { typedefs, .. }
            | NodeKind::Input { typedefs, .. }
            | NodeKind::Output { typedefs, .. } => typedefs,
            NodeKind::Choice { .. }
            | NodeKind::Case { .. }
            | NodeKind::Leaf
            | NodeKind::LeafList
            | NodeKind::Anyxml
            | NodeKind::Anydata => &[],
        }
    }

    /// Direct children, if this kind of node has any (choice/case are
    /// traversed transparently by the nodeid resolver via this list too).
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Container { children, .. }
            | NodeKind::List { children, .. }
            | NodeKind::Case { children, .. }
            | NodeKind::Notification { children, .. }
            | NodeKind::Input { children, .. }
            | NodeKind::Output { children, .. } => children,
            NodeKind::Choice { cases } => cases,
            NodeKind::Grouping { children, .. } => children,
            NodeKind::Action { .. }
            | NodeKind::Leaf
            | NodeKind::LeafList
            | NodeKind::Anyxml
            | NodeKind::Anydata => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Container {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    Choice {
        cases: Vec<NodeId>,
    },
    Case {
        children: Vec<NodeId>,
    },
    Leaf,
    LeafList,
    List {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    Anyxml,
    Anydata,
    Grouping {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    /// Covers both `rpc` and `action` (§3 groups them as one nodetype).
    Action {
        input: Option<NodeId>,
        output: Option<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    Notification {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    Input {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
    Output {
        children: Vec<NodeId>,
        typedefs: Vec<TypeDef>,
    },
}

/// Compiled facet of a module: resolved-enough to drive B/C/E, per §3's
/// "frozen once compiled" lifecycle.
#[derive(Debug, Clone, Default)]
pub struct CompiledModule {
    pub name: String,
    pub prefix: String,
    pub imports: Vec<Import>,
    /// Top-level typedefs, module + submodules merged (§3 invariant 3).
    pub typedefs: Vec<TypeDef>,
    pub top_nodes: Vec<NodeId>,
}

/// One module slot in the context arena (§3 Module + lifecycle fields).
#[derive(Debug, Clone, Default)]
pub struct ModuleRecord {
    pub name: String,
    pub parsed: Option<ParsedModule>,
    pub compiled: Option<CompiledModule>,
    pub revisions: Vec<Revision>,
    pub implemented: bool,
    pub latest_revision: LatestRevision,
    /// Re-entry guard (§3 invariant 8, §5 "sole cycle guard").
    pub parsing: bool,
    pub path: Option<PathBuf>,
    pub submodules: Vec<SubmoduleId>,
}

impl ModuleRecord {
    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }
}

/// One submodule slot in the context arena (§3 Submodule).
#[derive(Debug, Clone, Default)]
pub struct SubmoduleRecord {
    pub name: String,
    pub parsed: Option<ParsedSubmodule>,
    pub parsing: bool,
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_round_trips_every_name() {
        for t in BuiltinType::ALL {
            assert_eq!(BuiltinType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn builtin_rejects_near_miss() {
        assert_eq!(BuiltinType::from_name("strings"), None);
        assert_eq!(BuiltinType::from_name("String"), None);
    }

    #[test]
    fn status_orders_current_below_obsolete() {
        assert!(Status::Current < Status::Deprecated);
        assert!(Status::Deprecated < Status::Obsolete);
    }
}

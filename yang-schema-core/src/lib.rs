//! Schema helper core for a YANG (RFC 7950) schema processing library.
//!
//! This crate implements the parts of a YANG toolchain that sit below the
//! textual parser and above the data-tree validator: lexical primitives
//! (identifiers, nodeids, dates, keywords), prefix/type/schema-nodeid
//! resolution, typedef collision checking, revision auditing, and the
//! module loader that ties a [`context::Context`] together.
//!
//! What this crate does *not* do: tokenize YANG/YIN source text (see
//! [`loader::TextualParser`]), or run the full semantic compiler that turns
//! a parsed module into validated constraints (augment/deviation/feature
//! resolution, range/pattern/length checking). Those are external
//! collaborators this crate exposes seams for, not implementations of.

pub mod context;
pub mod error;
pub mod ident;
pub mod keyword;
pub mod loader;
pub mod model;
pub mod nodeid;
pub mod prefix;
pub mod status;
pub mod typedef;
pub mod types;

pub use context::{Context, ContextFlags, Facet};
pub use error::{Error, ErrorKind, Result};
pub use ident::{is_ident_continue, is_ident_start, parse_identifier, split_nodeid, validate_date, NodeIdSegment};
pub use keyword::{recognize, Keyword};
pub use loader::{ImportCallback, ImportRequest, ImportedData, ModuleLoader, SourceFormat, TextualParser};
pub use model::{
    BuiltinType, CompiledModule, CompiledNode, LatestRevision, ModuleId, ModuleRecord, NodeId,
    NodeKind, NodeTypeMask, ParsedModule, ParsedSubmodule, ParsedUnit, Status, SubmoduleId,
    SubmoduleRecord, TypeDef,
};
pub use nodeid::{resolve_schema_nodeid, ResolveFlags, Resolved};
pub use prefix::{resolve_prefix_name, PrefixScope};
pub use status::{check_status, sort_revisions};
pub use typedef::{check_scoped, check_top_level};
pub use types::{resolve_type, ResolvedType, TypedefScope};

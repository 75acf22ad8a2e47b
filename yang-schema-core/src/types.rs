//! Type resolver (§4.C): resolve a (possibly prefixed) type reference
//! string to either a built-in type or a specific typedef, by walking the
//! lexical scope chain outward from a starting node before falling back to
//! the module's (and its submodules') top-level typedefs.

use crate::context::{Context, Facet};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{BuiltinType, ModuleId, NodeId, TypeDef};

/// What a type reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Builtin(BuiltinType),
    Typedef {
        module: ModuleId,
        /// The lexical scope the typedef was found in, for diagnostics.
        scope: TypedefScope,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedefScope {
    /// Found in an ancestor node's own typedef list.
    Node(NodeId),
    /// Found at the module (or one of its submodules') top level.
    TopLevel,
}

/// Resolve `type_ref` (e.g. `"string"`, `"t1"`, `"pfx:t1"`) as seen from
/// `home_module` at lexical position `context_node` (`None` for a top-level
/// typedef reference). Implements §4.C's algorithm: split on `:`, resolve a
/// prefix if present (an unknown prefix is a hard error, never a quiet
/// miss), check the built-in set first when unprefixed, then walk the
/// typedef's own node outward before the module's top level.
pub fn resolve_type(
    ctx: &Context,
    home_module: ModuleId,
    context_node: Option<NodeId>,
    type_ref: &str,
) -> Result<ResolvedType> {
    let (prefix, name) = match type_ref.split_once(':') {
        Some((p, n)) => (Some(p), n),
        None => (None, type_ref),
    };

    let target_module = match prefix {
        None => {
            if let Some(builtin) = BuiltinType::from_name(name) {
                return Ok(ResolvedType::Builtin(builtin));
            }
            home_module
        }
        Some(p) => ctx
            .resolve_prefix(home_module, p, Facet::Compiled)
            .ok_or_else(|| Error::with_path(ErrorKind::ReferenceError, type_ref.to_string()))?,
    };

    // Only an unprefixed reference may walk the lexical scope chain: a
    // prefixed reference always names something at the target module's top
    // level (RFC 7950 typedefs are never qualified by a node path).
    if prefix.is_none() {
        let mut cursor = context_node;
        while let Some(id) = cursor {
            let node = ctx.node(id);
            if node.typedefs().iter().any(|t| t.name == name) {
                return Ok(ResolvedType::Typedef {
                    module: home_module,
                    scope: TypedefScope::Node(id),
                });
            }
            cursor = node.parent;
        }
    }

    if find_top_level(ctx, target_module, name).is_some() {
        return Ok(ResolvedType::Typedef {
            module: target_module,
            scope: TypedefScope::TopLevel,
        });
    }

    Err(Error::with_path(ErrorKind::ReferenceError, type_ref.to_string()))
}

fn find_top_level<'a>(ctx: &'a Context, module: ModuleId, name: &str) -> Option<&'a TypeDef> {
    ctx.module(module)
        .compiled
        .as_ref()?
        .typedefs
        .iter()
        .find(|t| t.name == name)
}

//! Schema-nodeid resolver (§4.E): walk a `/`-separated path through the
//! compiled schema tree from an absolute or descendant starting point,
//! resolving prefixes per segment, transparently descending through
//! choice/case, and special-casing RPC/action `input`/`output`.

use bitflags::bitflags;

use crate::context::{Context, Facet};
use crate::error::{Error, ErrorKind, Result};
use crate::ident::split_nodeid;
use crate::model::{ModuleId, NodeId, NodeKind, NodeTypeMask};

bitflags! {
    /// Result flags set while descending (§4.E steps 3 and 5).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ResolveFlags: u8 {
        const RPC_INPUT     = 1 << 0;
        const RPC_OUTPUT    = 1 << 1;
        const IN_NOTIFICATION = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub node: NodeId,
    pub flags: ResolveFlags,
}

/// Resolve `nodeid` from `start` (`None` ⇒ absolute, the string must begin
/// with `/`; `Some(node)` ⇒ descendant, must not). `context_module` is used
/// to resolve unprefixed segments. `accept` is the bitmask the final node's
/// type must belong to. `implement`, when set, marks every module visited
/// along the way as implemented.
pub fn resolve_schema_nodeid(
    ctx: &mut Context,
    start: Option<NodeId>,
    context_module: ModuleId,
    nodeid: &str,
    accept: NodeTypeMask,
    implement: bool,
) -> Result<Resolved> {
    let is_absolute = nodeid.starts_with('/');
    if is_absolute != start.is_none() {
        return Err(Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()));
    }

    let mut rest = if is_absolute { &nodeid[1..] } else { nodeid };
    if rest.is_empty() {
        return Err(Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()));
    }

    let mut current = start;
    let mut flags = ResolveFlags::empty();

    loop {
        let (segment, remainder) = split_nodeid(rest).map_err(|_| {
            Error::with_path(ErrorKind::InvalidInput, format!("{nodeid} at {rest}"))
        })?;

        let resolved_module = match segment.prefix {
            Some(p) => ctx
                .resolve_prefix(context_module, p, Facet::Compiled)
                .ok_or_else(|| Error::with_path(ErrorKind::ReferenceError, nodeid.to_string()))?,
            None => context_module,
        };

        if implement {
            ctx.module_mut(resolved_module).implemented = true;
        }

        current = Some(descend(ctx, current, resolved_module, segment.name, &mut flags, nodeid)?);

        if remainder.is_empty() {
            break;
        }
        rest = remainder.strip_prefix('/').ok_or_else(|| {
            Error::with_path(ErrorKind::InvalidInput, format!("{nodeid} at {remainder}"))
        })?;
        if rest.is_empty() {
            return Err(Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()));
        }
    }

    let node = current.ok_or_else(|| Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()))?;
    let found = ctx.node(node);
    if !accept.contains(found.mask()) {
        return Err(Error::with_path(ErrorKind::Denied, nodeid.to_string()));
    }

    Ok(Resolved { node, flags })
}

fn descend(
    ctx: &Context,
    current: Option<NodeId>,
    module: ModuleId,
    name: &str,
    flags: &mut ResolveFlags,
    nodeid: &str,
) -> Result<NodeId> {
    if let Some(cur_id) = current {
        let cur = ctx.node(cur_id);
        if let NodeKind::Action { input, output, .. } = &cur.kind {
            match name {
                "input" => {
                    flags.insert(ResolveFlags::RPC_INPUT);
                    return input.ok_or_else(|| Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()));
                }
                "output" => {
                    flags.insert(ResolveFlags::RPC_OUTPUT);
                    return output.ok_or_else(|| Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()));
                }
                _ => {
                    // Default child set is the action's input.
                    let into = input.ok_or_else(|| Error::with_path(ErrorKind::InvalidInput, nodeid.to_string()))?;
                    flags.insert(ResolveFlags::RPC_INPUT);
                    return find_child(ctx, into, module, name, flags, nodeid);
                }
            }
        }
        find_child(ctx, cur_id, module, name, flags, nodeid)
    } else {
        find_top_level(ctx, module, name)
            .ok_or_else(|| Error::with_path(ErrorKind::NotFound, nodeid.to_string()))
    }
}

/// Look up a direct child of `parent` by `(name, module)`, descending
/// transparently through any intervening choice/case (§4.E step 4: "the
/// child search must include choice/case nodes transparently").
fn find_child(
    ctx: &Context,
    parent: NodeId,
    module: ModuleId,
    name: &str,
    flags: &mut ResolveFlags,
    nodeid: &str,
) -> Result<NodeId> {
    for &child_id in ctx.node(parent).children() {
        let child = ctx.node(child_id);
        if matches!(child.kind, NodeKind::Choice { .. } | NodeKind::Case { .. }) {
            if let Ok(found) = find_child(ctx, child_id, module, name, flags, nodeid) {
                return Ok(found);
            }
            continue;
        }
        if child.name == name && child.module == module {
            if matches!(child.kind, NodeKind::Notification { .. }) {
                flags.insert(ResolveFlags::IN_NOTIFICATION);
            }
            return Ok(child_id);
        }
    }
    Err(Error::with_path(ErrorKind::NotFound, nodeid.to_string()))
}

fn find_top_level(ctx: &Context, module: ModuleId, name: &str) -> Option<NodeId> {
    ctx.module(module)
        .compiled
        .as_ref()?
        .top_nodes
        .iter()
        .copied()
        .find(|&id| ctx.node(id).name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextFlags;
    use crate::model::{CompiledModule, CompiledNode, ModuleRecord, Status};

    fn setup() -> (Context, ModuleId) {
        let mut ctx = Context::new(ContextFlags::empty());
        let m = ctx.insert_module(ModuleRecord {
            name: "m".into(),
            compiled: Some(CompiledModule {
                name: "m".into(),
                prefix: "m-pfx".into(),
                ..Default::default()
            }),
            ..Default::default()
        });
        (ctx, m)
    }

    #[test]
    fn s4_schema_nodeid_descent_into_rpc() {
        let (mut ctx, m) = setup();
        let leaf_a = ctx.alloc_node(CompiledNode {
            name: "a".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Leaf,
        });
        let input = ctx.alloc_node(CompiledNode {
            name: "input".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Input {
                children: vec![leaf_a],
                typedefs: vec![],
            },
        });
        let doit = ctx.alloc_node(CompiledNode {
            name: "doit".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Action {
                input: Some(input),
                output: None,
                typedefs: vec![],
            },
        });

        let resolved = resolve_schema_nodeid(
            &mut ctx,
            Some(doit),
            m,
            "input/a",
            NodeTypeMask::ANY_DATA_NODE,
            false,
        )
        .unwrap();
        assert_eq!(resolved.node, leaf_a);
        assert!(resolved.flags.contains(ResolveFlags::RPC_INPUT));
    }

    #[test]
    fn absolute_path_requires_no_context_node() {
        let (mut ctx, m) = setup();
        let top = ctx.alloc_node(CompiledNode {
            name: "top".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Container {
                children: vec![],
                typedefs: vec![],
            },
        });
        ctx.module_mut(m).compiled.as_mut().unwrap().top_nodes.push(top);

        let resolved =
            resolve_schema_nodeid(&mut ctx, None, m, "/top", NodeTypeMask::CONTAINER, false).unwrap();
        assert_eq!(resolved.node, top);

        let err = resolve_schema_nodeid(&mut ctx, None, m, "top", NodeTypeMask::CONTAINER, false)
            .unwrap_err();
        assert!(err.is_kind(ErrorKind::InvalidInput));
    }

    #[test]
    fn choice_case_are_traversed_transparently() {
        let (mut ctx, m) = setup();
        let leaf = ctx.alloc_node(CompiledNode {
            name: "x".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Leaf,
        });
        let case = ctx.alloc_node(CompiledNode {
            name: "c".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Case { children: vec![leaf] },
        });
        let choice = ctx.alloc_node(CompiledNode {
            name: "ch".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Choice { cases: vec![case] },
        });
        let top = ctx.alloc_node(CompiledNode {
            name: "top".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Container {
                children: vec![choice],
                typedefs: vec![],
            },
        });

        let resolved = resolve_schema_nodeid(
            &mut ctx,
            Some(top),
            m,
            "x",
            NodeTypeMask::LEAF,
            false,
        )
        .unwrap();
        assert_eq!(resolved.node, leaf);
    }

    #[test]
    fn wrong_terminal_type_is_denied() {
        let (mut ctx, m) = setup();
        let top = ctx.alloc_node(CompiledNode {
            name: "top".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Container {
                children: vec![],
                typedefs: vec![],
            },
        });
        ctx.module_mut(m).compiled.as_mut().unwrap().top_nodes.push(top);

        let err = resolve_schema_nodeid(&mut ctx, None, m, "/top", NodeTypeMask::LEAF, false)
            .unwrap_err();
        assert!(err.is_kind(ErrorKind::Denied));
    }

    #[test]
    fn notification_descent_sets_in_notification_flag() {
        let (mut ctx, m) = setup();
        let notif = ctx.alloc_node(CompiledNode {
            name: "evt".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Notification {
                children: vec![],
                typedefs: vec![],
            },
        });
        let top = ctx.alloc_node(CompiledNode {
            name: "top".into(),
            parent: None,
            module: m,
            status: Status::Current,
            kind: NodeKind::Container {
                children: vec![notif],
                typedefs: vec![],
            },
        });

        let resolved = resolve_schema_nodeid(
            &mut ctx,
            Some(top),
            m,
            "evt",
            NodeTypeMask::NOTIFICATION,
            false,
        )
        .unwrap();
        assert_eq!(resolved.node, notif);
        assert!(resolved.flags.contains(ResolveFlags::IN_NOTIFICATION));
    }
}

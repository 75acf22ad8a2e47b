//! Typedef collision checker (§4.D): one pass per module after parsing,
//! populating a `globals` set (top-level names, module + submodules) and a
//! `scoped` set (names seen under any schema-node), catching three kinds of
//! collision: top-level-vs-top-level, scoped-vs-sibling, and
//! scoped-vs-ancestor-scoped.
//!
//! §9's Open Question: the source's scoped-vs-global branch rejects a
//! scoped typedef whose name is *absent* from `globals`. RFC 7950 §6.2.1
//! makes a node-scoped typedef with no top-level counterpart legal — it is
//! simply local to that node — so that branch is not reproduced here; only
//! genuine collisions are rejected. The `globals` set still exists, and is
//! still consulted, but solely to catch a scoped name that shadows a real
//! top-level one (S8's global-vs-global case and its scoped analogue).

use std::collections::HashSet;

use crate::error::{Error, ErrorKind, Result};
use crate::model::{BuiltinType, TypeDef};

/// Check every top-level typedef (module + submodules, in that order) for
/// collisions, returning the populated `globals` set for reuse by the
/// scoped pass. A collision aborts with a path-qualified diagnostic
/// (§4.D step 3).
pub fn check_top_level(path: &str, typedefs: &[&[TypeDef]]) -> Result<HashSet<String>> {
    let mut globals = HashSet::new();
    for list in typedefs {
        for t in *list {
            if BuiltinType::is_builtin_name(&t.name) {
                return Err(Error::with_path(ErrorKind::Collision, format!("{path}/{}", t.name)));
            }
            if !globals.insert(t.name.clone()) {
                return Err(Error::with_path(ErrorKind::Collision, format!("{path}/{}", t.name)));
            }
        }
    }
    Ok(globals)
}

/// Check one schema-node's local typedefs against its ancestor chain and
/// the module-wide `globals` set populated by [`check_top_level`]. Ancestor
/// lists must be given outermost-first (root to immediate parent); sibling
/// collisions within the same node are caught by scanning earlier entries
/// in `typedefs` itself.
///
/// A scoped name absent from `globals` is *not* rejected (see module docs);
/// a scoped name that collides with `globals`, a sibling, or an ancestor's
/// scope is.
pub fn check_scoped(
    node_path: &str,
    typedefs: &[TypeDef],
    ancestors: &[&[TypeDef]],
    globals: &HashSet<String>,
    scoped: &mut HashSet<String>,
) -> Result<()> {
    for (i, t) in typedefs.iter().enumerate() {
        if BuiltinType::is_builtin_name(&t.name) {
            return Err(Error::with_path(ErrorKind::Collision, format!("{node_path}/{}", t.name)));
        }
        if typedefs[..i].iter().any(|sib| sib.name == t.name) {
            return Err(Error::with_path(ErrorKind::Collision, format!("{node_path}/{}", t.name)));
        }
        if ancestors.iter().any(|anc| anc.iter().any(|a| a.name == t.name)) {
            return Err(Error::with_path(ErrorKind::Collision, format!("{node_path}/{}", t.name)));
        }
        if globals.contains(&t.name) {
            return Err(Error::with_path(ErrorKind::Collision, format!("{node_path}/{}", t.name)));
        }
        scoped.insert(t.name.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;

    fn td(name: &str) -> TypeDef {
        TypeDef {
            name: name.to_string(),
            type_ref: "string".into(),
            status: Status::Current,
        }
    }

    #[test]
    fn s8_typedef_global_collision() {
        let module_level: &[TypeDef] = &[td("T")];
        let submodule_level: &[TypeDef] = &[td("T")];
        let err = check_top_level("M", &[module_level, submodule_level]).unwrap_err();
        assert!(err.is_kind(ErrorKind::Collision));
    }

    #[test]
    fn invariant_4_distinct_top_level_names_are_accepted() {
        let module_level: &[TypeDef] = &[td("T1"), td("T2")];
        assert!(check_top_level("M", &[module_level]).is_ok());
    }

    #[test]
    fn invariant_3_builtin_name_collision_is_rejected() {
        let module_level: &[TypeDef] = &[td("string")];
        let err = check_top_level("M", &[module_level]).unwrap_err();
        assert!(err.is_kind(ErrorKind::Collision));
    }

    #[test]
    fn scoped_typedef_absent_from_globals_is_legal() {
        let globals = check_top_level("M", &[&[td("Other")]]).unwrap();
        let mut scoped = HashSet::new();
        let local = [td("Local")];
        assert!(check_scoped("M/container", &local, &[], &globals, &mut scoped).is_ok());
        assert!(scoped.contains("Local"));
    }

    #[test]
    fn scoped_sibling_collision_is_rejected() {
        let globals = HashSet::new();
        let mut scoped = HashSet::new();
        let local = [td("A"), td("A")];
        let err = check_scoped("M/container", &local, &[], &globals, &mut scoped).unwrap_err();
        assert!(err.is_kind(ErrorKind::Collision));
    }

    #[test]
    fn scoped_vs_ancestor_collision_is_rejected() {
        let globals = HashSet::new();
        let mut scoped = HashSet::new();
        let ancestor: &[TypeDef] = &[td("A")];
        let local = [td("A")];
        let err = check_scoped("M/container/leaf", &local, &[ancestor], &globals, &mut scoped).unwrap_err();
        assert!(err.is_kind(ErrorKind::Collision));
    }

    #[test]
    fn scoped_vs_global_collision_is_rejected() {
        let globals = check_top_level("M", &[&[td("A")]]).unwrap();
        let mut scoped = HashSet::new();
        let local = [td("A")];
        let err = check_scoped("M/container", &local, &[], &globals, &mut scoped).unwrap_err();
        assert!(err.is_kind(ErrorKind::Collision));
    }
}

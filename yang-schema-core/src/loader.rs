//! Module loader (§4.G): acquire and link a referenced module or submodule,
//! enforcing revision uniqueness and import/include cycle invariants.
//!
//! The textual tokenizer that turns YANG/YIN bytes into a [`ParsedUnit`] is
//! an external collaborator (§6): this crate only defines the seam,
//! [`TextualParser`], and drives it. No concrete implementation ships here.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::context::{Context, ContextFlags};
use crate::error::{Error, ErrorKind, Result};
use crate::ident::validate_date;
use crate::model::{
    LatestRevision, ModuleId, ModuleRecord, ParsedModule, ParsedSubmodule, ParsedUnit, SubmoduleId,
    SubmoduleRecord,
};

/// `yang` or `yin` source, as tagged by whichever collaborator handed the
/// bytes over (§6: "file descriptor and format tag").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Yang,
    Yin,
}

/// What the textual parser collaborator is asked to turn into a
/// [`ParsedUnit`].
pub trait TextualParser {
    fn parse(&self, format: SourceFormat, data: &[u8]) -> Result<ParsedUnit>;
}

/// `(module-name, revision?, submodule-name?, submodule-revision?)` passed
/// to the user-supplied import callback (§6). `user_data` from the original
/// C signature has no counterpart here: a Rust closure already closes over
/// whatever state it needs.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub module_name: String,
    pub revision: Option<String>,
    pub submodule_name: Option<String>,
    pub submodule_revision: Option<String>,
}

/// What a successful callback or filesystem lookup hands back: the raw
/// bytes and their format. An owned buffer, per Design Notes §9's "prefer
/// returning an owned buffer... the deallocator pattern is unnecessary".
#[derive(Debug, Clone)]
pub struct ImportedData {
    pub format: SourceFormat,
    pub data: Vec<u8>,
}

/// `Box<dyn Fn>` replacing the C callback + deallocator pair (§6,
/// Design Notes §9).
pub type ImportCallback = Box<dyn Fn(&ImportRequest) -> Option<ImportedData>>;

/// What the caller expects to find once acquisition finishes (§4.G
/// "Post-parse check").
#[derive(Debug, Clone, Default)]
pub struct ExpectedUnit {
    pub name: Option<String>,
    pub revision: Option<String>,
    pub parent: Option<String>,
}

pub struct ModuleLoader<'p, P: TextualParser> {
    pub parser: &'p P,
}

impl<'p, P: TextualParser> ModuleLoader<'p, P> {
    pub fn new(parser: &'p P) -> Self {
        ModuleLoader { parser }
    }

    /// Acquire module `name` (optionally at `revision`), implementing it if
    /// `implement` is set. Implements §4.G steps 1-5 (step 6, the compile
    /// pipeline, is the semantic compiler's province and is left to the
    /// caller — see `post_implement`).
    pub fn load_module(
        &self,
        ctx: &mut Context,
        name: &str,
        revision: Option<&str>,
        implement: bool,
    ) -> Result<ModuleId> {
        if let Some(id) = self.lookup_registry(ctx, name, revision)? {
            if implement {
                // Check against `id`'s own revision, not the caller's
                // possibly-unspecified request: re-implementing the
                // already-implemented revision itself is a no-op, not a
                // conflict (invariant 7 allows at most one implemented
                // revision, and `id` may already be it).
                let id_revision = ctx.module(id).revisions.first().map(|r| r.date.as_str());
                ctx.check_implemented_conflict(name, id_revision)?;
                ctx.module_mut(id).implemented = true;
            }
            return Ok(id);
        }

        if implement {
            ctx.check_implemented_conflict(name, revision)?;
        }

        let request = ImportRequest {
            module_name: name.to_string(),
            revision: revision.map(str::to_string),
            submodule_name: None,
            submodule_revision: None,
        };
        let (data, path) = self.acquire(ctx, &request)?;
        let unit = self.parser.parse(data.format, &data.data)?;
        let parsed = match unit {
            ParsedUnit::Module(m) => m,
            ParsedUnit::Submodule(_) => {
                return Err(Error::with_path(ErrorKind::InvalidInput, name.to_string()))
            }
        };

        check_post_parse(
            &ExpectedUnit {
                name: Some(name.to_string()),
                revision: revision.map(str::to_string),
                parent: None,
            },
            &parsed.name,
            parsed.revisions.first().map(|r| r.date.as_str()),
            path.as_deref(),
        )?;

        let promote = revision.is_none();
        let record = ModuleRecord {
            name: parsed.name.clone(),
            latest_revision: if promote {
                LatestRevision::Confirmed
            } else {
                LatestRevision::No
            },
            implemented: implement,
            path,
            parsed: Some(parsed),
            ..Default::default()
        };

        Ok(ctx.insert_module(record))
    }

    /// Acquire a submodule belonging to `parent`, following the same
    /// callback-then-filesystem order, with the submodule-specific
    /// `belongs-to` and re-entry checks (§4.G post-parse check).
    ///
    /// Mirrors the module path's `lookup_registry`: a submodule already
    /// known under `name` with `parsing == true` is an include cycle (the
    /// including chain re-entered a submodule that is still being
    /// acquired), not a fresh load. A previously completed submodule is
    /// returned as-is rather than re-acquired.
    pub fn load_submodule(
        &self,
        ctx: &mut Context,
        parent: ModuleId,
        name: &str,
        revision: Option<&str>,
    ) -> Result<SubmoduleId> {
        if let Some(existing) = ctx.find_submodule_by_name(name) {
            if ctx.submodule(existing).parsing {
                return Err(Error::with_path(ErrorKind::Cycle, name.to_string()));
            }
            ctx.module_mut(parent).submodules.push(existing);
            return Ok(existing);
        }

        let parent_name = ctx.module(parent).name.clone();
        let placeholder = ctx.insert_submodule(SubmoduleRecord {
            name: name.to_string(),
            parsing: true,
            ..Default::default()
        });

        match self.acquire_submodule(ctx, &parent_name, name, revision) {
            Ok((parsed, path)) => {
                let rec = ctx.submodule_mut(placeholder);
                rec.name = parsed.name.clone();
                rec.parsed = Some(parsed);
                rec.path = path;
                rec.parsing = false;
                ctx.module_mut(parent).submodules.push(placeholder);
                Ok(placeholder)
            }
            Err(err) => {
                ctx.remove_submodule(placeholder);
                Err(err)
            }
        }
    }

    fn acquire_submodule(
        &self,
        ctx: &mut Context,
        parent_name: &str,
        name: &str,
        revision: Option<&str>,
    ) -> Result<(ParsedSubmodule, Option<PathBuf>)> {
        let request = ImportRequest {
            module_name: parent_name.to_string(),
            revision: None,
            submodule_name: Some(name.to_string()),
            submodule_revision: revision.map(str::to_string),
        };
        let (data, path) = self.acquire(ctx, &request)?;
        let unit = self.parser.parse(data.format, &data.data)?;

        let parsed = match unit {
            ParsedUnit::Submodule(s) => s,
            ParsedUnit::Module(_) => {
                return Err(Error::with_path(ErrorKind::InvalidInput, name.to_string()))
            }
        };

        if parsed.belongs_to.module != parent_name {
            return Err(Error::with_path(ErrorKind::ReferenceError, name.to_string()));
        }

        check_post_parse(
            &ExpectedUnit {
                name: Some(name.to_string()),
                revision: revision.map(str::to_string),
                parent: Some(parent_name.to_string()),
            },
            &parsed.name,
            parsed.revisions.first().map(|r| r.date.as_str()),
            path.as_deref(),
        )?;

        Ok((parsed, path))
    }

    fn lookup_registry(
        &self,
        ctx: &Context,
        name: &str,
        revision: Option<&str>,
    ) -> Result<Option<ModuleId>> {
        let found = match revision {
            Some(rev) => ctx.find_module_at_revision(name, rev),
            None => ctx.find_module_latest(name),
        };
        if let Some(id) = found {
            // §4.G "Import-cycle detection": a module currently being
            // parsed that is re-entered fails with *cycle*, not returned.
            if ctx.module(id).parsing {
                return Err(Error::with_path(ErrorKind::Cycle, name.to_string()));
            }
        }
        Ok(found)
    }

    /// Try the callback, then the filesystem, in the order `prefer-searchdirs`
    /// dictates (§4.G step 3).
    fn acquire(&self, ctx: &Context, request: &ImportRequest) -> Result<(ImportedData, Option<PathBuf>)> {
        let target = request.submodule_name.as_deref().unwrap_or(&request.module_name);
        let target_revision = request
            .submodule_revision
            .as_deref()
            .or(request.revision.as_deref());

        let try_callback = || -> Option<ImportedData> {
            ctx.import_callback.as_ref().and_then(|cb| cb(request))
        };
        let try_filesystem = || -> Option<(ImportedData, PathBuf)> {
            self.scan_search_dirs(ctx, target, target_revision)
        };

        let result = if ctx.flags.contains(ContextFlags::PREFER_SEARCHDIRS) {
            try_filesystem()
                .map(|(d, p)| (d, Some(p)))
                .or_else(|| try_callback().map(|d| (d, None)))
        } else {
            try_callback()
                .map(|d| (d, None))
                .or_else(|| try_filesystem().map(|(d, p)| (d, Some(p))))
        };

        result.ok_or_else(|| Error::with_path(ErrorKind::NotFound, target.to_string()))
    }

    fn scan_search_dirs(
        &self,
        ctx: &Context,
        name: &str,
        revision: Option<&str>,
    ) -> Option<(ImportedData, PathBuf)> {
        if ctx.flags.contains(ContextFlags::DISABLE_SEARCHDIRS) {
            return None;
        }

        let mut dirs: Vec<&Path> = ctx.search_dirs.iter().map(PathBuf::as_path).collect();
        if !ctx.flags.contains(ContextFlags::DISABLE_SEARCHDIR_CWD) {
            dirs.push(Path::new("."));
        }

        for dir in dirs {
            if let Some(hit) = find_in_dir(dir, name, revision) {
                let bytes = fs::read(&hit).ok()?;
                let format = if hit.extension().and_then(|e| e.to_str()) == Some("yin") {
                    SourceFormat::Yin
                } else {
                    SourceFormat::Yang
                };
                return Some((ImportedData { format, data: bytes }, hit));
            }
        }
        None
    }
}

/// Enumerate `dir` for `name[@revision].{yang|yin}` (§6 "Search-directory
/// protocol"). An exact revision is matched literally; otherwise the
/// lexicographically largest dated file wins, falling back to the bare
/// `name.ext`. `.yang` wins a tie with `.yin` at the same revision.
fn find_in_dir(dir: &Path, name: &str, revision: Option<&str>) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut best: Option<(Option<String>, bool, PathBuf)> = None; // (rev, is_yang, path)

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(stem_ext) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let Some((stem, ext)) = stem_ext.rsplit_once('.') else {
            continue;
        };
        let is_yang = match ext {
            "yang" => true,
            "yin" => false,
            _ => continue,
        };

        let (file_name, file_rev) = match stem.split_once('@') {
            Some((n, r)) => (n, Some(r.to_string())),
            None => (stem, None),
        };
        if file_name != name {
            continue;
        }
        if let Some(rev) = &file_rev {
            if validate_date(rev).is_err() {
                warn!("{dir:?}: {stem_ext} has a malformed revision suffix");
                continue;
            }
        }

        if let Some(wanted) = revision {
            if file_rev.as_deref() != Some(wanted) {
                continue;
            }
        }

        let better = match &best {
            None => true,
            Some((best_rev, best_is_yang, _)) => match (&file_rev, best_rev) {
                (Some(a), Some(b)) => a > b || (a == b && is_yang && !best_is_yang),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => is_yang && !best_is_yang,
            },
        };
        if better {
            best = Some((file_rev, is_yang, path));
        }
    }

    best.map(|(_, _, path)| {
        debug!("resolved {name} to {path:?}");
        path
    })
}

/// §4.G "Post-parse check": reconcile what the caller expected against
/// what the parser actually produced.
fn check_post_parse(
    expected: &ExpectedUnit,
    actual_name: &str,
    actual_revision: Option<&str>,
    path: Option<&Path>,
) -> Result<()> {
    if let Some(name) = &expected.name {
        if name != actual_name {
            return Err(Error::with_path(ErrorKind::InvalidInput, actual_name.to_string()));
        }
    }
    if let (Some(expected_rev), Some(actual_rev)) = (&expected.revision, actual_revision) {
        if expected_rev != actual_rev {
            return Err(Error::with_path(ErrorKind::InvalidInput, actual_name.to_string()));
        }
    }
    if let Some(path) = path {
        if !file_name_matches(path, actual_name, actual_revision) {
            warn!("{path:?} does not follow the name[@revision].ext convention");
        }
    }
    Ok(())
}

fn file_name_matches(path: &Path, name: &str, revision: Option<&str>) -> bool {
    let Some(stem_ext) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    let Some((stem, ext)) = stem_ext.rsplit_once('.') else {
        return false;
    };
    if ext != "yang" && ext != "yin" {
        return false;
    }
    match stem.split_once('@') {
        Some((n, r)) => n == name && Some(r) == revision,
        None => stem == name && revision.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextFlags;
    use crate::model::{BelongsTo, Revision};

    struct FixtureParser {
        unit: std::cell::RefCell<Option<ParsedUnit>>,
    }

    impl FixtureParser {
        fn module(m: ParsedModule) -> Self {
            FixtureParser {
                unit: std::cell::RefCell::new(Some(ParsedUnit::Module(m))),
            }
        }
        fn submodule(s: ParsedSubmodule) -> Self {
            FixtureParser {
                unit: std::cell::RefCell::new(Some(ParsedUnit::Submodule(s))),
            }
        }
    }

    impl TextualParser for FixtureParser {
        fn parse(&self, _format: SourceFormat, _data: &[u8]) -> Result<ParsedUnit> {
            self.unit
                .borrow_mut()
                .take()
                .ok_or_else(|| Error::new(ErrorKind::Internal))
        }
    }

    fn callback_returning(data: Vec<u8>) -> ImportCallback {
        Box::new(move |_req| {
            Some(ImportedData {
                format: SourceFormat::Yang,
                data: data.clone(),
            })
        })
    }

    #[test]
    fn s6_revision_selection_returns_registry_hit_without_touching_parser() {
        let mut ctx = Context::new(ContextFlags::empty());
        let id = ctx.insert_module(ModuleRecord {
            name: "b".into(),
            latest_revision: LatestRevision::Confirmed,
            revisions: vec![Revision {
                date: "2020-01-01".into(),
                ..Default::default()
            }],
            ..Default::default()
        });

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let resolved = loader.load_module(&mut ctx, "b", None, false).unwrap();
        assert_eq!(resolved, id);
    }

    #[test]
    fn s7_import_cycle_is_detected() {
        let mut ctx = Context::new(ContextFlags::empty());
        ctx.insert_module(ModuleRecord {
            name: "a".into(),
            parsing: true,
            ..Default::default()
        });

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_module(&mut ctx, "a", None, false).unwrap_err();
        assert!(err.is_kind(ErrorKind::Cycle));
    }

    #[test]
    fn loads_fresh_module_via_callback_and_promotes_latest() {
        let mut ctx = Context::new(ContextFlags::empty());
        ctx.set_import_callback(callback_returning(b"module c { }".to_vec()));

        let parsed = ParsedModule {
            name: "c".into(),
            ..Default::default()
        };
        let parser = FixtureParser::module(parsed);
        let loader = ModuleLoader::new(&parser);
        let id = loader.load_module(&mut ctx, "c", None, false).unwrap();
        assert_eq!(ctx.module(id).latest_revision, LatestRevision::Confirmed);
    }

    #[test]
    fn post_parse_name_mismatch_is_invalid() {
        let mut ctx = Context::new(ContextFlags::empty());
        ctx.set_import_callback(callback_returning(b"module wrong { }".to_vec()));

        let parsed = ParsedModule {
            name: "wrong-name".into(),
            ..Default::default()
        };
        let parser = FixtureParser::module(parsed);
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_module(&mut ctx, "expected-name", None, false).unwrap_err();
        assert!(err.is_kind(ErrorKind::InvalidInput));
    }

    #[test]
    fn submodule_belongs_to_mismatch_is_a_reference_error() {
        let mut ctx = Context::new(ContextFlags::empty());
        let parent = ctx.insert_module(ModuleRecord {
            name: "parent".into(),
            ..Default::default()
        });
        ctx.set_import_callback(callback_returning(b"submodule s { belongs-to other { } }".to_vec()));

        let parsed = ParsedSubmodule {
            name: "s".into(),
            belongs_to: BelongsTo {
                module: "other".into(),
                prefix: "o".into(),
            },
            ..Default::default()
        };
        let parser = FixtureParser::submodule(parsed);
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_submodule(&mut ctx, parent, "s", None).unwrap_err();
        assert!(err.is_kind(ErrorKind::ReferenceError));
    }

    #[test]
    fn include_cycle_is_detected_via_the_parsing_flag() {
        let mut ctx = Context::new(ContextFlags::empty());
        let parent = ctx.insert_module(ModuleRecord {
            name: "parent".into(),
            ..Default::default()
        });
        // Simulate re-entering a submodule that is still mid-acquisition,
        // e.g. because its own `include` statement cycles back to it.
        ctx.insert_submodule(SubmoduleRecord {
            name: "s".into(),
            parsing: true,
            ..Default::default()
        });

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_submodule(&mut ctx, parent, "s", None).unwrap_err();
        assert!(err.is_kind(ErrorKind::Cycle));
    }

    #[test]
    fn successful_submodule_load_clears_the_parsing_flag() {
        let mut ctx = Context::new(ContextFlags::empty());
        let parent = ctx.insert_module(ModuleRecord {
            name: "parent".into(),
            ..Default::default()
        });
        ctx.set_import_callback(callback_returning(b"submodule s { belongs-to parent { } }".to_vec()));

        let parsed = ParsedSubmodule {
            name: "s".into(),
            belongs_to: BelongsTo {
                module: "parent".into(),
                prefix: "p".into(),
            },
            ..Default::default()
        };
        let parser = FixtureParser::submodule(parsed);
        let loader = ModuleLoader::new(&parser);
        let id = loader.load_submodule(&mut ctx, parent, "s", None).unwrap();
        assert!(!ctx.submodule(id).parsing);
        assert!(ctx.module(parent).submodules.contains(&id));
    }

    #[test]
    fn a_failed_acquisition_does_not_leave_a_stuck_placeholder() {
        let mut ctx = Context::new(ContextFlags::empty());
        let parent = ctx.insert_module(ModuleRecord {
            name: "parent".into(),
            ..Default::default()
        });
        ctx.flags = ContextFlags::DISABLE_SEARCHDIRS;

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let first = loader.load_submodule(&mut ctx, parent, "s", None).unwrap_err();
        assert!(first.is_kind(ErrorKind::NotFound));

        // A second, independent attempt must not see a cycle: the failed
        // placeholder should have been cleaned up, not left mid-parsing.
        let second = loader.load_submodule(&mut ctx, parent, "s", None).unwrap_err();
        assert!(second.is_kind(ErrorKind::NotFound));
    }

    #[test]
    fn implementing_a_different_already_implemented_revision_is_denied_even_unrequested() {
        let mut ctx = Context::new(ContextFlags::empty());
        let mut implemented_rec = ModuleRecord {
            name: "b".into(),
            latest_revision: LatestRevision::No,
            implemented: true,
            revisions: vec![Revision {
                date: "2019-01-01".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        implemented_rec.parsed = Some(ParsedModule {
            name: "b".into(),
            ..Default::default()
        });
        ctx.insert_module(implemented_rec);
        // A different, newer revision is the one the registry would hand
        // back for an unrevisioned lookup.
        ctx.insert_module(ModuleRecord {
            name: "b".into(),
            latest_revision: LatestRevision::Confirmed,
            revisions: vec![Revision {
                date: "2020-01-01".into(),
                ..Default::default()
            }],
            parsed: Some(ParsedModule {
                name: "b".into(),
                ..Default::default()
            }),
            ..Default::default()
        });

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_module(&mut ctx, "b", None, true).unwrap_err();
        assert!(err.is_kind(ErrorKind::Denied));
    }

    #[test]
    fn reimplementing_the_same_revision_with_no_revision_requested_is_not_a_conflict() {
        let mut ctx = Context::new(ContextFlags::empty());
        ctx.insert_module(ModuleRecord {
            name: "b".into(),
            latest_revision: LatestRevision::Confirmed,
            implemented: true,
            revisions: vec![Revision {
                date: "2020-01-01".into(),
                ..Default::default()
            }],
            parsed: Some(ParsedModule {
                name: "b".into(),
                ..Default::default()
            }),
            ..Default::default()
        });

        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        assert!(loader.load_module(&mut ctx, "b", None, true).is_ok());
    }

    #[test]
    fn no_source_available_is_not_found() {
        let mut ctx = Context::new(ContextFlags::empty());
        ctx.flags = ContextFlags::DISABLE_SEARCHDIRS;
        let parser = FixtureParser::module(ParsedModule::default());
        let loader = ModuleLoader::new(&parser);
        let err = loader.load_module(&mut ctx, "missing", None, false).unwrap_err();
        assert!(err.is_kind(ErrorKind::NotFound));
    }
}

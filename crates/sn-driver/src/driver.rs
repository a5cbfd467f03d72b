//! Compilation driver — orchestrates lex → parse → check for an entry
//! module and every module it transitively `import`s (component C8).
//!
//! `sn-checker` treats `Stmt::Import` as purely structural (spec §4.7.2):
//! resolving the *path* a module names — reading it from disk, recursing
//! into its own imports, ordering the whole graph dependency-first, and
//! handing each module's public signatures to the modules that import it
//! (`Checker::with_imports`) — is this crate's job.
//!
//! Two passes run over the import graph. The first (`discover`) only needs
//! enough of each file to find its own `import` statements, so it parses
//! into a disposable, per-call arena and diagnostics sink that is thrown
//! away once the dependency order is known. The second pass parses every
//! file into one shared arena — matching spec §3.8's "one arena owns
//! everything for one compilation" even though "one compilation" here spans
//! several files — and checks them in dependency order, so an imported
//! module's public signatures are always ready before its importers need
//! them.

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use sn_checker::{Checker, ImportedSignature};
use sn_common::diagnostics::DiagnosticKind;
use sn_common::{Arena, CompilerOptions, Diagnostic, Diagnostics};
use sn_lexer::{LexError, Lexer};
use sn_parser::{Parser, StmtKind};

use crate::error::CompileError;

/// The outcome of one `compile` run: every diagnostic recorded across the
/// whole import graph, in file-processing order.
pub struct CompileOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub had_error: bool,
}

/// Lexes, parses, and type-checks `entry` and everything it transitively
/// imports. Returns `Err` only for host-level failures (a missing file, an
/// import cycle) that make it impossible to even attempt compilation;
/// ordinary compiler diagnostics are returned inside `CompileOutcome`.
pub fn compile(entry: &Path, options: &CompilerOptions) -> Result<CompileOutcome, CompileError> {
    let discovery = discover(entry)?;

    let arena = Arena::new();
    let diags = Diagnostics::new();

    let mut modules: Vec<Option<sn_parser::Module<'_>>> = (0..discovery.names.len()).map(|_| None).collect();
    for &idx in &discovery.order {
        match Lexer::new(&discovery.sources[idx], &discovery.names[idx]).tokenize() {
            Ok(tokens) => {
                let tokens = arena.alloc_slice_fill_iter(tokens);
                let mut parser = Parser::new(&arena, &diags, tokens, &discovery.names[idx]);
                modules[idx] = Some(parser.parse_module());
            }
            Err(e) => {
                diags.error_at(&discovery.names[idx], lex_error_line(&e), DiagnosticKind::LexError, e.to_string());
                break;
            }
        }
    }

    if diags.had_error() {
        // Spec §7: lex/parse errors may cascade; an implementation is free
        // to abort before checking a possibly-malformed AST.
        return Ok(CompileOutcome { diagnostics: apply_limits(diags.entries(), options), had_error: true });
    }

    let mut exported: FxHashMap<usize, Vec<ImportedSignature<'_>>> = FxHashMap::default();
    for &idx in &discovery.order {
        let module = modules[idx].as_ref().expect("every index in `order` was parsed above");

        let mut imported_sigs: Vec<ImportedSignature<'_>> = Vec::new();
        for stmt in module.stmts {
            if let StmtKind::Import { path } = &stmt.kind {
                let spec: &str = path;
                if let Some(dep_idx) = resolve_import(&discovery.names[idx], spec, &discovery.index_of) {
                    if let Some(sigs) = exported.get(&dep_idx) {
                        imported_sigs.extend(sigs.iter().copied());
                    }
                }
            }
        }

        let mut checker = Checker::with_imports(&arena, &diags, &discovery.names[idx], &imported_sigs);
        checker.check_module(module);
        exported.insert(idx, checker.public_signatures(module));
    }

    Ok(CompileOutcome { diagnostics: apply_limits(diags.entries(), options), had_error: diags.had_error() })
}

/// Spec §4.2's `max_diagnostics` cap is enforced here, after the whole
/// pipeline has run, rather than inside `Diagnostics` itself — it is a
/// reporting-policy decision (how much to show), not something the checker
/// needs to know about mid-walk. `warnings_as_errors` is a separate,
/// exit-code-only decision made by the binary in `main.rs`.
fn apply_limits(mut entries: Vec<Diagnostic>, options: &CompilerOptions) -> Vec<Diagnostic> {
    if options.max_diagnostics > 0 && entries.len() > options.max_diagnostics {
        entries.truncate(options.max_diagnostics);
    }
    entries
}

fn lex_error_line(e: &LexError) -> u32 {
    match e {
        LexError::UnterminatedString { line } | LexError::InvalidEscape { line, .. } | LexError::InvalidNumber { line, .. } | LexError::UnknownChar { line, .. } => *line,
    }
}

fn resolve_import(importer_name: &str, spec: &str, index_of: &FxHashMap<String, usize>) -> Option<usize> {
    let target = Path::new(importer_name).parent().unwrap_or_else(|| Path::new(".")).join(spec);
    let canonical = std::fs::canonicalize(&target).ok()?;
    index_of.get(&canonical.display().to_string()).copied()
}

struct Discovery {
    /// Canonical display name per file, index-parallel with `sources`.
    names: Vec<String>,
    sources: Vec<String>,
    /// Dependency-first processing order: every file's imports appear
    /// before the file itself.
    order: Vec<usize>,
    index_of: FxHashMap<String, usize>,
}

fn discover(entry: &Path) -> Result<Discovery, CompileError> {
    let mut names = Vec::new();
    let mut sources = Vec::new();
    let mut order = Vec::new();
    let mut index_of: FxHashMap<String, usize> = FxHashMap::default();
    let mut on_stack: FxHashSet<String> = FxHashSet::default();

    discover_one(entry, &mut names, &mut sources, &mut order, &mut index_of, &mut on_stack)?;
    Ok(Discovery { names, sources, order, index_of })
}

#[allow(clippy::too_many_arguments)]
fn discover_one(
    path: &Path,
    names: &mut Vec<String>,
    sources: &mut Vec<String>,
    order: &mut Vec<usize>,
    index_of: &mut FxHashMap<String, usize>,
    on_stack: &mut FxHashSet<String>,
) -> Result<usize, CompileError> {
    let canonical = std::fs::canonicalize(path).map_err(|source| CompileError::Io { path: path.to_path_buf(), source })?;
    let display_name = canonical.display().to_string();

    if let Some(&idx) = index_of.get(&display_name) {
        return Ok(idx);
    }
    if on_stack.contains(&display_name) {
        return Err(CompileError::ImportCycle { path: canonical });
    }
    on_stack.insert(display_name.clone());

    let source = std::fs::read_to_string(&canonical).map_err(|source| CompileError::Io { path: canonical.clone(), source })?;

    // Scratch parse: enough to see this file's own `import` statements.
    // Malformed files are left for the real pass to report; a file that
    // fails even to lex here simply appears to import nothing.
    let scratch_arena = Arena::new();
    let scratch_diags = Diagnostics::new();
    let import_specs: Vec<String> = Lexer::new(&source, &display_name)
        .tokenize()
        .map(|tokens| {
            let tokens = scratch_arena.alloc_slice_fill_iter(tokens);
            let mut parser = Parser::new(&scratch_arena, &scratch_diags, tokens, &display_name);
            let module = parser.parse_module();
            module
                .stmts
                .iter()
                .filter_map(|stmt| match &stmt.kind {
                    StmtKind::Import { path } => Some((*path).to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    for spec in &import_specs {
        let target = canonical.parent().unwrap_or_else(|| Path::new(".")).join(spec);
        discover_one(&target, names, sources, order, index_of, on_stack)?;
    }

    on_stack.remove(&display_name);
    let idx = names.len();
    names.push(display_name.clone());
    sources.push(source);
    index_of.insert(display_name, idx);
    order.push(idx);
    Ok(idx)
}

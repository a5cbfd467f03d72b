use std::fs;

use sn_common::diagnostics::DiagnosticKind;
use sn_common::CompilerOptions;
use sn_driver::{compile, CompileError};

fn write(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture file");
    path
}

#[test]
fn a_well_typed_single_file_compiles_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entry = write(dir.path(), "main.sn", "fn add(a: int, b: int): int => a + b\n");

    let outcome = compile(&entry, &CompilerOptions::for_file(entry.display().to_string())).expect("compile succeeds");
    assert!(!outcome.had_error, "{:?}", outcome.diagnostics);
}

#[test]
fn an_undefined_symbol_is_reported_and_fails_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entry = write(dir.path(), "main.sn", "fn f(): int {\n  return lenght\n}\n");

    let outcome = compile(&entry, &CompilerOptions::for_file(entry.display().to_string())).expect("compile succeeds");
    assert!(outcome.had_error);
    assert!(outcome.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UndefinedSymbol));
}

#[test]
fn an_imported_public_function_is_visible_to_the_importer() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "math.sn", "fn add(a: int, b: int): int => a + b\nprivate fn helper(): void => return\n");
    let entry = write(dir.path(), "main.sn", "import \"math.sn\"\nfn f(): int {\n  return add(1, 2)\n}\n");

    let outcome = compile(&entry, &CompilerOptions::for_file(entry.display().to_string())).expect("compile succeeds");
    assert!(!outcome.had_error, "{:?}", outcome.diagnostics);
}

#[test]
fn a_private_import_member_is_not_visible_to_the_importer() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "math.sn", "private fn helper(): int => return 1\n");
    let entry = write(dir.path(), "main.sn", "import \"math.sn\"\nfn f(): int {\n  return helper()\n}\n");

    let outcome = compile(&entry, &CompilerOptions::for_file(entry.display().to_string())).expect("compile succeeds");
    assert!(outcome.had_error);
    assert!(outcome.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UndefinedSymbol));
}

#[test]
fn an_import_cycle_is_a_host_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "a.sn", "import \"b.sn\"\n");
    let entry = write(dir.path(), "b.sn", "import \"a.sn\"\n");

    let result = compile(&entry, &CompilerOptions::for_file(entry.display().to_string()));
    assert!(matches!(result, Err(CompileError::ImportCycle { .. })));
}

#[test]
fn a_missing_entry_file_is_a_host_error() {
    let missing = std::path::PathBuf::from("/nonexistent/does-not-exist.sn");
    let result = compile(&missing, &CompilerOptions::for_file(missing.display().to_string()));
    assert!(matches!(result, Err(CompileError::Io { .. })));
}

#[test]
fn max_diagnostics_truncates_the_reported_list() {
    let dir = tempfile::tempdir().expect("tempdir");
    let entry = write(dir.path(), "main.sn", "fn f(): void {\n  var a: int = true\n  var b: int = true\n  var c: int = true\n}\n");

    let mut options = CompilerOptions::for_file(entry.display().to_string());
    options.max_diagnostics = 1;
    let outcome = compile(&entry, &options).expect("compile succeeds");
    assert_eq!(outcome.diagnostics.len(), 1);
}

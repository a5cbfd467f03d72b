//! The type checker / region-escape analyzer core — spec §4.7, component C7.

use std::rc::Rc;

use sn_binder::{ArenaContext, SymbolKind, SymbolTable};
use sn_common::diagnostics::DiagnosticKind;
use sn_common::{Arena, Diagnostics};
use sn_parser::{FnModifier, FunctionType, Type};

/// A top-level function signature exported by an already-checked module,
/// injected into an importer's top-level scope before it is checked (spec
/// §4.7.10/§4.8). Resolving the *path* to a module — reading the file,
/// lexing, parsing, and recursively checking it — is the driver's job
/// (component C8 sits above the checker in the pipeline); the checker only
/// needs the resulting signatures.
#[derive(Clone, Copy)]
pub struct ImportedSignature<'a> {
    pub name: &'a str,
    pub ty: &'a Type<'a>,
    pub modifier: FnModifier,
}

pub struct Checker<'a> {
    pub(crate) arena: &'a Arena,
    pub(crate) diags: &'a Diagnostics,
    pub(crate) file: &'a str,
    pub(crate) table: SymbolTable<'a>,
    pub(crate) ctx: Rc<ArenaContext>,
    /// The enclosing function's declared return type, for `return` checks.
    pub(crate) return_ty: Option<&'a Type<'a>>,
    /// `Some(depth)` while checking a native lambda's body: names resolved
    /// from a scope shallower than `depth` are captures (spec §4.7.8).
    pub(crate) native_lambda_boundary: Option<usize>,
    /// `Some(depth)` while checking the body of the innermost active
    /// private region (a `private` function/block, or a non-shared loop
    /// iteration): a write to a symbol resolved from a scope shallower than
    /// `depth` assigns outward across the boundary (spec §4.7.4).
    pub(crate) private_entry_depth: Option<usize>,
}

impl<'a> Checker<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena, diags: &'a Diagnostics, file: &'a str) -> Self {
        Checker {
            arena,
            diags,
            file,
            table: SymbolTable::new(),
            ctx: ArenaContext::new(),
            return_ty: None,
            native_lambda_boundary: None,
            private_entry_depth: None,
        }
    }

    #[must_use]
    pub fn with_imports(arena: &'a Arena, diags: &'a Diagnostics, file: &'a str, imports: &[ImportedSignature<'a>]) -> Self {
        let mut checker = Checker::new(arena, diags, file);
        for sig in imports {
            checker.table.add_symbol(checker.diags, checker.file, sig.name, 0, SymbolKind::Function, Some(sig.modifier), Some(sig.ty));
        }
        checker
    }

    pub fn check_module(&mut self, module: &sn_parser::Module<'a>) {
        for stmt in module.stmts {
            debug_assert!(self.ctx.is_at_rest(), "arena context must be at rest between top-level statements");
            self.check_stmt(stmt);
            debug_assert!(self.ctx.is_at_rest(), "arena context must be at rest between top-level statements");
        }
    }

    /// Every non-`private` top-level function, for the import resolver
    /// (spec §4.7.10: "extract every top-level function's signature"). Reads
    /// the *effective* modifier off the symbol rather than the raw AST
    /// modifier, so a non-private function promoted to `shared` by
    /// returning a reference-kind value (spec §4.7.4) carries that
    /// promotion into the importer too.
    #[must_use]
    pub fn public_signatures(&self, module: &sn_parser::Module<'a>) -> Vec<ImportedSignature<'a>> {
        let mut out = Vec::new();
        for stmt in module.stmts {
            if let sn_parser::StmtKind::Function { name, .. } = &stmt.kind {
                if let Some(sym) = self.table.lookup(name) {
                    if let (Some(ty), Some(modifier)) = (sym.ty(), sym.modifier) {
                        if modifier != FnModifier::Private {
                            out.push(ImportedSignature { name, ty, modifier });
                        }
                    }
                }
            }
        }
        out
    }

    pub(crate) fn error(&self, line: u32, kind: DiagnosticKind, message: impl Into<String>) {
        self.diags.error_at(self.file, line, kind, message);
    }

    pub(crate) fn warn(&self, line: u32, kind: DiagnosticKind, message: impl Into<String>) {
        self.diags.warn_at(self.file, line, kind, message);
    }

    pub(crate) fn nil_ty(&self) -> &'a Type<'a> {
        self.arena.alloc(Type::Nil)
    }

    pub(crate) fn void_ty(&self) -> &'a Type<'a> {
        self.arena.alloc(Type::Void)
    }

    pub(crate) fn bool_ty(&self) -> &'a Type<'a> {
        self.arena.alloc(Type::Bool)
    }

    /// Validates that a *declared* type (a var/param annotation, a return
    /// type, or a `type` alias's RHS) obeys the pointer-discipline and
    /// native-callback rules (spec §4.7.7/§4.7.9), recursing into array and
    /// pointer element types.
    pub(crate) fn check_declared_type(&self, ty: &'a Type<'a>, line: u32) {
        match ty {
            Type::Pointer(inner) => {
                if !self.ctx.is_native() && !self.ctx.is_as_val() {
                    self.error(line, DiagnosticKind::PointerOutsideNative, "pointer types may only be declared inside a native function, or inside an 'as val' operand");
                }
                self.check_declared_type(inner, line);
            }
            Type::Array(inner) => self.check_declared_type(inner, line),
            Type::Function(ft) => {
                if ft.is_native {
                    self.check_native_callback_type(ft, line);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn check_native_callback_type(&self, ft: &'a FunctionType<'a>, line: u32) {
        if !ft.ret.is_c_compatible() {
            self.error(line, DiagnosticKind::NativeCallbackNonCompat, "a native callback's return type must be C-compatible");
        }
        for p in ft.params {
            if !p.is_c_compatible() {
                self.error(line, DiagnosticKind::NativeCallbackNonCompat, "a native callback's parameter types must be C-compatible");
            }
        }
    }
}

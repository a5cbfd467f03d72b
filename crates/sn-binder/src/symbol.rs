//! Symbols and lexical scopes — spec §3.6, component C6.

use std::cell::Cell;

use rustc_hash::FxHashMap;
use sn_parser::{FnModifier, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Local,
    Param,
    Function,
}

/// {name token, resolved type, kind, optional modifier} (spec §3.6). `ty`
/// is a `Cell` because a local's declared type may still be `None` at the
/// point it's registered (spec §4.7.2's lambda-type-propagation rule fills
/// it in once the initializer is checked).
#[derive(Debug)]
pub struct Symbol<'a> {
    pub name: &'a str,
    pub line: u32,
    pub kind: SymbolKind,
    pub modifier: Option<FnModifier>,
    pub offset: u32,
    ty: Cell<Option<&'a Type<'a>>>,
}

impl<'a> Symbol<'a> {
    #[must_use]
    pub fn new(name: &'a str, line: u32, kind: SymbolKind, modifier: Option<FnModifier>, offset: u32, ty: Option<&'a Type<'a>>) -> Self {
        Symbol { name, line, kind, modifier, offset, ty: Cell::new(ty) }
    }

    #[must_use]
    pub fn ty(&self) -> Option<&'a Type<'a>> {
        self.ty.get()
    }

    pub fn set_ty(&self, ty: &'a Type<'a>) {
        self.ty.set(Some(ty));
    }
}

/// One link in the scope chain (spec §3.6): owns a flat symbol map plus the
/// next-local/next-param offset counters code generation would consume.
/// Scoping itself — the decision of when to push/pop a scope for a block,
/// function, or loop body — belongs to the checker (spec §4.7.2); this
/// type only tracks what's visible and where it would live on a frame.
#[derive(Default)]
pub struct Scope<'a> {
    symbols: FxHashMap<&'a str, Symbol<'a>>,
    next_local_offset: u32,
    next_param_offset: u32,
}

impl<'a> Scope<'a> {
    #[must_use]
    pub fn new() -> Self {
        Scope::default()
    }

    /// Registers `name` in this scope. Returns `false` without mutating
    /// anything if `name` is already declared in this *same* scope (spec
    /// §4.6's `RedeclaredSymbol` rule) — the caller is responsible for
    /// turning that into a diagnostic, since only the checker knows the
    /// file and the exact message wording.
    pub fn add_symbol(&mut self, name: &'a str, line: u32, kind: SymbolKind, modifier: Option<FnModifier>, ty: Option<&'a Type<'a>>) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }
        let offset = match kind {
            SymbolKind::Local => {
                let o = self.next_local_offset;
                self.next_local_offset += 1;
                o
            }
            SymbolKind::Param => {
                let o = self.next_param_offset;
                self.next_param_offset += 1;
                o
            }
            SymbolKind::Function => 0,
        };
        self.symbols.insert(name, Symbol::new(name, line, kind, modifier, offset, ty));
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol<'a>> {
        self.symbols.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.symbols.keys().copied()
    }
}

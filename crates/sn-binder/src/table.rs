//! The scope chain itself — `push_scope`/`pop_scope`/`add_symbol`/`lookup`
//! (spec §4.6, component C6).

use sn_common::diagnostics::DiagnosticKind;
use sn_common::Diagnostics;
use sn_parser::{FnModifier, Type};

use crate::symbol::{Scope, Symbol, SymbolKind};

/// A chain of lexical scopes, innermost last. `lookup` walks it from the
/// end backwards (spec §4.6's "walks enclosing scopes").
pub struct SymbolTable<'a> {
    scopes: Vec<Scope<'a>>,
}

impl<'a> Default for SymbolTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SymbolTable<'a> {
    #[must_use]
    pub fn new() -> Self {
        // The outermost scope holds top-level function/type declarations.
        SymbolTable { scopes: vec![Scope::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pops the innermost scope. Panics if called more times than
    /// `push_scope` — a checker bug, not a user-facing error, since the
    /// top-level scope created by `new` is never popped.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "pop_scope called without a matching push_scope");
        self.scopes.pop();
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Registers a symbol in the innermost scope, reporting `RedeclaredSymbol`
    /// through `diags` on a same-scope name collision (spec §4.6).
    pub fn add_symbol(
        &mut self,
        diags: &Diagnostics,
        file: &str,
        name: &'a str,
        line: u32,
        kind: SymbolKind,
        modifier: Option<FnModifier>,
        ty: Option<&'a Type<'a>>,
    ) {
        let scope = self.scopes.last_mut().expect("at least one scope is always present");
        if !scope.add_symbol(name, line, kind, modifier, ty) {
            diags.error_at(file, line, DiagnosticKind::RedeclaredSymbol, format!("'{name}' is already declared in this scope"));
        }
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Symbol<'a>> {
        self.scopes.iter().rev().find_map(|s| s.get(name))
    }

    /// Like [`SymbolTable::lookup`], but also reports which scope index
    /// (0 = outermost) the symbol was found in — used by the native-lambda
    /// capture check (spec §4.7.8), which needs to tell "my own parameter"
    /// apart from "something from an enclosing scope".
    #[must_use]
    pub fn lookup_with_depth(&self, name: &str) -> Option<(usize, &Symbol<'a>)> {
        self.scopes.iter().enumerate().rev().find_map(|(i, s)| s.get(name).map(|sym| (i, sym)))
    }

    /// All symbol names visible from the innermost scope outward, for the
    /// spelling-suggestion engine (spec §4.2/§9).
    pub fn visible_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.scopes.iter().rev().flat_map(Scope::names)
    }
}

#[cfg(test)]
mod tests {
    use sn_common::Diagnostics;
    use sn_parser::Type;

    use super::*;

    #[test]
    fn lookup_walks_outward_through_enclosing_scopes() {
        let diags = Diagnostics::new();
        let mut table = SymbolTable::new();
        table.add_symbol(&diags, "t.sn", "x", 1, SymbolKind::Local, None, Some(&Type::Int));
        table.push_scope();
        table.add_symbol(&diags, "t.sn", "y", 2, SymbolKind::Local, None, Some(&Type::Bool));
        assert!(table.lookup("x").is_some());
        assert!(table.lookup("y").is_some());
        table.pop_scope();
        assert!(table.lookup("x").is_some());
        assert!(table.lookup("y").is_none());
        assert!(!diags.had_error());
    }

    #[test]
    fn duplicate_name_in_same_scope_is_redeclared() {
        let diags = Diagnostics::new();
        let mut table = SymbolTable::new();
        table.add_symbol(&diags, "t.sn", "x", 1, SymbolKind::Local, None, Some(&Type::Int));
        table.add_symbol(&diags, "t.sn", "x", 2, SymbolKind::Local, None, Some(&Type::Int));
        assert!(diags.had_error());
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn same_name_in_nested_scope_shadows_without_error() {
        let diags = Diagnostics::new();
        let mut table = SymbolTable::new();
        table.add_symbol(&diags, "t.sn", "x", 1, SymbolKind::Local, None, Some(&Type::Int));
        table.push_scope();
        table.add_symbol(&diags, "t.sn", "x", 2, SymbolKind::Local, None, Some(&Type::Bool));
        assert!(!diags.had_error());
        assert!(matches!(table.lookup("x").unwrap().ty(), Some(Type::Bool)));
    }

    #[test]
    #[should_panic(expected = "pop_scope called without a matching push_scope")]
    fn popping_the_top_level_scope_panics() {
        let mut table: SymbolTable = SymbolTable::new();
        table.pop_scope();
    }
}

//! Statement typing and region tracking — spec §4.7.2, §4.7.4.

use sn_binder::SymbolKind;
use sn_common::diagnostics::DiagnosticKind;
use sn_parser::{FnModifier, Stmt, StmtKind, Type};

use crate::checker::Checker;
use crate::expr::{validate_param_mem_qual, validate_var_mem_qual};

/// Int array literals narrow into a declared `byte` array (spec §4.7.2):
/// `var b: byte[] = {1, 2, 3}` is legal even though the literal's inferred
/// element type is `int`.
fn is_byte_narrowing<'a>(declared: &Type<'a>, value: &Type<'a>) -> bool {
    matches!((declared, value), (Type::Array(d), Type::Array(v)) if matches!(d, Type::Byte) && matches!(v, Type::Int))
}

impl<'a> Checker<'a> {
    pub(crate) fn check_stmt(&mut self, stmt: &'a Stmt<'a>) {
        let line = stmt.token.line;
        match &stmt.kind {
            StmtKind::Expr(e) => {
                self.check_expr(e);
            }
            StmtKind::VarDecl { name, declared_ty, init, mem_qual } => self.check_var_decl(name, *declared_ty, *init, *mem_qual, line),
            StmtKind::Function { name, params, ret, body, modifier, is_native, .. } => {
                self.check_function(name, params, ret, body, *modifier, *is_native, line);
            }
            StmtKind::Return(value) => self.check_return(*value, line),
            StmtKind::Block { stmts, modifier } => self.check_block(stmts, *modifier),
            StmtKind::If { cond, then_branch, else_branch } => {
                let cond_ty = self.check_expr(cond);
                if !matches!(cond_ty, Type::Bool) {
                    self.error(cond.token.line, DiagnosticKind::InvalidOperand, "an 'if' condition must be boolean");
                }
                self.check_stmt(then_branch);
                if let Some(eb) = else_branch {
                    self.check_stmt(eb);
                }
            }
            StmtKind::While { cond, body, is_shared } => {
                let cond_ty = self.check_expr(cond);
                if !matches!(cond_ty, Type::Bool) {
                    self.error(cond.token.line, DiagnosticKind::InvalidOperand, "a 'while' condition must be boolean");
                }
                self.check_loop_body(body, *is_shared);
            }
            StmtKind::For { init, cond, step, body, is_shared } => {
                self.table.push_scope();
                if let Some(i) = init {
                    self.check_stmt(i);
                }
                if let Some(c) = cond {
                    let cty = self.check_expr(c);
                    if !matches!(cty, Type::Bool) {
                        self.error(c.token.line, DiagnosticKind::InvalidOperand, "a 'for' condition must be boolean");
                    }
                }
                self.check_loop_body(body, *is_shared);
                if let Some(s) = step {
                    self.check_expr(s);
                }
                self.table.pop_scope();
            }
            StmtKind::ForEach { var_name, iterable, body, is_shared } => {
                let iter_ty = self.check_expr(iterable);
                let elem = match iter_ty {
                    Type::Array(elem) => elem,
                    _ => {
                        self.error(iterable.token.line, DiagnosticKind::InvalidOperand, "a 'for ... in' loop requires an array");
                        self.nil_ty()
                    }
                };
                self.table.push_scope();
                self.table.add_symbol(self.diags, self.file, var_name, line, SymbolKind::Local, None, Some(elem));
                self.check_loop_body(body, *is_shared);
                self.table.pop_scope();
            }
            StmtKind::Break | StmtKind::Continue | StmtKind::Import { .. } => {}
            StmtKind::TypeDecl { ty, .. } => self.check_declared_type(ty, line),
        }
    }

    fn check_var_decl(&mut self, name: &'a str, declared_ty: Option<&'a Type<'a>>, init: Option<&'a sn_parser::Expr<'a>>, mem_qual: Option<sn_parser::MemQual>, line: u32) {
        if let Some(t) = declared_ty {
            self.check_declared_type(t, line);
        }

        let init_ty = match (declared_ty, init) {
            (Some(declared), Some(init_expr)) => {
                let value_ty = if let (Type::Function(ft), sn_parser::ExprKind::Lambda { .. }) = (declared, &init_expr.kind) {
                    let ty = self.check_lambda(init_expr, Some(ft));
                    init_expr.set_resolved_type(ty);
                    ty
                } else {
                    self.check_expr(init_expr)
                };
                if !sn_parser::unifies_with(value_ty, declared) && !is_byte_narrowing(declared, value_ty) {
                    self.error(init_expr.token.line, DiagnosticKind::TypeMismatch, format!("initializer's type does not match the declared type of '{name}'"));
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init_expr)) => self.check_expr(init_expr),
            (None, None) => {
                self.error(line, DiagnosticKind::EmptyInitializerNoType, format!("'{name}' has neither a declared type nor an initializer"));
                self.nil_ty()
            }
        };

        validate_var_mem_qual(self, name, mem_qual, init_ty, line);

        self.table.add_symbol(self.diags, self.file, name, line, SymbolKind::Local, None, Some(init_ty));
    }

    fn check_function(
        &mut self,
        name: &'a str,
        params: &'a [sn_parser::Param<'a>],
        ret: &'a Type<'a>,
        body: &Option<sn_parser::Body<'a>>,
        modifier: FnModifier,
        is_native: bool,
        line: u32,
    ) {
        let param_types: Vec<&'a Type<'a>> = params.iter().map(|p| p.declared_ty.unwrap_or_else(|| self.nil_ty())).collect();
        let quals: Vec<Option<sn_parser::MemQual>> = params.iter().map(|p| p.mem_qual).collect();
        let ft = self.arena.alloc(sn_parser::FunctionType {
            ret,
            params: self.arena.alloc_slice_fill_iter(param_types),
            param_mem_quals: Some(self.arena.alloc_slice_fill_iter(quals)),
            is_native,
            is_variadic: false,
        });
        let fn_ty = self.arena.alloc(Type::Function(ft));
        // Spec §4.7.4: a non-private function returning a reference-kind
        // value is implicitly promoted to `shared` — its caller couldn't
        // otherwise use the returned value outside the callee's own arena
        // region. The promotion is recorded on the symbol, not the AST.
        let effective = if modifier != FnModifier::Private && ret.is_reference() { FnModifier::Shared } else { modifier };
        self.table.add_symbol(self.diags, self.file, name, line, SymbolKind::Function, Some(effective), Some(fn_ty));

        if is_native {
            self.check_native_callback_type(ft, line);
        } else {
            self.check_declared_type(ret, line);
        }
        for p in params {
            // A native function's own parameter list is validated wholesale
            // by `check_native_callback_type` above (spec §4.7.9); applying
            // the ordinary pointer-discipline check here too would flag a
            // native pointer parameter before its `enter_native` guard is
            // even pushed.
            if !is_native {
                if let Some(t) = p.declared_ty {
                    self.check_declared_type(t, line);
                }
            }
            validate_param_mem_qual(self, p, is_native, line);
        }

        let Some(body) = body else { return };

        self.table.push_scope();
        for p in params {
            self.table.add_symbol(self.diags, self.file, p.name, line, SymbolKind::Param, None, p.declared_ty);
        }

        let outer_return = self.return_ty.replace(ret);
        let outer_boundary = self.private_entry_depth;
        let _private_guard = (modifier == FnModifier::Private).then(|| self.ctx.enter_private());
        if modifier == FnModifier::Private {
            // `push_scope` just above already created this function's own
            // parameter scope; its index (not its length) is the boundary,
            // so a write to one of its own params isn't flagged as escaping.
            self.private_entry_depth = Some(self.table.depth() - 1);
        }
        let _native_guard = is_native.then(|| self.ctx.enter_native());

        match body {
            sn_parser::Body::Expr(e) => {
                let body_ty = self.check_expr(e);
                if !sn_parser::unifies_with(body_ty, ret) && !is_byte_narrowing(ret, body_ty) {
                    self.error(e.token.line, DiagnosticKind::TypeMismatch, format!("'{name}'s body does not match its declared return type"));
                }
                if self.ctx.is_private() && body_ty.is_reference() {
                    self.error(e.token.line, DiagnosticKind::PrivateEscape, format!("'{name}' is private and may not return an arena-allocated value"));
                }
            }
            sn_parser::Body::Block(stmts) => {
                for s in *stmts {
                    self.check_stmt(s);
                }
            }
        }

        self.private_entry_depth = outer_boundary;
        self.return_ty = outer_return;
        self.table.pop_scope();
    }

    fn check_return(&mut self, value: Option<&'a sn_parser::Expr<'a>>, line: u32) {
        let value_ty = match value {
            Some(e) => self.check_expr(e),
            None => self.void_ty(),
        };
        if let Some(ret) = self.return_ty {
            let ok = sn_parser::unifies_with(value_ty, ret) || is_byte_narrowing(ret, value_ty) || (matches!(ret, Type::Void) && value.is_none());
            if !ok {
                self.error(line, DiagnosticKind::TypeMismatch, "returned value's type does not match the function's declared return type");
            }
        }
        if value.is_some() && self.ctx.is_private() && value_ty.is_reference() {
            self.error(line, DiagnosticKind::PrivateEscape, "returning an arena-allocated value out of a private region is forbidden");
        }
    }

    fn check_block(&mut self, stmts: &'a [&'a Stmt<'a>], modifier: Option<FnModifier>) {
        self.table.push_scope();
        let is_private = modifier == Some(FnModifier::Private);
        let outer_boundary = self.private_entry_depth;
        let _guard = is_private.then(|| self.ctx.enter_private());
        if is_private {
            self.private_entry_depth = Some(self.table.depth() - 1);
        }

        for s in stmts {
            self.check_stmt(s);
        }

        self.private_entry_depth = outer_boundary;
        self.table.pop_scope();
    }

    /// Entered by every non-`shared` loop body: a fresh iteration region
    /// (spec §3.7/§4.7.2), so a reference-typed value allocated inside one
    /// iteration can't be smuggled out to a scope that survives past it.
    fn check_loop_body(&mut self, body: &'a Stmt<'a>, is_shared: bool) {
        let outer_boundary = self.private_entry_depth;
        let _guard = (!is_shared).then(|| self.ctx.enter_private());
        if !is_shared {
            self.private_entry_depth = Some(self.table.depth());
        }
        self.check_stmt(body);
        self.private_entry_depth = outer_boundary;
    }
}

//! Expression typing — spec §4.7.1, §4.7.3, §4.7.5, §4.7.6, §4.7.7, §4.7.8.

use sn_common::diagnostics::DiagnosticKind;
use sn_parser::{BinOp, Body, Expr, ExprFlags, ExprKind, FunctionType, LiteralValue, MemQual, Param, Type, UnaryOp};

use crate::builtins::{array_method_signature, builtin_call_method_name, is_builtin_call_name, ARRAY_METHODS};
use crate::checker::Checker;
use crate::suggest::suggest;

impl<'a> Checker<'a> {
    /// Type-checks `expr`, memoizing the result on the node (spec §3.3/§9
    /// — a second visit is a cache hit, not a re-evaluation).
    pub fn check_expr(&mut self, expr: &'a Expr<'a>) -> &'a Type<'a> {
        self.check_expr_inner(expr, false)
    }

    /// Like [`Checker::check_expr`], but `allow_raw_pointer` suppresses the
    /// "pointer escaped outside native code" check (spec §4.7.7) for the
    /// two positions that count as *immediate consumption* of a native
    /// pointer return value: the operand of `as val`, and an argument
    /// passed straight through to another native call.
    fn check_expr_inner(&mut self, expr: &'a Expr<'a>, allow_raw_pointer: bool) -> &'a Type<'a> {
        if let Some(cached) = expr.resolved_type() {
            return cached;
        }
        let line = expr.token.line;
        let ty = match &expr.kind {
            ExprKind::Literal(lit) => self.check_literal(lit),
            ExprKind::Variable(name) => self.check_variable(name, line),
            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs, line),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, line),
            ExprKind::Assign { target, value } => self.check_assign(target, value, line),
            ExprKind::Call { callee, args } => self.check_call(callee, args, line, allow_raw_pointer),
            ExprKind::StaticCall { args, .. } => {
                for a in *args {
                    self.check_expr(a);
                }
                self.arena.alloc(Type::Any)
            }
            ExprKind::Member { object, name } => self.check_member(object, name, line),
            ExprKind::ArrayLiteral { elements } => self.check_array_literal(elements, line),
            ExprKind::Index { base, index } => self.check_index(base, index, line),
            ExprKind::Slice { base, start, end, step } => self.check_slice(expr, base, *start, *end, *step, line),
            ExprKind::IncDec { operand, .. } => self.check_incdec(operand, line),
            ExprKind::Interpolated { parts } => self.check_interpolated(parts, line),
            ExprKind::Lambda { .. } => self.check_lambda(expr, None),
            ExprKind::AsVal { operand } => self.check_as_val(expr, operand, line),
            ExprKind::AsRef { operand } => self.check_as_ref(operand, line),
        };
        expr.set_resolved_type(ty);
        ty
    }

    fn check_literal(&mut self, lit: &LiteralValue<'a>) -> &'a Type<'a> {
        self.arena.alloc(match lit {
            LiteralValue::Int(_) => Type::Int,
            LiteralValue::Long(_) => Type::Long,
            LiteralValue::Double(_) => Type::Double,
            LiteralValue::Float(_) => Type::Float,
            LiteralValue::Char(_) => Type::Char,
            LiteralValue::Bool(_) => Type::Bool,
            LiteralValue::Str(_) => Type::String,
            LiteralValue::Nil => Type::Nil,
        })
    }

    fn check_variable(&mut self, name: &'a str, line: u32) -> &'a Type<'a> {
        match self.table.lookup_with_depth(name) {
            Some((depth, sym)) => {
                if let Some(boundary) = self.native_lambda_boundary {
                    if depth < boundary && sym.kind != sn_binder::SymbolKind::Function {
                        self.error(line, DiagnosticKind::NativeLambdaCapture, format!("native lambda body may not reference '{name}' from an enclosing scope"));
                    }
                }
                sym.ty().unwrap_or_else(|| self.nil_ty())
            }
            None => {
                let candidates: Vec<&'a str> = self.table.visible_names().collect();
                match suggest(name, candidates) {
                    Some(s) => self.diags.error_with_suggestion(self.file, line, DiagnosticKind::UndefinedSymbol, format!("undefined symbol '{name}'"), s),
                    None => self.error(line, DiagnosticKind::UndefinedSymbol, format!("undefined symbol '{name}'")),
                }
                self.nil_ty()
            }
        }
    }

    fn check_binary(&mut self, op: BinOp, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let lty = self.check_expr(lhs);
        let rty = self.check_expr(rhs);

        let is_arith = matches!(op, BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem);
        if is_arith && (lty.is_pointer() || rty.is_pointer()) {
            self.error(line, DiagnosticKind::PointerArithmeticForbidden, "pointer arithmetic is forbidden");
            return self.nil_ty();
        }

        match op {
            BinOp::Add => {
                if lty.is_numeric() && sn_parser::type_equals(lty, rty) {
                    return lty;
                }
                let string_concat = matches!(lty, Type::String) && rty.is_printable() || matches!(rty, Type::String) && lty.is_printable();
                if string_concat {
                    return self.arena.alloc(Type::String);
                }
                self.error(line, DiagnosticKind::InvalidOperand, "'+' requires two equal numeric operands or a string and a printable value");
                self.nil_ty()
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
                if lty.is_numeric() && sn_parser::type_equals(lty, rty) {
                    lty
                } else {
                    self.error(line, DiagnosticKind::InvalidOperand, "arithmetic requires two operands of the same numeric type");
                    self.nil_ty()
                }
            }
            BinOp::Eq | BinOp::NotEq => {
                let pointer_ok = (lty.is_pointer() && rty.is_pointer() && sn_parser::type_equals(lty, rty))
                    || (lty.is_pointer() && matches!(rty, Type::Nil))
                    || (rty.is_pointer() && matches!(lty, Type::Nil));
                if pointer_ok || sn_parser::unifies_with(lty, rty) || sn_parser::unifies_with(rty, lty) {
                    self.bool_ty()
                } else {
                    self.error(line, DiagnosticKind::TypeMismatch, "equality requires two operands of the same type");
                    self.nil_ty()
                }
            }
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                if sn_parser::type_equals(lty, rty) {
                    self.bool_ty()
                } else {
                    self.error(line, DiagnosticKind::TypeMismatch, "comparison requires two operands of the same type");
                    self.nil_ty()
                }
            }
            BinOp::And | BinOp::Or => {
                if matches!(lty, Type::Bool) && matches!(rty, Type::Bool) {
                    self.bool_ty()
                } else {
                    self.error(line, DiagnosticKind::InvalidOperand, "'&&'/'||' require boolean operands");
                    self.nil_ty()
                }
            }
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let ty = self.check_expr(operand);
        match op {
            UnaryOp::Neg => {
                if ty.is_numeric() {
                    ty
                } else {
                    self.error(line, DiagnosticKind::InvalidOperand, "unary '-' requires a numeric operand");
                    self.nil_ty()
                }
            }
            UnaryOp::Not => {
                if matches!(ty, Type::Bool) {
                    self.bool_ty()
                } else {
                    self.error(line, DiagnosticKind::InvalidOperand, "'!' requires a boolean operand");
                    self.nil_ty()
                }
            }
        }
    }

    fn check_assign(&mut self, target: &'a Expr<'a>, value: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let target_ty = self.check_expr(target);
        let value_ty = self.check_expr(value);

        if let (Some(boundary), ExprKind::Variable(name)) = (self.private_entry_depth, &target.kind) {
            if value_ty.is_reference() {
                if let Some((depth, _)) = self.table.lookup_with_depth(name) {
                    if depth < boundary {
                        self.error(line, DiagnosticKind::PrivateEscape, format!("assigning a reference-typed value to outer-scope '{name}' escapes the private region"));
                    }
                }
            }
        }

        if sn_parser::unifies_with(value_ty, target_ty) {
            target_ty
        } else {
            self.error(line, DiagnosticKind::TypeMismatch, "assigned value's type does not match the target's declared type");
            target_ty
        }
    }

    fn check_call(&mut self, callee: &'a Expr<'a>, args: &'a [&'a Expr<'a>], line: u32, allow_raw_pointer: bool) -> &'a Type<'a> {
        if let ExprKind::Variable(name) = &callee.kind {
            if is_builtin_call_name(name) && self.table.lookup(name).is_none() {
                return self.check_builtin_call(name, args, line);
            }
        }

        let callee_ty = self.check_expr(callee);
        let Type::Function(ft) = callee_ty else {
            self.error(line, DiagnosticKind::InvalidOperand, "callee is not a function");
            for a in args {
                self.check_expr(a);
            }
            return self.nil_ty();
        };

        if args.len() < ft.params.len() || (!ft.is_variadic && args.len() != ft.params.len()) {
            self.error(line, DiagnosticKind::ArityMismatch, format!("expected {} argument(s), found {}", ft.params.len(), args.len()));
        }

        for (i, arg) in args.iter().enumerate() {
            let callee_is_native = ft.is_native;
            let arg_allow_raw = allow_raw_pointer || callee_is_native;
            let arg_ty = self.check_expr_inner(arg, arg_allow_raw);
            if let ExprKind::AsRef { .. } = arg.kind {
                if !callee_is_native {
                    self.error(arg.token.line, DiagnosticKind::AsRefOnParam, "'as ref' may only be used as an argument to a native function");
                }
            }
            if let Some(&param_ty) = ft.params.get(i) {
                let ok = if matches!(param_ty, Type::Any) { arg_ty.is_printable() } else { sn_parser::unifies_with(arg_ty, param_ty) };
                if !ok {
                    self.error(arg.token.line, DiagnosticKind::TypeMismatch, format!("argument {} does not match the declared parameter type", i + 1));
                }
            }
        }

        if ft.ret.is_pointer() && ft.is_native && !allow_raw_pointer && !self.ctx.is_native() {
            self.error(line, DiagnosticKind::PointerOutsideNative, "a native pointer-returning call must be consumed immediately by 'as val' outside a native function");
        }

        ft.ret
    }

    fn check_builtin_call(&mut self, name: &'a str, args: &'a [&'a Expr<'a>], line: u32) -> &'a Type<'a> {
        let Some((first, rest)) = args.split_first() else {
            self.error(line, DiagnosticKind::ArityMismatch, format!("'{name}' requires at least one argument"));
            return self.nil_ty();
        };
        let recv_ty = self.check_expr(first);
        let Type::Array(elem) = recv_ty else {
            self.error(line, DiagnosticKind::InvalidOperand, format!("'{name}' requires an array as its first argument"));
            for a in rest {
                self.check_expr(a);
            }
            return self.nil_ty();
        };
        let method_name = builtin_call_method_name(name);
        let Some(sig) = array_method_signature(self.arena, elem, method_name) else {
            self.error(line, DiagnosticKind::InvalidOperand, format!("unknown built-in '{name}'"));
            return self.nil_ty();
        };
        let Type::Function(ft) = sig else { unreachable!("array_method_signature always returns a Function type") };
        for (i, arg) in rest.iter().enumerate() {
            let arg_ty = self.check_expr(arg);
            if let Some(&param_ty) = ft.params.get(i) {
                if !sn_parser::unifies_with(arg_ty, param_ty) {
                    self.error(arg.token.line, DiagnosticKind::TypeMismatch, format!("argument {} to '{name}' does not match the expected type", i + 2));
                }
            }
        }
        ft.ret
    }

    fn check_member(&mut self, object: &'a Expr<'a>, name: &'a str, line: u32) -> &'a Type<'a> {
        let object_ty = self.check_expr(object);
        match object_ty {
            Type::Array(elem) => match array_method_signature(self.arena, elem, name) {
                Some(ty) => ty,
                None => {
                    self.report_no_such_member(name, line);
                    self.nil_ty()
                }
            },
            _ => {
                self.report_no_such_member(name, line);
                self.nil_ty()
            }
        }
    }

    fn report_no_such_member(&self, name: &str, line: u32) {
        match suggest(name, ARRAY_METHODS.iter().copied()) {
            Some(s) => self.diags.error_with_suggestion(self.file, line, DiagnosticKind::NoSuchMember, format!("no such member '{name}'"), s),
            None => self.error(line, DiagnosticKind::NoSuchMember, format!("no such member '{name}'")),
        }
    }

    fn check_array_literal(&mut self, elements: &'a [&'a Expr<'a>], _line: u32) -> &'a Type<'a> {
        let Some((first, rest)) = elements.split_first() else {
            return self.arena.alloc(Type::Array(self.nil_ty()));
        };
        let elem_ty = self.check_expr(first);
        for e in rest {
            let ty = self.check_expr(e);
            if !sn_parser::unifies_with(ty, elem_ty) && !sn_parser::unifies_with(elem_ty, ty) {
                self.error(e.token.line, DiagnosticKind::TypeMismatch, "array elements must share a common type");
            }
        }
        self.arena.alloc(Type::Array(elem_ty))
    }

    fn check_index(&mut self, base: &'a Expr<'a>, index: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let base_ty = self.check_expr(base);
        let index_ty = self.check_expr(index);
        if !index_ty.is_numeric() {
            self.error(index.token.line, DiagnosticKind::InvalidOperand, "an array index must be numeric");
        }
        match base_ty {
            Type::Array(elem) => elem,
            _ => {
                self.error(line, DiagnosticKind::InvalidOperand, "indexing requires an array");
                self.nil_ty()
            }
        }
    }

    fn check_slice(
        &mut self,
        expr: &'a Expr<'a>,
        base: &'a Expr<'a>,
        start: Option<&'a Expr<'a>>,
        end: Option<&'a Expr<'a>>,
        step: Option<&'a Expr<'a>>,
        line: u32,
    ) -> &'a Type<'a> {
        let base_ty = self.check_expr(base);
        for bound in [start, end] {
            if let Some(b) = bound {
                let bty = self.check_expr(b);
                if !bty.is_numeric() {
                    self.error(b.token.line, DiagnosticKind::InvalidOperand, "a slice bound must be numeric");
                }
            }
        }

        let from_pointer = matches!(base_ty, Type::Pointer(_));
        if from_pointer && !self.ctx.is_native() && !self.ctx.is_as_val() {
            self.error(line, DiagnosticKind::PointerOutsideNative, "slicing a pointer is only allowed inside a native function or an 'as val' operand");
        }

        if let Some(step_expr) = step {
            if from_pointer {
                self.error(step_expr.token.line, DiagnosticKind::PointerSliceStep, "a pointer slice may not take a step");
            }
            let sty = self.check_expr(step_expr);
            if !sty.is_numeric() {
                self.error(step_expr.token.line, DiagnosticKind::InvalidOperand, "a slice step must be numeric");
            } else if let ExprKind::Literal(LiteralValue::Int(n)) = step_expr.kind {
                if n <= 0 {
                    self.error(step_expr.token.line, DiagnosticKind::InvalidOperand, "a slice step must be positive");
                }
            }
        }

        let elem = match base_ty {
            Type::Array(elem) => elem,
            Type::Pointer(elem) => elem,
            _ => {
                self.error(line, DiagnosticKind::InvalidOperand, "slicing requires an array or, inside native code, a pointer");
                return self.nil_ty();
            }
        };
        if from_pointer {
            expr.set_flag(ExprFlags::IS_FROM_POINTER);
        }
        self.arena.alloc(Type::Array(elem))
    }

    fn check_incdec(&mut self, operand: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let ty = self.check_expr(operand);
        if ty.is_numeric() {
            ty
        } else {
            self.error(line, DiagnosticKind::InvalidOperand, "'++'/'--' require a numeric operand");
            self.nil_ty()
        }
    }

    fn check_interpolated(&mut self, parts: &'a [&'a Expr<'a>], _line: u32) -> &'a Type<'a> {
        for p in parts {
            let ty = self.check_expr(p);
            if !ty.is_printable() {
                self.error(p.token.line, DiagnosticKind::InvalidOperand, "interpolated values must be a printable type");
            }
        }
        self.arena.alloc(Type::String)
    }

    /// Lambda inference (spec §4.7.3) and native-lambda validation (spec
    /// §4.7.8). `expected` is the declared function type a surrounding
    /// `var` declaration propagated, if any.
    pub(crate) fn check_lambda(&mut self, expr: &'a Expr<'a>, expected: Option<&'a FunctionType<'a>>) -> &'a Type<'a> {
        let ExprKind::Lambda { params, declared_ret, resolved_ret, body, is_native } = &expr.kind else {
            unreachable!("check_lambda called on a non-lambda expression")
        };
        let line = expr.token.line;

        if let Some(ft) = expected {
            if params.len() == ft.params.len() {
                for (p, pt) in params.iter().zip(ft.params.iter()) {
                    if p.declared_ty.is_none() {
                        p.resolved_ty.set(Some(*pt));
                    }
                }
            }
            if declared_ret.is_none() {
                resolved_ret.set(Some(ft.ret));
            }
            if ft.is_native {
                is_native.set(true);
            }
        }

        let ret_ty = resolved_ret.get().or(*declared_ret).unwrap_or_else(|| self.void_ty());

        self.table.push_scope();
        let outer_return = self.return_ty.replace(ret_ty);
        let outer_boundary = self.native_lambda_boundary;
        let _native_guard = is_native.get().then(|| self.ctx.enter_native());
        if is_native.get() {
            // `push_scope` above already created this lambda's own parameter
            // scope; its index (not its length) is the boundary.
            self.native_lambda_boundary = Some(self.table.depth() - 1);
        }

        for p in *params {
            let pty = p.ty();
            if let Some(t) = pty {
                self.check_declared_type(t, line);
            }
            self.table.add_symbol(self.diags, self.file, p.name, line, sn_binder::SymbolKind::Param, None, pty);
        }

        match body {
            Body::Expr(e) => {
                let body_ty = self.check_expr(e);
                if let Some(rt) = resolved_ret.get().or(*declared_ret) {
                    if !sn_parser::unifies_with(body_ty, rt) {
                        self.error(e.token.line, DiagnosticKind::TypeMismatch, "lambda body type does not match its declared return type");
                    }
                } else {
                    resolved_ret.set(Some(body_ty));
                }
            }
            Body::Block(stmts) => {
                for s in *stmts {
                    self.check_stmt(s);
                }
            }
        }

        self.native_lambda_boundary = outer_boundary;
        self.return_ty = outer_return;
        self.table.pop_scope();

        if let Some(ft) = expected {
            if ft.is_native && params.len() != ft.params.len() {
                self.error(line, DiagnosticKind::ArityMismatch, "native lambda parameter count does not match the declared callback type");
            }
        }

        let ret_ty = resolved_ret.get().or(*declared_ret).unwrap_or_else(|| self.void_ty());
        let param_types: Vec<&'a Type<'a>> = params.iter().map(|p| p.ty().unwrap_or_else(|| self.nil_ty())).collect();
        let ft = self.arena.alloc(FunctionType {
            ret: ret_ty,
            params: self.arena.alloc_slice_fill_iter(param_types),
            param_mem_quals: None,
            is_native: is_native.get(),
            is_variadic: false,
        });
        self.arena.alloc(Type::Function(ft))
    }

    fn check_as_val(&mut self, expr: &'a Expr<'a>, operand: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let _guard = self.ctx.enter_as_val();
        let operand_ty = self.check_expr_inner(operand, true);
        match operand_ty {
            Type::Pointer(base) => {
                if matches!(base, Type::Char) {
                    expr.set_flag(ExprFlags::IS_CSTR_TO_STR);
                    self.arena.alloc(Type::String)
                } else {
                    base
                }
            }
            Type::Array(_) => {
                expr.set_flag(ExprFlags::IS_NOOP);
                operand_ty
            }
            _ => {
                self.error(line, DiagnosticKind::AsValOnNonPointer, "'as val' requires a pointer or array operand");
                self.nil_ty()
            }
        }
    }

    fn check_as_ref(&mut self, operand: &'a Expr<'a>, line: u32) -> &'a Type<'a> {
        let ty = self.check_expr(operand);
        if ty.is_primitive() {
            ty
        } else {
            self.error(line, DiagnosticKind::AsRefNonPrimitive, "'as ref' requires a primitive operand");
            self.nil_ty()
        }
    }
}

/// Used by `Param::mem_qual` validation at function-declaration time (spec
/// §4.7.4): `as ref` is legal only on a primitive parameter of a native
/// function declaration.
pub(crate) fn validate_param_mem_qual(checker: &Checker<'_>, param: &Param<'_>, is_native: bool, line: u32) {
    let Some(qual) = param.mem_qual else { return };
    let Some(ty) = param.declared_ty else { return };
    match qual {
        MemQual::Val => {
            if ty.is_primitive() {
                checker.warn(line, DiagnosticKind::AsValOnNonPointer, format!("'as val' on primitive parameter '{}' has no effect", param.name));
            }
        }
        MemQual::Ref => {
            if !ty.is_primitive() {
                checker.error(line, DiagnosticKind::AsRefNonPrimitive, format!("'as ref' parameter '{}' must be primitive", param.name));
            } else if !is_native {
                checker.error(line, DiagnosticKind::AsRefOnParam, format!("'as ref' parameter '{}' is only allowed in a native function declaration", param.name));
            }
        }
    }
}

/// Used by `VarDecl::mem_qual` validation (spec line 84/148): `as val` on a
/// primitive-typed declaration is a no-op, so it only warns; a plain
/// variable declaration is never a native function declaration, so `as
/// ref` is rejected the same way a non-native parameter's would be.
pub(crate) fn validate_var_mem_qual(checker: &Checker<'_>, name: &str, mem_qual: Option<MemQual>, ty: &Type<'_>, line: u32) {
    let Some(qual) = mem_qual else { return };
    match qual {
        MemQual::Val => {
            if ty.is_primitive() {
                checker.warn(line, DiagnosticKind::AsValOnNonPointer, format!("'as val' on primitive variable '{name}' has no effect"));
            }
        }
        MemQual::Ref => {
            if !ty.is_primitive() {
                checker.error(line, DiagnosticKind::AsRefNonPrimitive, format!("'as ref' variable '{name}' must be primitive"));
            } else {
                checker.error(line, DiagnosticKind::AsRefOnParam, format!("'as ref' on variable '{name}' is only allowed in a native function declaration"));
            }
        }
    }
}

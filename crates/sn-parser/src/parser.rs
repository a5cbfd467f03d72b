//! Parser — spec §4.4, component C4.
//!
//! Recursive-descent with explicit operator precedence. The public entry
//! point, [`Parser::parse_module`], returns a [`Module`]. The parser never
//! guesses a missing declared type (spec §4.4): a type annotation the
//! grammar allowed to be omitted becomes `None`, left for the checker's
//! inference rules (spec §4.7.2/§4.7.3) to fill in.
//!
//! Block bodies are delimited by `{ }` rather than by indentation: spec
//! §4.3 only commits the lexer to emitting a significant `Newline` token
//! and leaves "the parser decides significance" — it does not specify an
//! INDENT/DEDENT token pair. Brace-delimited blocks are the concrete,
//! unambiguous grammar chosen here; single-line bodies (`if x < 0 => return
//! 0 - x`) remain a single statement with no braces at all, matching spec
//! §6.1's summary examples.

use sn_common::diagnostics::DiagnosticKind;
use sn_common::{Arena, Diagnostics};
use sn_lexer::{Token, TokenKind};

use crate::ast::*;

pub struct Parser<'a> {
    arena: &'a Arena,
    diags: &'a Diagnostics,
    tokens: &'a [Token<'a>],
    pos: usize,
    file: &'a str,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(arena: &'a Arena, diags: &'a Diagnostics, tokens: &'a [Token<'a>], file: &'a str) -> Self {
        Parser { arena, diags, tokens, pos: 0, file }
    }

    // ---- token stream helpers -------------------------------------------------

    fn cur(&self) -> &'a Token<'a> {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_kind(&self) -> TokenKind {
        self.cur().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_keyword_text(&self, text: &str) -> bool {
        self.peek_kind() == TokenKind::Ident && self.cur().text == text
    }

    fn advance(&mut self) -> &'a Token<'a> {
        let t = self.cur();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn check_and_advance(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> &'a Token<'a> {
        if self.at(kind) {
            self.advance()
        } else {
            let tok = self.cur();
            self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, format!("expected {what}, found '{}'", tok.text));
            self.synchronize();
            tok
        }
    }

    fn expect_ident(&mut self, what: &str) -> &'a str {
        if self.at(TokenKind::Ident) {
            self.advance().text
        } else {
            let tok = self.cur();
            self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, format!("expected {what}, found '{}'", tok.text));
            ""
        }
    }

    /// Recover to the next statement boundary: a newline at the current
    /// nesting level or a closing delimiter (spec §4.4 "Error recovery").
    fn synchronize(&mut self) {
        while !self.at(TokenKind::Eof) {
            if self.at(TokenKind::Newline) || self.at(TokenKind::RBrace) {
                return;
            }
            self.advance();
        }
    }

    fn alloc_expr(&self, kind: ExprKind<'a>, token: &'a Token<'a>) -> &'a Expr<'a> {
        self.arena.alloc(Expr::new(kind, token))
    }

    fn alloc_stmt(&self, kind: StmtKind<'a>, token: &'a Token<'a>) -> &'a Stmt<'a> {
        self.arena.alloc(Stmt::new(kind, token))
    }

    fn alloc_ty(&self, ty: Type<'a>) -> &'a Type<'a> {
        self.arena.alloc(ty)
    }

    // ---- top level --------------------------------------------------------

    pub fn parse_module(&mut self) -> Module<'a> {
        let mut stmts: Vec<&'a Stmt<'a>> = Vec::new();
        self.skip_newlines();
        while !self.at(TokenKind::Eof) {
            stmts.push(self.parse_top_level_stmt());
            self.skip_newlines();
        }
        Module { filename: self.file, stmts: self.arena.alloc_slice_fill_iter(stmts) }
    }

    fn parse_top_level_stmt(&mut self) -> &'a Stmt<'a> {
        self.parse_statement()
    }

    // ---- statements ---------------------------------------------------------

    fn parse_statement(&mut self) -> &'a Stmt<'a> {
        if self.at(TokenKind::LBrace) {
            return self.parse_block(None);
        }
        if self.at_keyword_text("in") {
            // defensive: 'in' should never start a statement; treat as a
            // parse error and resynchronize rather than loop forever.
            let tok = self.advance();
            self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, "unexpected 'in'");
            return self.alloc_stmt(StmtKind::Break, tok);
        }
        match self.peek_kind() {
            TokenKind::Var => self.parse_var_decl(),
            TokenKind::Fn | TokenKind::Native => self.parse_function(FnModifier::Default),
            TokenKind::Private => self.parse_modifier_prefixed(FnModifier::Private),
            TokenKind::Shared => self.parse_modifier_prefixed(FnModifier::Shared),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(false),
            TokenKind::For => self.parse_for(false),
            TokenKind::Break => {
                let tok = self.advance();
                self.alloc_stmt(StmtKind::Break, tok)
            }
            TokenKind::Continue => {
                let tok = self.advance();
                self.alloc_stmt(StmtKind::Continue, tok)
            }
            TokenKind::Import => self.parse_import(),
            TokenKind::Type => self.parse_type_decl(),
            _ => {
                let tok = self.cur();
                let expr = self.parse_expression();
                self.alloc_stmt(StmtKind::Expr(expr), tok)
            }
        }
    }

    /// `private => ...` / `shared => ...` prefix a block (spec §4.4), or
    /// prefix a function/while/for declaration with that modifier.
    fn parse_modifier_prefixed(&mut self, modifier: FnModifier) -> &'a Stmt<'a> {
        let start = self.advance(); // consume `private`/`shared`
        match self.peek_kind() {
            TokenKind::Fn | TokenKind::Native => self.parse_function(modifier),
            TokenKind::FatArrow => {
                self.advance();
                self.parse_block(Some(modifier))
            }
            TokenKind::While if matches!(modifier, FnModifier::Shared) => {
                self.advance();
                self.parse_while(true)
            }
            TokenKind::For if matches!(modifier, FnModifier::Shared) => {
                self.advance();
                self.parse_for(true)
            }
            _ => {
                self.diags.error_at(self.file, start.line, DiagnosticKind::ParseError, "expected '=>', 'fn', 'while', or 'for' after region modifier");
                self.alloc_stmt(StmtKind::Block { stmts: &[], modifier: Some(modifier) }, start)
            }
        }
    }

    fn parse_block(&mut self, modifier: Option<FnModifier>) -> &'a Stmt<'a> {
        let open = self.expect(TokenKind::LBrace, "'{'");
        let stmts = self.parse_block_stmts();
        self.alloc_stmt(StmtKind::Block { stmts, modifier }, open)
    }

    fn parse_block_stmts(&mut self) -> &'a [&'a Stmt<'a>] {
        let mut stmts: Vec<&'a Stmt<'a>> = Vec::new();
        self.skip_newlines();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            stmts.push(self.parse_statement());
            self.skip_newlines();
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.arena.alloc_slice_fill_iter(stmts)
    }

    /// A single-line body (one statement, no braces) or a `{ }` block —
    /// used for `if`/`while`/`for`/`for-each` bodies.
    fn parse_stmt_or_block_body(&mut self) -> &'a Stmt<'a> {
        self.skip_newlines();
        if self.at(TokenKind::LBrace) {
            self.parse_block(None)
        } else {
            self.parse_statement()
        }
    }

    fn parse_var_decl(&mut self) -> &'a Stmt<'a> {
        let start = self.advance(); // `var`
        let name = self.expect_ident("a variable name");
        let declared_ty = if self.check_and_advance(TokenKind::Colon) { Some(self.parse_type()) } else { None };
        let init = if self.check_and_advance(TokenKind::Eq) { Some(self.parse_expression()) } else { None };
        let mem_qual = self.parse_optional_mem_qual();
        if declared_ty.is_none() && init.is_none() {
            self.diags.error_at(self.file, start.line, DiagnosticKind::EmptyInitializerNoType, format!("'{name}' needs a declared type or an initializer"));
        }
        self.alloc_stmt(StmtKind::VarDecl { name, declared_ty, init, mem_qual }, start)
    }

    fn parse_optional_mem_qual(&mut self) -> Option<MemQual> {
        if self.at(TokenKind::As) {
            self.advance();
            if self.check_and_advance(TokenKind::Val) {
                Some(MemQual::Val)
            } else if self.check_and_advance(TokenKind::Ref) {
                Some(MemQual::Ref)
            } else {
                let tok = self.cur();
                self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, "expected 'val' or 'ref' after 'as'");
                None
            }
        } else {
            None
        }
    }

    fn parse_function(&mut self, modifier: FnModifier) -> &'a Stmt<'a> {
        let is_native = self.check_and_advance(TokenKind::Native);
        let start = self.expect(TokenKind::Fn, "'fn'");
        let name = self.expect_ident("a function name");
        self.expect(TokenKind::LParen, "'('");
        let (params, is_variadic) = self.parse_param_list();
        self.expect(TokenKind::RParen, "')'");
        let ret = if self.check_and_advance(TokenKind::Colon) { self.parse_type() } else { self.alloc_ty(Type::Void) };

        let body = if is_native {
            None
        } else {
            self.expect(TokenKind::FatArrow, "'=>'");
            Some(self.parse_fn_body())
        };

        self.alloc_stmt(
            StmtKind::Function { name, params, ret, body, modifier, is_native, is_variadic },
            start,
        )
    }

    fn parse_param_list(&mut self) -> (&'a [Param<'a>], bool) {
        let mut params: Vec<Param<'a>> = Vec::new();
        let mut is_variadic = false;
        if self.at(TokenKind::RParen) {
            return (self.arena.alloc_slice_fill_iter(params), is_variadic);
        }
        loop {
            if self.check_and_advance(TokenKind::DotDot) {
                // `..rest` variadic marker consumes the remaining arity.
                is_variadic = true;
                if self.at(TokenKind::Ident) {
                    self.advance();
                }
            } else {
                let name = self.expect_ident("a parameter name");
                let declared_ty = if self.check_and_advance(TokenKind::Colon) { Some(self.parse_type()) } else { None };
                let mem_qual = self.parse_optional_mem_qual();
                params.push(Param::new(name, declared_ty, mem_qual));
            }
            if !self.check_and_advance(TokenKind::Comma) {
                break;
            }
        }
        (self.arena.alloc_slice_fill_iter(params), is_variadic)
    }

    fn parse_fn_body(&mut self) -> Body<'a> {
        self.skip_newlines();
        if self.at(TokenKind::LBrace) {
            self.advance();
            Body::Block(self.parse_block_stmts())
        } else {
            Body::Expr(self.parse_expression())
        }
    }

    fn parse_return(&mut self) -> &'a Stmt<'a> {
        let start = self.advance();
        let value = if self.at(TokenKind::Newline) || self.at(TokenKind::RBrace) || self.at(TokenKind::Eof) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.alloc_stmt(StmtKind::Return(value), start)
    }

    fn parse_if(&mut self) -> &'a Stmt<'a> {
        let start = self.advance();
        let cond = self.parse_expression();
        self.expect(TokenKind::FatArrow, "'=>'");
        let then_branch = self.parse_stmt_or_block_body();
        let save = self.pos;
        self.skip_newlines();
        let else_branch = if self.check_and_advance(TokenKind::Else) {
            if self.at(TokenKind::FatArrow) {
                self.advance();
            }
            Some(self.parse_stmt_or_block_body())
        } else {
            self.pos = save;
            None
        };
        self.alloc_stmt(StmtKind::If { cond, then_branch, else_branch }, start)
    }

    fn parse_while(&mut self, is_shared: bool) -> &'a Stmt<'a> {
        let start = self.advance();
        let cond = self.parse_expression();
        self.expect(TokenKind::FatArrow, "'=>'");
        let body = self.parse_stmt_or_block_body();
        self.alloc_stmt(StmtKind::While { cond, body, is_shared }, start)
    }

    fn parse_for(&mut self, is_shared: bool) -> &'a Stmt<'a> {
        let start = self.advance();
        // Disambiguate `for var NAME in ITER => BODY` (for-each) from
        // `for INIT; COND; STEP => BODY` (c-style) by looking past the
        // optional `var` and the identifier for the `in` keyword.
        if self.looks_like_for_each() {
            return self.parse_for_each(start, is_shared);
        }

        let init = if self.at(TokenKind::Semicolon) {
            None
        } else if self.at(TokenKind::Var) {
            Some(self.parse_var_decl())
        } else {
            let tok = self.cur();
            let expr = self.parse_expression();
            Some(self.alloc_stmt(StmtKind::Expr(expr), tok))
        };
        self.expect(TokenKind::Semicolon, "';'");
        let cond = if self.at(TokenKind::Semicolon) { None } else { Some(self.parse_expression()) };
        self.expect(TokenKind::Semicolon, "';'");
        let step = if self.at(TokenKind::FatArrow) { None } else { Some(self.parse_expression()) };
        self.expect(TokenKind::FatArrow, "'=>'");
        let body = self.parse_stmt_or_block_body();
        self.alloc_stmt(StmtKind::For { init, cond, step, body, is_shared }, start)
    }

    fn looks_like_for_each(&self) -> bool {
        let mut idx = self.pos;
        if matches!(self.tokens.get(idx).map(|t| t.kind), Some(TokenKind::Var)) {
            idx += 1;
        }
        if !matches!(self.tokens.get(idx).map(|t| t.kind), Some(TokenKind::Ident)) {
            return false;
        }
        idx += 1;
        matches!(self.tokens.get(idx), Some(t) if t.kind == TokenKind::Ident && t.text == "in")
    }

    fn parse_for_each(&mut self, start: &'a Token<'a>, is_shared: bool) -> &'a Stmt<'a> {
        self.check_and_advance(TokenKind::Var);
        let var_name = self.expect_ident("a loop variable name");
        if !self.at_keyword_text("in") {
            self.diags.error_at(self.file, start.line, DiagnosticKind::ParseError, "expected 'in' in for-each loop");
        } else {
            self.advance();
        }
        let iterable = self.parse_expression();
        self.expect(TokenKind::FatArrow, "'=>'");
        let body = self.parse_stmt_or_block_body();
        self.alloc_stmt(StmtKind::ForEach { var_name, iterable, body, is_shared }, start)
    }

    fn parse_import(&mut self) -> &'a Stmt<'a> {
        let start = self.advance();
        let path_tok = if self.at(TokenKind::StringLit) { self.advance() } else { self.expect(TokenKind::Ident, "an import path") };
        self.alloc_stmt(StmtKind::Import { path: path_tok.text }, start)
    }

    fn parse_type_decl(&mut self) -> &'a Stmt<'a> {
        let start = self.advance();
        let name = self.expect_ident("a type name");
        self.expect(TokenKind::Eq, "'='");
        let ty = if self.at(TokenKind::Opaque) {
            self.advance();
            self.alloc_ty(Type::Opaque(name))
        } else {
            self.parse_type()
        };
        self.alloc_stmt(StmtKind::TypeDecl { name, ty }, start)
    }

    // ---- types --------------------------------------------------------------

    fn parse_type(&mut self) -> &'a Type<'a> {
        let is_native_callback = if self.at(TokenKind::Native) {
            self.advance();
            true
        } else {
            false
        };

        let mut ty = if self.check_and_advance(TokenKind::Star) {
            let inner = self.parse_type();
            self.alloc_ty(Type::Pointer(inner))
        } else if self.at(TokenKind::Fn) {
            self.parse_fn_type(is_native_callback)
        } else if self.at(TokenKind::Ident) {
            let name = self.advance().text;
            self.alloc_ty(primitive_or_opaque(name))
        } else {
            let tok = self.cur();
            self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, format!("expected a type, found '{}'", tok.text));
            self.alloc_ty(Type::Void)
        };

        while self.at(TokenKind::LBracket) && self.peek_next_is_rbracket() {
            self.advance();
            self.advance();
            ty = self.alloc_ty(Type::Array(ty));
        }
        ty
    }

    fn peek_next_is_rbracket(&self) -> bool {
        matches!(self.tokens.get(self.pos + 1).map(|t| t.kind), Some(TokenKind::RBracket))
    }

    fn parse_fn_type(&mut self, is_native: bool) -> &'a Type<'a> {
        self.advance(); // `fn`
        self.expect(TokenKind::LParen, "'('");
        let mut params: Vec<&'a Type<'a>> = Vec::new();
        let mut quals: Vec<Option<MemQual>> = Vec::new();
        let mut is_variadic = false;
        if !self.at(TokenKind::RParen) {
            loop {
                if self.check_and_advance(TokenKind::DotDot) {
                    is_variadic = true;
                    break;
                }
                params.push(self.parse_type());
                quals.push(self.parse_optional_mem_qual());
                if !self.check_and_advance(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'");
        let ret = if self.check_and_advance(TokenKind::Colon) { self.parse_type() } else { self.alloc_ty(Type::Void) };
        let any_qual = quals.iter().any(Option::is_some);
        let param_mem_quals = if any_qual { Some(self.arena.alloc_slice_fill_iter(quals)) } else { None };
        let ft = self.arena.alloc(FunctionType {
            ret,
            params: self.arena.alloc_slice_fill_iter(params),
            param_mem_quals,
            is_native,
            is_variadic,
        });
        self.alloc_ty(Type::Function(ft))
    }

    // ---- expressions ----------------------------------------------------------

    pub fn parse_expression(&mut self) -> &'a Expr<'a> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> &'a Expr<'a> {
        let expr = self.parse_as(); // as val / as ref bind tighter than assignment
        if self.at(TokenKind::Eq) {
            let tok = self.advance();
            let value = self.parse_assignment();
            return self.alloc_expr(ExprKind::Assign { target: expr, value }, tok);
        }
        expr
    }

    fn parse_as(&mut self) -> &'a Expr<'a> {
        let mut expr = self.parse_or();
        loop {
            if self.at(TokenKind::As) {
                let tok = self.advance();
                if self.check_and_advance(TokenKind::Val) {
                    expr = self.alloc_expr(ExprKind::AsVal { operand: expr }, tok);
                } else if self.check_and_advance(TokenKind::Ref) {
                    expr = self.alloc_expr(ExprKind::AsRef { operand: expr }, tok);
                } else {
                    self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, "expected 'val' or 'ref' after 'as'");
                    break;
                }
            } else {
                break;
            }
        }
        expr
    }

    fn parse_or(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_and();
        while self.at(TokenKind::PipePipe) {
            let tok = self.advance();
            let rhs = self.parse_and();
            lhs = self.alloc_expr(ExprKind::Binary { op: BinOp::Or, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_and(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_equality();
        while self.at(TokenKind::AmpAmp) {
            let tok = self.advance();
            let rhs = self.parse_equality();
            lhs = self.alloc_expr(ExprKind::Binary { op: BinOp::And, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_equality(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_relational();
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_relational();
            lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_relational(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_additive();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_additive();
            lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_additive(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_multiplicative();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_multiplicative();
            lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_multiplicative(&mut self) -> &'a Expr<'a> {
        let mut lhs = self.parse_unary();
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Rem,
                _ => break,
            };
            let tok = self.advance();
            let rhs = self.parse_unary();
            lhs = self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, tok);
        }
        lhs
    }

    fn parse_unary(&mut self) -> &'a Expr<'a> {
        match self.peek_kind() {
            TokenKind::Minus => {
                let tok = self.advance();
                let operand = self.parse_unary();
                self.alloc_expr(ExprKind::Unary { op: UnaryOp::Neg, operand }, tok)
            }
            TokenKind::Bang => {
                let tok = self.advance();
                let operand = self.parse_unary();
                self.alloc_expr(ExprKind::Unary { op: UnaryOp::Not, operand }, tok)
            }
            TokenKind::PlusPlus => {
                let tok = self.advance();
                let operand = self.parse_unary();
                self.alloc_expr(ExprKind::IncDec { op: IncDecOp::Inc, operand, prefix: true }, tok)
            }
            TokenKind::MinusMinus => {
                let tok = self.advance();
                let operand = self.parse_unary();
                self.alloc_expr(ExprKind::IncDec { op: IncDecOp::Dec, operand, prefix: true }, tok)
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> &'a Expr<'a> {
        let mut expr = self.parse_primary();
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    let tok = self.advance();
                    let args = self.parse_arg_list();
                    self.expect(TokenKind::RParen, "')'");
                    expr = self.alloc_expr(ExprKind::Call { callee: expr, args }, tok);
                }
                TokenKind::Dot => {
                    let tok = self.advance();
                    let name = self.expect_ident("a member name");
                    if self.at(TokenKind::LParen) && is_static_receiver(expr) {
                        let type_name = static_receiver_name(expr);
                        self.advance();
                        let args = self.parse_arg_list();
                        self.expect(TokenKind::RParen, "')'");
                        expr = self.alloc_expr(ExprKind::StaticCall { type_name, method: name, args }, tok);
                    } else {
                        expr = self.alloc_expr(ExprKind::Member { object: expr, name }, tok);
                    }
                }
                TokenKind::LBracket => {
                    expr = self.parse_index_or_slice(expr);
                }
                TokenKind::PlusPlus => {
                    let tok = self.advance();
                    expr = self.alloc_expr(ExprKind::IncDec { op: IncDecOp::Inc, operand: expr, prefix: false }, tok);
                }
                TokenKind::MinusMinus => {
                    let tok = self.advance();
                    expr = self.alloc_expr(ExprKind::IncDec { op: IncDecOp::Dec, operand: expr, prefix: false }, tok);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_index_or_slice(&mut self, base: &'a Expr<'a>) -> &'a Expr<'a> {
        let tok = self.advance(); // `[`
        let start_bound = if self.at(TokenKind::DotDot) { None } else { Some(self.parse_expression()) };
        if self.check_and_advance(TokenKind::DotDot) {
            let end_bound = if self.at(TokenKind::Colon) || self.at(TokenKind::RBracket) { None } else { Some(self.parse_expression()) };
            let step = if self.check_and_advance(TokenKind::Colon) { Some(self.parse_expression()) } else { None };
            self.expect(TokenKind::RBracket, "']'");
            return self.alloc_expr(ExprKind::Slice { base, start: start_bound, end: end_bound, step }, tok);
        }
        self.expect(TokenKind::RBracket, "']'");
        let index = start_bound.unwrap_or_else(|| {
            self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, "expected an index expression");
            self.alloc_expr(ExprKind::Literal(LiteralValue::Int(0)), tok)
        });
        self.alloc_expr(ExprKind::Index { base, index }, tok)
    }

    fn parse_arg_list(&mut self) -> &'a [&'a Expr<'a>] {
        let mut args: Vec<&'a Expr<'a>> = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression());
                if !self.check_and_advance(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.arena.alloc_slice_fill_iter(args)
    }

    fn parse_primary(&mut self) -> &'a Expr<'a> {
        let tok = self.cur();
        match tok.kind {
            TokenKind::Int => {
                self.advance();
                let v = tok.text.parse::<i64>().unwrap_or(0);
                self.alloc_expr(ExprKind::Literal(LiteralValue::Int(v)), tok)
            }
            TokenKind::Long => {
                self.advance();
                let v = tok.text.trim_end_matches(['l', 'L']).parse::<i64>().unwrap_or(0);
                self.alloc_expr(ExprKind::Literal(LiteralValue::Long(v)), tok)
            }
            TokenKind::Double => {
                self.advance();
                let v = tok.text.parse::<f64>().unwrap_or(0.0);
                self.alloc_expr(ExprKind::Literal(LiteralValue::Double(v)), tok)
            }
            TokenKind::Float => {
                self.advance();
                let v = tok.text.trim_end_matches(['f', 'F']).parse::<f32>().unwrap_or(0.0);
                self.alloc_expr(ExprKind::Literal(LiteralValue::Float(v)), tok)
            }
            TokenKind::Char => {
                self.advance();
                let c = unescape_char(tok.text);
                self.alloc_expr(ExprKind::Literal(LiteralValue::Char(c)), tok)
            }
            TokenKind::Bool => {
                self.advance();
                self.alloc_expr(ExprKind::Literal(LiteralValue::Bool(tok.text == "true")), tok)
            }
            TokenKind::Nil => {
                self.advance();
                self.alloc_expr(ExprKind::Literal(LiteralValue::Nil), tok)
            }
            TokenKind::StringLit => {
                self.advance();
                self.alloc_expr(ExprKind::Literal(LiteralValue::Str(tok.text)), tok)
            }
            TokenKind::StringStart => self.parse_interpolated_string(),
            TokenKind::Ident => {
                self.advance();
                self.alloc_expr(ExprKind::Variable(tok.text), tok)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect(TokenKind::RParen, "')'");
                inner
            }
            TokenKind::LBrace => self.parse_array_literal(),
            TokenKind::Fn => self.parse_lambda(false),
            TokenKind::Native if self.tokens.get(self.pos + 1).map(|t| t.kind) == Some(TokenKind::Fn) => {
                self.advance();
                self.parse_lambda(true)
            }
            _ => {
                self.diags.error_at(self.file, tok.line, DiagnosticKind::ParseError, format!("unexpected token '{}'", tok.text));
                self.advance();
                self.alloc_expr(ExprKind::Literal(LiteralValue::Nil), tok)
            }
        }
    }

    fn parse_interpolated_string(&mut self) -> &'a Expr<'a> {
        let start_tok = self.cur();
        let mut parts: Vec<&'a Expr<'a>> = Vec::new();
        let seg = self.advance(); // StringStart
        parts.push(self.alloc_expr(ExprKind::Literal(LiteralValue::Str(seg.text)), seg));
        loop {
            parts.push(self.parse_expression());
            match self.peek_kind() {
                TokenKind::StringMid => {
                    let seg = self.advance();
                    parts.push(self.alloc_expr(ExprKind::Literal(LiteralValue::Str(seg.text)), seg));
                }
                TokenKind::StringEnd => {
                    let seg = self.advance();
                    parts.push(self.alloc_expr(ExprKind::Literal(LiteralValue::Str(seg.text)), seg));
                    break;
                }
                _ => {
                    self.diags.error_at(self.file, self.cur().line, DiagnosticKind::ParseError, "malformed interpolated string");
                    break;
                }
            }
        }
        self.alloc_expr(ExprKind::Interpolated { parts: self.arena.alloc_slice_fill_iter(parts) }, start_tok)
    }

    fn parse_array_literal(&mut self) -> &'a Expr<'a> {
        let tok = self.advance(); // `{`
        let mut elements: Vec<&'a Expr<'a>> = Vec::new();
        self.skip_newlines();
        if !self.at(TokenKind::RBrace) {
            loop {
                self.skip_newlines();
                elements.push(self.parse_expression());
                self.skip_newlines();
                if !self.check_and_advance(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBrace, "'}'");
        self.alloc_expr(ExprKind::ArrayLiteral { elements: self.arena.alloc_slice_fill_iter(elements) }, tok)
    }

    fn parse_lambda(&mut self, is_native: bool) -> &'a Expr<'a> {
        let tok = self.advance(); // `fn`
        self.expect(TokenKind::LParen, "'('");
        let (params, _variadic) = self.parse_param_list();
        self.expect(TokenKind::RParen, "')'");
        let declared_ret = if self.check_and_advance(TokenKind::Colon) { Some(self.parse_type()) } else { None };
        self.expect(TokenKind::FatArrow, "'=>'");
        let body = self.parse_fn_body();
        self.alloc_expr(
            ExprKind::Lambda {
                params,
                declared_ret,
                resolved_ret: std::cell::Cell::new(declared_ret),
                body,
                is_native: std::cell::Cell::new(is_native),
            },
            tok,
        )
    }
}

fn unescape_char(text: &str) -> char {
    if let Some(stripped) = text.strip_prefix('\\') {
        match stripped.chars().next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some(c) => c,
            None => '\0',
        }
    } else {
        text.chars().next().unwrap_or('\0')
    }
}

const PRIMITIVE_TYPE_NAMES: &[&str] = &[
    "int", "long", "double", "float", "char", "bool", "byte", "string", "void", "nil", "any", "int32", "uint", "uint32",
];

fn primitive_or_opaque<'a>(name: &'a str) -> Type<'a> {
    match name {
        "int" => Type::Int,
        "long" => Type::Long,
        "double" => Type::Double,
        "float" => Type::Float,
        "char" => Type::Char,
        "bool" => Type::Bool,
        "byte" => Type::Byte,
        "string" => Type::String,
        "void" => Type::Void,
        "nil" => Type::Nil,
        "any" => Type::Any,
        "int32" => Type::Int32,
        "uint" => Type::UInt,
        "uint32" => Type::UInt32,
        _ => Type::Opaque(name),
    }
}

#[must_use]
pub fn is_primitive_type_name(name: &str) -> bool {
    PRIMITIVE_TYPE_NAMES.contains(&name)
}

fn is_static_receiver(expr: &Expr<'_>) -> bool {
    matches!(expr.kind, ExprKind::Variable(name) if name.chars().next().is_some_and(char::is_uppercase) || is_primitive_type_name(name))
}

fn static_receiver_name<'a>(expr: &Expr<'a>) -> &'a str {
    match expr.kind {
        ExprKind::Variable(name) => name,
        _ => "",
    }
}

//! The `Stmt` tagged variant — spec §3.4.

use sn_lexer::Token;

use super::expr::{Body, Expr, MemQual, Param};
use super::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FnModifier {
    Default,
    Private,
    Shared,
}

#[derive(Debug)]
pub enum StmtKind<'a> {
    Expr(&'a Expr<'a>),
    VarDecl {
        name: &'a str,
        declared_ty: Option<&'a Type<'a>>,
        init: Option<&'a Expr<'a>>,
        mem_qual: Option<MemQual>,
    },
    Function {
        name: &'a str,
        params: &'a [Param<'a>],
        ret: &'a Type<'a>,
        body: Option<Body<'a>>,
        modifier: FnModifier,
        is_native: bool,
        is_variadic: bool,
    },
    Return(Option<&'a Expr<'a>>),
    Block {
        stmts: &'a [&'a Stmt<'a>],
        modifier: Option<FnModifier>,
    },
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Stmt<'a>,
        else_branch: Option<&'a Stmt<'a>>,
    },
    While {
        cond: &'a Expr<'a>,
        body: &'a Stmt<'a>,
        is_shared: bool,
    },
    For {
        init: Option<&'a Stmt<'a>>,
        cond: Option<&'a Expr<'a>>,
        step: Option<&'a Expr<'a>>,
        body: &'a Stmt<'a>,
        is_shared: bool,
    },
    ForEach {
        var_name: &'a str,
        iterable: &'a Expr<'a>,
        body: &'a Stmt<'a>,
        is_shared: bool,
    },
    Break,
    Continue,
    Import {
        path: &'a str,
    },
    TypeDecl {
        name: &'a str,
        ty: &'a Type<'a>,
    },
}

#[derive(Debug)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub token: &'a Token<'a>,
}

impl<'a> Stmt<'a> {
    #[must_use]
    pub fn new(kind: StmtKind<'a>, token: &'a Token<'a>) -> Self {
        Stmt { kind, token }
    }
}

impl<'a> sn_common::span::Spanned for Stmt<'a> {
    fn span(&self) -> sn_common::Span {
        self.token.span
    }
}

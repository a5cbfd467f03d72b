//! AST / Type model — spec §3.2–§3.5, component C5.

pub mod expr;
pub mod stmt;
pub mod types;

pub use expr::{BinOp, Body, Expr, ExprFlags, ExprKind, IncDecOp, LiteralValue, MemQual, Param, UnaryOp};
pub use stmt::{FnModifier, Stmt, StmtKind};
pub use types::{type_equals, unifies_with, FunctionType, HandleKind, Type};

/// A compiled module: an ordered list of top-level statements and the
/// source filename they came from (spec §3.5).
#[derive(Debug)]
pub struct Module<'a> {
    pub filename: &'a str,
    pub stmts: &'a [&'a Stmt<'a>],
}

//! Parser and AST — spec §3.2–§3.5 (types), §4.4 (grammar), component C4/C5.

pub mod ast;
pub mod parser;

pub use ast::{
    type_equals, unifies_with, BinOp, Body, Expr, ExprFlags, ExprKind, FnModifier, FunctionType, HandleKind, IncDecOp,
    LiteralValue, MemQual, Module, Param, Stmt, StmtKind, Type, UnaryOp,
};
pub use parser::{is_primitive_type_name, Parser};

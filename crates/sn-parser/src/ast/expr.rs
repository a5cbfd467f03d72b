//! The `Expr` tagged variant — spec §3.2.

use std::cell::Cell;

use sn_lexer::Token;

use super::stmt::Stmt;
use super::types::Type;

/// A tiny hand-rolled bitflags macro: a single small flag set here doesn't
/// justify a new dependency beyond what this crate already pulls in, so
/// the usual const-OR bitflags pattern is written out directly.
macro_rules! bitflags_lite {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $repr:ty {
            $(
                $(#[$cmeta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name($repr);

        impl $name {
            $(
                $(#[$cmeta])*
                pub const $flag: Self = Self($value);
            )*

            #[must_use]
            pub const fn empty() -> Self {
                Self(0)
            }

            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                (self.0 & other.0) == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemQual {
    Val,
    Ref,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Clone, Copy, Debug)]
pub enum LiteralValue<'a> {
    Int(i64),
    Long(i64),
    Double(f64),
    Float(f32),
    Char(char),
    Bool(bool),
    Str(&'a str),
    Nil,
}

/// A function or lambda parameter. `declared_ty` is `None` when the
/// grammar allowed the type to be omitted (lambda parameters, spec §4.4);
/// `resolved_ty` is filled in by the checker's lambda-inference rule (spec
/// §4.7.3) and memoized exactly like an expression's resolved type.
#[derive(Debug)]
pub struct Param<'a> {
    pub name: &'a str,
    pub declared_ty: Option<&'a Type<'a>>,
    pub mem_qual: Option<MemQual>,
    pub resolved_ty: Cell<Option<&'a Type<'a>>>,
}

impl<'a> Param<'a> {
    #[must_use]
    pub fn new(name: &'a str, declared_ty: Option<&'a Type<'a>>, mem_qual: Option<MemQual>) -> Self {
        Param { name, declared_ty, mem_qual, resolved_ty: Cell::new(declared_ty) }
    }

    #[must_use]
    pub fn ty(&self) -> Option<&'a Type<'a>> {
        self.resolved_ty.get().or(self.declared_ty)
    }
}

/// A lambda/function body: either a single expression (spec §4.4's
/// single-line form) or an indented statement block.
#[derive(Debug)]
pub enum Body<'a> {
    Expr(&'a Expr<'a>),
    Block(&'a [&'a Stmt<'a>]),
}

#[derive(Debug)]
pub enum ExprKind<'a> {
    Literal(LiteralValue<'a>),
    Variable(&'a str),
    Binary {
        op: BinOp,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    Assign {
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    /// `Type.method(...)` (spec §3.3).
    StaticCall {
        type_name: &'a str,
        method: &'a str,
        args: &'a [&'a Expr<'a>],
    },
    Member {
        object: &'a Expr<'a>,
        name: &'a str,
    },
    ArrayLiteral {
        elements: &'a [&'a Expr<'a>],
    },
    Index {
        base: &'a Expr<'a>,
        index: &'a Expr<'a>,
    },
    Slice {
        base: &'a Expr<'a>,
        start: Option<&'a Expr<'a>>,
        end: Option<&'a Expr<'a>>,
        step: Option<&'a Expr<'a>>,
    },
    IncDec {
        op: IncDecOp,
        operand: &'a Expr<'a>,
        prefix: bool,
    },
    /// An ordered sequence of sub-expressions reconstructed from the
    /// lexer's `StringStart`/`StringMid`/`StringEnd` token sub-sequence
    /// (spec §3.3, §4.3). Literal text segments are represented as
    /// `Literal(Str(..))` entries interleaved with the real
    /// sub-expressions, in source order.
    Interpolated {
        parts: &'a [&'a Expr<'a>],
    },
    Lambda {
        params: &'a [Param<'a>],
        declared_ret: Option<&'a Type<'a>>,
        resolved_ret: Cell<Option<&'a Type<'a>>>,
        body: Body<'a>,
        is_native: Cell<bool>,
    },
    /// `e as val` — the pointer-unwrap bridge (spec §4.7.5).
    AsVal {
        operand: &'a Expr<'a>,
    },
    /// `e as ref` — take a reference to a primitive location (spec §4.7.6).
    AsRef {
        operand: &'a Expr<'a>,
    },
}

bitflags_lite! {
    /// Flags the checker attaches to an expression node while resolving
    /// its type, consumed by the (out-of-scope) code generator. See spec
    /// §4.7.5 / §4.7.1.
    pub struct ExprFlags: u8 {
        /// `as val` on `pointer(char)` requests null-terminated
        /// C-string-to-`string` conversion.
        const IS_CSTR_TO_STR = 1 << 0;
        /// A slice expression whose base was a pointer (spec §4.7.5).
        const IS_FROM_POINTER = 1 << 1;
        /// `as val` on an already-managed `array(T)`: a no-op.
        const IS_NOOP = 1 << 2;
    }
}

/// A single expression node (spec §3.3). `resolved_type` is memoized: once
/// set, a second visit by the checker returns the cached value without
/// re-evaluating (spec §3.3 invariant, §9 "Memoization of resolved types").
#[derive(Debug)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub token: &'a Token<'a>,
    resolved_type: Cell<Option<&'a Type<'a>>>,
    flags: Cell<ExprFlags>,
}

impl<'a> Expr<'a> {
    #[must_use]
    pub fn new(kind: ExprKind<'a>, token: &'a Token<'a>) -> Self {
        Expr { kind, token, resolved_type: Cell::new(None), flags: Cell::new(ExprFlags::empty()) }
    }

    #[must_use]
    pub fn resolved_type(&self) -> Option<&'a Type<'a>> {
        self.resolved_type.get()
    }

    /// Set the resolved type exactly once. Spec §3.3's invariant is that a
    /// second visit is a cache hit, not a second write; callers (the
    /// checker) are expected to check `resolved_type()` before calling
    /// this, but calling it twice with the same value is harmless.
    pub fn set_resolved_type(&self, ty: &'a Type<'a>) {
        self.resolved_type.set(Some(ty));
    }

    #[must_use]
    pub fn flags(&self) -> ExprFlags {
        self.flags.get()
    }

    pub fn set_flag(&self, flag: ExprFlags) {
        self.flags.set(self.flags.get() | flag);
    }
}

impl<'a> sn_common::span::Spanned for Expr<'a> {
    fn span(&self) -> sn_common::Span {
        self.token.span
    }
}

//! The arena context stack — spec §3.7 / §4.7.11.
//!
//! Three independent counters track whether the checker is currently
//! descending into a `private` region, a native function/lambda body, or
//! the operand of an `as val` cast. Spec §3.7 requires "every push is
//! matched on every return path, including error paths" — the natural
//! idiomatic-Rust reading of that requirement is an RAII guard: each
//! `enter_*` call returns a guard whose `Drop` impl pops, so a `?` or an
//! early `return` inside the checker can never leave a counter stuck.
//!
//! Guards hold a cloned `Rc<ArenaContext>` rather than a borrow: the
//! checker recurses through `&mut self` while a guard from an outer call
//! frame is still alive, and a borrowed guard would fight the borrow
//! checker over that `&mut self` for no benefit in a single-threaded
//! walk (spec §5 — this is never shared across threads).

use std::cell::Cell;
use std::rc::Rc;

#[derive(Default)]
pub struct ArenaContext {
    arena_depth: Cell<u32>,
    in_native: Cell<u32>,
    in_as_val: Cell<u32>,
}

impl ArenaContext {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(ArenaContext::default())
    }

    #[must_use]
    pub fn arena_depth(&self) -> u32 {
        self.arena_depth.get()
    }

    #[must_use]
    pub fn in_native(&self) -> u32 {
        self.in_native.get()
    }

    #[must_use]
    pub fn in_as_val(&self) -> u32 {
        self.in_as_val.get()
    }

    /// "inside private" per spec §3.7.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.arena_depth.get() > 0
    }

    /// "inside native" per spec §3.7.
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.in_native.get() > 0
    }

    /// "inside as val" per spec §3.7.
    #[must_use]
    pub fn is_as_val(&self) -> bool {
        self.in_as_val.get() > 0
    }

    /// All counters back at zero — the invariant checked at the start and
    /// end of every top-level statement (spec §8's boundary invariants).
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.arena_depth.get() == 0 && self.in_native.get() == 0 && self.in_as_val.get() == 0
    }

    /// Entered on a `private` block or a non-shared loop body (spec §3.7).
    #[must_use]
    pub fn enter_private(self: &Rc<Self>) -> PrivateGuard {
        self.arena_depth.set(self.arena_depth.get() + 1);
        PrivateGuard { ctx: Rc::clone(self) }
    }

    /// Entered while descending into a native function/lambda body.
    #[must_use]
    pub fn enter_native(self: &Rc<Self>) -> NativeGuard {
        self.in_native.set(self.in_native.get() + 1);
        NativeGuard { ctx: Rc::clone(self) }
    }

    /// Entered while descending into the operand of an `as val` cast.
    #[must_use]
    pub fn enter_as_val(self: &Rc<Self>) -> AsValGuard {
        self.in_as_val.set(self.in_as_val.get() + 1);
        AsValGuard { ctx: Rc::clone(self) }
    }
}

pub struct PrivateGuard {
    ctx: Rc<ArenaContext>,
}

impl Drop for PrivateGuard {
    fn drop(&mut self) {
        self.ctx.arena_depth.set(self.ctx.arena_depth.get() - 1);
    }
}

pub struct NativeGuard {
    ctx: Rc<ArenaContext>,
}

impl Drop for NativeGuard {
    fn drop(&mut self) {
        self.ctx.in_native.set(self.ctx.in_native.get() - 1);
    }
}

pub struct AsValGuard {
    ctx: Rc<ArenaContext>,
}

impl Drop for AsValGuard {
    fn drop(&mut self) {
        self.ctx.in_as_val.set(self.ctx.in_as_val.get() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_nest_and_unwind_in_order() {
        let ctx = ArenaContext::new();
        assert!(ctx.is_at_rest());
        {
            let _outer = ctx.enter_private();
            assert_eq!(ctx.arena_depth(), 1);
            {
                let _inner = ctx.enter_private();
                assert_eq!(ctx.arena_depth(), 2);
            }
            assert_eq!(ctx.arena_depth(), 1);
        }
        assert!(ctx.is_at_rest());
    }

    #[test]
    fn counters_are_independent() {
        let ctx = ArenaContext::new();
        let _p = ctx.enter_private();
        let _n = ctx.enter_native();
        assert!(ctx.is_private());
        assert!(ctx.is_native());
        assert!(!ctx.is_as_val());
    }

    #[test]
    fn early_return_through_question_mark_still_pops() {
        fn inner(ctx: &Rc<ArenaContext>) -> Result<(), ()> {
            let _g = ctx.enter_as_val();
            Err(())?;
            Ok(())
        }
        let ctx = ArenaContext::new();
        let _ = inner(&ctx);
        assert!(ctx.is_at_rest());
    }
}

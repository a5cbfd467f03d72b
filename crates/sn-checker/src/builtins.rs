//! Array method table and built-in call signatures — spec §4.7.1, §6.2, §9.
//!
//! "Rather than polymorphism, dispatch by the operand's static type inside
//! a single member-access rule; the method table is closed and known at
//! compile time" (spec §9). Every signature here is synthesized on demand
//! from the array's element type `T` rather than stored as a static table,
//! since `T` varies per call site and `Type` values are arena-borrowed.

use sn_common::Arena;
use sn_parser::{FunctionType, Type};

/// The fixed method alphabet for array member access (spec §4.7.1).
pub const ARRAY_METHODS: &[&str] = &["length", "push", "pop", "clear", "concat", "indexOf", "contains", "clone", "join", "reverse", "insert", "remove"];

/// The free-function built-in call names routed to a dedicated rule
/// instead of ordinary call-type-checking (spec §4.7.1).
pub const BUILTIN_CALL_NAMES: &[&str] = &["len", "pop", "rev", "push", "rem", "ins"];

#[must_use]
pub fn is_builtin_call_name(name: &str) -> bool {
    BUILTIN_CALL_NAMES.contains(&name)
}

/// Synthesizes the function type a member-access node should resolve to
/// for `name` on `array(elem)`, or `None` if `name` isn't in the fixed
/// method alphabet (a `NoSuchMember` case, for the caller to report).
pub fn array_method_signature<'a>(arena: &'a Arena, elem: &'a Type<'a>, name: &str) -> Option<&'a Type<'a>> {
    let array_of_elem = || -> &'a Type<'a> { arena.alloc(Type::Array(elem)) };
    let void = || -> &'a Type<'a> { arena.alloc(Type::Void) };
    let int = || -> &'a Type<'a> { arena.alloc(Type::Int) };
    let bool_ty = || -> &'a Type<'a> { arena.alloc(Type::Bool) };
    let string_ty = || -> &'a Type<'a> { arena.alloc(Type::String) };

    let (ret, params, is_variadic): (&'a Type<'a>, Vec<&'a Type<'a>>, bool) = match name {
        "length" => (int(), vec![], false),
        "push" => (void(), vec![elem], true),
        "pop" => (elem, vec![], false),
        "clear" => (void(), vec![], false),
        "concat" => (array_of_elem(), vec![array_of_elem()], false),
        "indexOf" => (int(), vec![elem], false),
        "contains" => (bool_ty(), vec![elem], false),
        "clone" => (array_of_elem(), vec![], false),
        "join" => (string_ty(), vec![string_ty()], false),
        "reverse" => (array_of_elem(), vec![], false),
        "insert" => (void(), vec![int(), elem], false),
        "remove" => (elem, vec![int()], false),
        _ => return None,
    };
    let ft = arena.alloc(FunctionType {
        ret,
        params: arena.alloc_slice_fill_iter(params),
        param_mem_quals: None,
        is_native: false,
        is_variadic,
    });
    Some(arena.alloc(Type::Function(ft)))
}

/// Maps a built-in *call* name (spec §4.7.1: `len`, `pop`, `rev`, `push`,
/// `rem`, `ins`) to the array-method name it's an alias for, so call-style
/// (`len(xs)`) and member-style (`xs.length()`) built-ins share one
/// signature source.
#[must_use]
pub fn builtin_call_method_name(call_name: &str) -> &str {
    match call_name {
        "len" => "length",
        "rev" => "reverse",
        "rem" => "remove",
        "ins" => "insert",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_takes_the_element_type_and_returns_void() {
        let arena = Arena::new();
        let ty = array_method_signature(&arena, &Type::Int, "push").unwrap();
        match ty {
            Type::Function(ft) => {
                assert!(matches!(ft.ret, Type::Void));
                assert_eq!(ft.params.len(), 1);
                assert!(matches!(ft.params[0], Type::Int));
            }
            other => panic!("expected a function type, got {other:?}"),
        }
    }

    #[test]
    fn unknown_method_name_returns_none() {
        let arena = Arena::new();
        assert!(array_method_signature(&arena, &Type::Int, "sort").is_none());
    }
}

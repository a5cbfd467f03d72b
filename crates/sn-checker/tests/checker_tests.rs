use sn_checker::Checker;
use sn_common::diagnostics::DiagnosticKind;
use sn_common::{Arena, Diagnostics};
use sn_lexer::Lexer;
use sn_parser::{FnModifier, Parser};

fn check(src: &str) -> (sn_parser::Module<'static>, &'static Diagnostics) {
    let arena: &'static Arena = Box::leak(Box::new(Arena::new()));
    let diags: &'static Diagnostics = Box::leak(Box::new(Diagnostics::new()));
    let source: &'static str = Box::leak(src.to_string().into_boxed_str());
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens: &'static [sn_lexer::Token<'static>] = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(arena, diags, tokens, "t.sn");
    let module = parser.parse_module();
    assert!(!diags.had_error(), "parse errors: {:?}", diags.entries());
    let mut checker = Checker::new(arena, diags, "t.sn");
    checker.check_module(&module);
    (module, diags)
}

fn kinds(diags: &Diagnostics) -> Vec<DiagnosticKind> {
    diags.entries().iter().map(|d| d.kind).collect()
}

#[test]
fn well_typed_module_produces_no_diagnostics() {
    let (_, diags) = check("fn add(a: int, b: int): int => a + b\n");
    assert!(!diags.had_error());
}

#[test]
fn undefined_symbol_is_reported_with_a_suggestion() {
    let (_, diags) = check("fn f(): int {\n  var length: int = 1\n  return lenght\n}\n");
    let entries = diags.entries();
    let hit = entries.iter().find(|d| d.kind == DiagnosticKind::UndefinedSymbol).expect("UndefinedSymbol reported");
    assert_eq!(hit.suggestion.as_deref(), Some("length"));
}

#[test]
fn redeclared_local_in_the_same_scope_is_an_error() {
    let (_, diags) = check("fn f(): void {\n  var x: int = 1\n  var x: int = 2\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::RedeclaredSymbol));
}

#[test]
fn shadowing_in_a_nested_block_is_not_an_error() {
    let (_, diags) = check("fn f(): void {\n  var x: int = 1\n  private => {\n    var x: int = 2\n  }\n}\n");
    assert!(!diags.had_error());
}

#[test]
fn pointer_type_outside_native_is_forbidden() {
    let (_, diags) = check("fn f(): void {\n  var p: *int\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::PointerOutsideNative));
}

#[test]
fn pointer_type_is_allowed_in_a_native_function() {
    let (_, diags) = check("native fn f(p: *int): void\n");
    assert!(!diags.had_error());
}

#[test]
fn pointer_arithmetic_is_forbidden_even_inside_native_code() {
    let src = "native fn get(): *int\nfn f(): void {\n  var cb: native fn(): int = native fn(): int => {\n    var p: *int = get()\n    return p + 1\n  }\n}\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::PointerArithmeticForbidden));
}

/// Boundary scenario: a `private` function may not return an
/// arena-allocated (reference-typed) value out of its own region.
#[test]
fn private_function_returning_an_array_is_an_escape() {
    let (_, diags) = check("private fn f(): int[] => return {1, 2, 3}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::PrivateEscape));
}

/// A `private` function returning a primitive is fine — only reference
/// types are subject to the escape rule.
#[test]
fn private_function_returning_a_primitive_is_not_an_escape() {
    let (_, diags) = check("private fn f(): int => return 1\n");
    assert!(!diags.had_error());
}

#[test]
fn assigning_a_private_blocks_array_to_an_outer_variable_is_an_escape() {
    let src = "fn f(): void {\n  var out: int[] = {}\n  private => {\n    out = {1, 2, 3}\n  }\n}\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::PrivateEscape));
}

#[test]
fn assigning_within_the_same_private_region_is_not_an_escape() {
    let src = "fn f(): void {\n  private => {\n    var out: int[] = {}\n    out = {1, 2, 3}\n  }\n}\n";
    let (_, diags) = check(src);
    assert!(!diags.had_error());
}

/// Boundary scenario: a pointer slice is flagged `IS_FROM_POINTER`, and
/// wrapping it in `as val` is a no-op (`IS_NOOP`) rather than a conversion,
/// since the slice already produced a managed array.
#[test]
fn slicing_a_native_pointer_then_as_val_is_a_noop_over_a_pointer_slice() {
    let src = "native fn get(): *int\nnative fn len(): int\nfn f(): int[] {\n  var p: *int = get()\n  return p[0:len()] as val\n}\n";
    let (_, diags) = check(src);
    assert!(!diags.had_error(), "{:?}", diags.entries());
}

#[test]
fn as_val_on_array_is_a_noop_type_preserving_cast() {
    let src = "fn f(): int[] {\n  var a: int[] = {1, 2}\n  return a as val\n}\n";
    let (_, diags) = check(src);
    assert!(!diags.had_error());
}

#[test]
fn as_ref_requires_a_primitive_operand() {
    let src = "native fn take(p: int as ref): void\nfn f(): void {\n  var a: int[] = {1}\n  take(a as ref)\n}\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::AsRefNonPrimitive));
}

#[test]
fn as_ref_outside_a_native_call_argument_is_rejected() {
    let src = "fn f(): void {\n  var x: int = 1\n  var y = x as ref\n}\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::AsRefOnParam));
}

/// `as val` on a declaration with no initializer (the only form that
/// leaves the qualifier on `VarDecl.mem_qual` rather than folded into the
/// initializer expression itself) is a no-op over a primitive type.
#[test]
fn as_val_on_a_primitive_var_declaration_with_no_initializer_warns() {
    let (_, diags) = check("fn f(): void {\n  var x: int as val\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::AsValOnNonPointer), "{:?}", diags.entries());
}

#[test]
fn as_ref_on_a_primitive_var_declaration_with_no_initializer_is_rejected() {
    let (_, diags) = check("fn f(): void {\n  var x: int as ref\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::AsRefOnParam), "{:?}", diags.entries());
}

#[test]
fn as_ref_on_a_non_primitive_var_declaration_with_no_initializer_is_rejected() {
    let (_, diags) = check("fn f(): void {\n  var x: int[] as ref\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::AsRefNonPrimitive), "{:?}", diags.entries());
}

#[test]
fn native_lambda_cannot_capture_an_enclosing_local() {
    let src = "fn f(): void {\n  var x: int = 1\n  var cb: native fn(): int = native fn(): int => x\n}\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::NativeLambdaCapture));
}

#[test]
fn native_callback_type_rejects_a_string_parameter() {
    let src = "type Cb = native fn(s: string): void\n";
    let (_, diags) = check(src);
    assert!(kinds(&diags).contains(&DiagnosticKind::NativeCallbackNonCompat));
}

#[test]
fn array_method_call_resolves_through_the_builtin_table() {
    let (_, diags) = check("fn f(): int {\n  var a: int[] = {1, 2, 3}\n  return a.length()\n}\n");
    assert!(!diags.had_error());
}

#[test]
fn unknown_array_method_is_reported_with_a_suggestion() {
    let (_, diags) = check("fn f(): int {\n  var a: int[] = {1, 2, 3}\n  return a.lenght()\n}\n");
    let entries = diags.entries();
    let hit = entries.iter().find(|d| d.kind == DiagnosticKind::NoSuchMember).expect("NoSuchMember reported");
    assert_eq!(hit.suggestion.as_deref(), Some("length"));
}

#[test]
fn call_style_builtin_len_aliases_the_length_method() {
    let (_, diags) = check("fn f(): int {\n  var a: int[] = {1, 2, 3}\n  return len(a)\n}\n");
    assert!(!diags.had_error());
}

#[test]
fn call_style_builtin_rev_aliases_the_reverse_method() {
    let (_, diags) = check("fn f(): int[] {\n  var a: int[] = {1, 2, 3}\n  return rev(a)\n}\n");
    assert!(!diags.had_error(), "{:?}", diags.entries());
}

#[test]
fn byte_array_narrows_from_an_int_literal_array() {
    let (_, diags) = check("fn f(): void {\n  var b: byte[] = {1, 2, 3}\n}\n");
    assert!(!diags.had_error());
}

#[test]
fn type_mismatch_on_a_var_declaration_is_reported() {
    let (_, diags) = check("fn f(): void {\n  var x: int = true\n}\n");
    assert!(kinds(&diags).contains(&DiagnosticKind::TypeMismatch));
}

#[test]
fn empty_array_literal_unifies_with_a_declared_element_type() {
    let (_, diags) = check("fn f(): void {\n  var xs: int[] = {}\n}\n");
    assert!(!diags.had_error());
}

#[test]
fn re_checking_the_same_module_is_idempotent() {
    let arena = Arena::new();
    let diags = Diagnostics::new();
    let source = "fn add(a: int, b: int): int => a + b\n";
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(&arena, &diags, tokens, "t.sn");
    let module = parser.parse_module();
    let mut checker = Checker::new(&arena, &diags, "t.sn");
    checker.check_module(&module);
    let first_count = diags.entries().len();
    checker.check_module(&module);
    assert_eq!(diags.entries().len(), first_count, "a second check pass must hit the memoized resolved types, not re-report");
}

#[test]
fn lambda_parameter_type_propagates_from_the_declared_function_type() {
    let src = "fn f(): void {\n  var cb: fn(x: int): int = fn(x) => x + 1\n}\n";
    let (_, diags) = check(src);
    assert!(!diags.had_error());
}

#[test]
fn import_statement_is_purely_structural() {
    let (_, diags) = check("import \"other.sn\"\n");
    assert!(!diags.had_error());
}

#[test]
fn public_signatures_collects_non_private_top_level_functions() {
    let arena = Arena::new();
    let diags = Diagnostics::new();
    let source = "fn add(a: int, b: int): int => a + b\nprivate fn helper(): void => return\n";
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(&arena, &diags, tokens, "t.sn");
    let module = parser.parse_module();
    let mut checker = Checker::new(&arena, &diags, "t.sn");
    checker.check_module(&module);
    let sigs = checker.public_signatures(&module);
    assert!(sigs.iter().any(|s| s.name == "add"));
    assert!(!sigs.iter().any(|s| s.name == "helper"));
}

/// Boundary scenario (spec §4.7.4): a function declared with no modifier
/// that returns a reference-kind value is implicitly promoted to `shared`,
/// since its caller could otherwise hold the returned value outside the
/// callee's own arena region. The promotion must be visible to importers.
#[test]
fn non_private_function_returning_an_array_is_promoted_to_shared() {
    let arena = Arena::new();
    let diags = Diagnostics::new();
    let source = "fn make(): int[] => return {1, 2, 3}\n";
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(&arena, &diags, tokens, "t.sn");
    let module = parser.parse_module();
    let mut checker = Checker::new(&arena, &diags, "t.sn");
    checker.check_module(&module);
    let sigs = checker.public_signatures(&module);
    let make = sigs.iter().find(|s| s.name == "make").expect("make is public");
    assert_eq!(make.modifier, FnModifier::Shared);
}

/// A non-private function returning a primitive is left at its declared
/// (default) modifier — the promotion only applies to reference-kind
/// return types.
#[test]
fn non_private_function_returning_a_primitive_keeps_its_declared_modifier() {
    let arena = Arena::new();
    let diags = Diagnostics::new();
    let source = "fn add(a: int, b: int): int => a + b\n";
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(&arena, &diags, tokens, "t.sn");
    let module = parser.parse_module();
    let mut checker = Checker::new(&arena, &diags, "t.sn");
    checker.check_module(&module);
    let sigs = checker.public_signatures(&module);
    let add = sigs.iter().find(|s| s.name == "add").expect("add is public");
    assert_eq!(add.modifier, FnModifier::Default);
}

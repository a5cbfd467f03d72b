use sn_common::{Arena, Diagnostics};
use sn_lexer::Lexer;
use sn_parser::{BinOp, Body, ExprKind, FnModifier, MemQual, Parser, StmtKind, Type};

fn parse(src: &str) -> (sn_parser::Module<'static>, &'static Diagnostics) {
    let arena: &'static Arena = Box::leak(Box::new(Arena::new()));
    let diags: &'static Diagnostics = Box::leak(Box::new(Diagnostics::new()));
    let source: &'static str = Box::leak(src.to_string().into_boxed_str());
    let tokens = Lexer::new(source, "t.sn").tokenize().expect("lex ok");
    let tokens: &'static [sn_lexer::Token<'static>] = arena.alloc_slice_fill_iter(tokens);
    let mut parser = Parser::new(arena, diags, tokens, "t.sn");
    (parser.parse_module(), diags)
}

#[test]
fn single_line_function_has_an_expression_body() {
    let (module, diags) = parse("fn double(x: int): int => x * 2\n");
    assert!(!diags.had_error());
    assert_eq!(module.stmts.len(), 1);
    match &module.stmts[0].kind {
        StmtKind::Function { name, params, body, modifier, is_native, .. } => {
            assert_eq!(*name, "double");
            assert_eq!(params.len(), 1);
            assert_eq!(*modifier, FnModifier::Default);
            assert!(!is_native);
            match body {
                Some(Body::Expr(e)) => assert!(matches!(e.kind, ExprKind::Binary { op: BinOp::Mul, .. })),
                other => panic!("expected an expression body, got {other:?}"),
            }
        }
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn native_function_declaration_has_no_body() {
    let (module, diags) = parse("native fn strlen(s: *char): int\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::Function { body, is_native, .. } => {
            assert!(is_native);
            assert!(body.is_none());
        }
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn private_block_wraps_its_statements() {
    let (module, diags) = parse("private => {\n  var x: int = 1\n}\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::Block { stmts, modifier } => {
            assert_eq!(*modifier, Some(FnModifier::Private));
            assert_eq!(stmts.len(), 1);
        }
        other => panic!("expected a block, got {other:?}"),
    }
}

#[test]
fn var_decl_with_as_val_memory_qualifier() {
    let (module, diags) = parse("var x: int = p as val\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { mem_qual: None, init: Some(e), .. } => {
            assert!(matches!(e.kind, ExprKind::AsVal { .. }));
        }
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn var_decl_trailing_as_ref_qualifier() {
    let (module, diags) = parse("var y: int = 0 as ref\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => {
            assert!(matches!(e.kind, ExprKind::AsRef { .. }));
        }
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn slice_with_step_parses_all_three_bounds() {
    let (module, diags) = parse("var x = xs[1..5:2]\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::Slice { start: Some(_), end: Some(_), step: Some(_), .. } => {}
            other => panic!("expected a full slice, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn for_each_loop_parses_shared_prefix() {
    let (module, diags) = parse("shared for x in xs => {\n  var y: int = x\n}\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::ForEach { var_name, is_shared, .. } => {
            assert_eq!(*var_name, "x");
            assert!(is_shared);
        }
        other => panic!("expected a for-each loop, got {other:?}"),
    }
}

#[test]
fn c_style_for_loop_parses_all_three_clauses() {
    let (module, diags) = parse("for var i: int = 0; i < 10; i++ => {\n  var y: int = i\n}\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::For { init: Some(_), cond: Some(_), step: Some(_), is_shared: false, .. } => {}
        other => panic!("expected a c-style for loop, got {other:?}"),
    }
}

#[test]
fn interpolated_string_reconstructs_literal_and_expr_parts() {
    let (module, diags) = parse("var x = \"a${y}b\"\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::Interpolated { parts } => {
                assert_eq!(parts.len(), 3);
                assert!(matches!(parts[0].kind, ExprKind::Literal(sn_parser::LiteralValue::Str("a"))));
                assert!(matches!(parts[1].kind, ExprKind::Variable("y")));
                assert!(matches!(parts[2].kind, ExprKind::Literal(sn_parser::LiteralValue::Str("b"))));
            }
            other => panic!("expected an interpolated string, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn lambda_with_declared_param_and_return_types() {
    let (module, diags) = parse("var f: fn(int):int = fn(x: int): int => x + 1\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::Lambda { params, declared_ret, .. } => {
                assert_eq!(params.len(), 1);
                assert!(matches!(declared_ret, Some(Type::Int)));
            }
            other => panic!("expected a lambda, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn native_lambda_parses_without_capture_syntax() {
    let (module, diags) = parse("var cb = native fn(a: *void): int => 0\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::Lambda { is_native, .. } => assert!(is_native.get()),
            other => panic!("expected a lambda, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn static_call_on_a_builtin_type_name() {
    let (module, diags) = parse("var x = string.format(\"a\")\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::StaticCall { type_name: "string", method: "format", .. } => {}
            other => panic!("expected a static call, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn member_call_on_an_ordinary_variable_is_not_a_static_call() {
    let (module, diags) = parse("var x = xs.push(1)\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { init: Some(e), .. } => match &e.kind {
            ExprKind::Call { callee, .. } => assert!(matches!(callee.kind, ExprKind::Member { name: "push", .. })),
            other => panic!("expected a call, got {other:?}"),
        },
        other => panic!("expected a var decl, got {other:?}"),
    }
}

#[test]
fn type_decl_with_opaque_rhs() {
    let (module, diags) = parse("type Handle = opaque\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::TypeDecl { name: "Handle", ty } => assert!(matches!(ty, Type::Opaque("Handle"))),
        other => panic!("expected a type decl, got {other:?}"),
    }
}

#[test]
fn array_type_annotation_parses_as_nested_array() {
    let (module, diags) = parse("var xs: int[][] = {}\n");
    assert!(!diags.had_error());
    match &module.stmts[0].kind {
        StmtKind::VarDecl { declared_ty: Some(Type::Array(inner)), .. } => {
            assert!(matches!(inner, Type::Array(_)));
        }
        other => panic!("expected a nested array type, got {other:?}"),
    }
}

#[test]
fn mem_qual_on_a_parameter_is_recorded() {
    let (module, _diags) = parse("fn f(x: int as ref): int => x\n");
    match &module.stmts[0].kind {
        StmtKind::Function { params, .. } => {
            assert_eq!(params[0].mem_qual, Some(MemQual::Ref));
        }
        other => panic!("expected a function, got {other:?}"),
    }
}

#[test]
fn unterminated_block_reports_a_parse_error_rather_than_hanging() {
    let (_module, diags) = parse("fn f(): int => {\n  return 1\n");
    assert!(diags.had_error());
}

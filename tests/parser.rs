mod common;

use std::thread;

use paste::paste;
use pretty_assertions::{assert_eq, assert_str_eq};

use cntc::ast::{AssignOpKind, BinOpKind, Expr, IntLit, Stmt, TyKind, UnOpKind};
use cntc::parse::token::TokenType;
use cntc::parse::{Cursor, Lexer, LexerErrorKind, Parser, ParserError};
use cntc::position::{HasSpan, Spanned};

use self::common::{parse, parse_expr, with_source_file};

macro_rules! parser_tests {
    { $( $name:ident: $code:expr => $expected:expr, )+ } => {
        $(
            paste! {
                #[test]
                fn [< test_ $name >]() {
                    let actual = match parse($code) {
                        Ok(dump) => dump,
                        Err(e) => panic!("parsing failed: {}", e),
                    };

                    assert_str_eq!(actual, $expected);
                }
            }
        )+
    };
}

macro_rules! expr_tests {
    { $( $name:ident: $code:expr => $expected:expr, )+ } => {
        $(
            paste! {
                #[test]
                fn [< test_expr_ $name >]() {
                    let actual = match parse_expr($code) {
                        Ok(dump) => dump,
                        Err(e) => panic!("parsing failed: {}", e),
                    };

                    assert_str_eq!(actual, $expected);
                }
            }
        )+
    };
}

expr_tests! {
    assign_right_assoc: "a = b = c" => "(= a (= b c))",
    compound_assign: "x += 1 + 2" => "(+= x (+ 1 2))",
    pow_assign: "x ^= 2" => "(^= x 2)",
    pow_right_assoc: "2^3^2" => "(^ 2 (^ 3 2))",
    sub_left_assoc: "a - b - c" => "(- (- a b) c)",
    div_left_assoc: "a / b % c * d" => "(* (% (/ a b) c) d)",
    mul_over_add: "a + b * c" => "(+ a (* b c))",
    relational_over_logical: "a < b && c >= d" => "(&& (< a b) (>= c d))",
    logical_left_assoc: "a || b && c" => "(&& (|| a b) c)",
    relational_left_assoc: "a < b == c" => "(== (< a b) c)",
    negate_wraps_pow: "-x ^ 2" => "(neg (^ x 2))",
    not: "!a && b" => "(&& (not a) b)",
    group: "(a + b) * c" => "(* (group (+ a b)) c)",
    call_no_args: "f()" => "(call f)",
    call_args: "f(1, 2)" => "(call f 1 2)",
    call_nested: "f(g(x), y[0])" => "(call f (call g x) (index y 0))",
    index_assign: "a[i + 1] = 2" => "(= (index a (+ i 1)) 2)",
    literals: "f(true, false, 12.5, 1.0, 7)" => "(call f true false 12.5 1.0 7)",
    string: r#"x = "a\nb""# => r#"(= x "a\nb")"#,
    compound_assigns: "a -= b *= c /= d %= e" => "(-= a (*= b (/= c (%= d e))))",
    relational_ops: "a != b <= c > d" => "(> (<= (!= a b) c) d)",
}

parser_tests! {
    empty: "" => "",
    expr_stmt: "print(x);" => "(call print x)\n",
    var_def: "int mut x = 1;" => "(var (int mut x) 1)\n",
    var_def_modifiers: "real ref mut y;" => "(var (real mut ref y))\n",
    var_def_string: r#"string s = "hi";"# => "(var (string s) \"hi\")\n",
    func_def: "int add(int a, int b) return a + b; end"
        => "(func (int add) ((int a) (int b)) (return (+ a b)))\n",
    func_def_empty: "void f() end" => "(func (void f) ())\n",
    func_def_ref_param: "void swap(int ref a, int ref b) int t = a; a = b; b = t; end"
        => "(func (void swap) ((int ref a) (int ref b)) (var (int t) a) (= a b) (= b t))\n",
    if_chain: "if a then x = 1; elseif b then x = 2; else x = 3; end"
        => "(if a (then (= x 1)) (elseif b (= x 2)) (else (= x 3)))\n",
    if_multiple_elseifs: "if a then elseif b then x; elseif c then y; end"
        => "(if a (then) (elseif b x) (elseif c y))\n",
    if_empty: "if a then end" => "(if a (then))\n",
    while_loop: "while i < 10 do i += 1; end" => "(while (< i 10) (+= i 1))\n",
    return_empty: "return;" => "(return)\n",
    return_value: "return x * 2;" => "(return (* x 2))\n",
    labels: "outer: while true do break outer; continue; end"
        => "(label outer)\n(while true (break outer) (continue))\n",
    continue_label: "continue inner;" => "(continue inner)\n",
    program: "int x = 0;\nwhile x < 3 do\n  x += 1;\nend\nprint(x);\n"
        => "(var (int x) 0)\n(while (< x 3) (+= x 1))\n(call print x)\n",
}

fn parse_single_expr<R>(code: &str, f: impl FnOnce(&Expr<'_>) -> R) -> R {
    with_source_file(code.as_bytes(), |file| {
        let mut parser = Parser::new(Lexer::new(Cursor::new(file)));
        let expr = parser.parse_expr().unwrap();

        f(&expr)
    })
}

#[test]
fn test_operator_kinds() {
    let bin_ops = [
        ("a + b", BinOpKind::Add),
        ("a - b", BinOpKind::Subtract),
        ("a * b", BinOpKind::Multiply),
        ("a / b", BinOpKind::Divide),
        ("a % b", BinOpKind::Remainder),
        ("a ^ b", BinOpKind::Power),
        ("a == b", BinOpKind::Equals),
        ("a != b", BinOpKind::NotEquals),
        ("a < b", BinOpKind::Less),
        ("a <= b", BinOpKind::LessEquals),
        ("a > b", BinOpKind::Greater),
        ("a >= b", BinOpKind::GreaterEquals),
        ("a && b", BinOpKind::And),
        ("a || b", BinOpKind::Or),
    ];

    for (code, expected) in bin_ops {
        parse_single_expr(code, |expr| match expr {
            Expr::BinOp(bin_op) => assert_eq!(bin_op.op, expected, "{}", code),
            _ => panic!("expected a binary operation for {}, got {:?}", code, expr),
        });
    }

    let assign_ops = [
        ("a = b", AssignOpKind::Assign),
        ("a += b", AssignOpKind::Add),
        ("a -= b", AssignOpKind::Subtract),
        ("a *= b", AssignOpKind::Multiply),
        ("a /= b", AssignOpKind::Divide),
        ("a %= b", AssignOpKind::Remainder),
        ("a ^= b", AssignOpKind::Power),
    ];

    for (code, expected) in assign_ops {
        parse_single_expr(code, |expr| match expr {
            Expr::Assignment(assignment) => assert_eq!(assignment.op, expected, "{}", code),
            _ => panic!("expected an assignment for {}, got {:?}", code, expr),
        });
    }

    for (code, expected) in [("-a", UnOpKind::Negate), ("!a", UnOpKind::Not)] {
        parse_single_expr(code, |expr| match expr {
            Expr::UnOp(un_op) => assert_eq!(un_op.op, expected, "{}", code),
            _ => panic!("expected a unary operation for {}, got {:?}", code, expr),
        });
    }
}

#[test]
fn test_declared_types() {
    let code = b"void a; bool b; int c; real d; string e;";

    with_source_file(code, |file| {
        let program = Parser::new(Lexer::new(Cursor::new(file))).parse().unwrap();

        let types = program
            .body
            .iter()
            .map(|stmt| match stmt {
                Stmt::VarDef(var_def) => var_def.decl.ty,
                _ => panic!("expected a variable definition, got {:?}", stmt),
            })
            .collect::<Vec<_>>();

        assert_eq!(
            types,
            vec![
                TyKind::Void,
                TyKind::Bool,
                TyKind::Int,
                TyKind::Real,
                TyKind::String,
            ]
        );
    });
}

fn parse_err(code: &str) -> ParserError<'static> {
    match parse(code) {
        Ok(dump) => panic!("parsing unexpectedly succeeded: {}", dump),
        Err(e) => e,
    }
}

#[test]
fn test_call_args_in_order() {
    with_source_file(b"f(1, 2)", |file| {
        let mut parser = Parser::new(Lexer::new(Cursor::new(file)));
        let expr = parser.parse_expr().unwrap();

        let call = match &*expr {
            Expr::Call(call) => call,
            _ => panic!("expected a call, got {:?}", expr),
        };

        assert_eq!(call.callee.as_slice(), b"f");

        let args = call
            .args
            .iter()
            .map(|arg| match arg {
                Expr::Int(IntLit(Spanned { value, .. })) => *value,
                _ => panic!("expected an int literal, got {:?}", arg),
            })
            .collect::<Vec<_>>();

        assert_eq!(args, vec![1, 2]);
    });
}

#[test]
fn test_missing_semicolon() {
    let err = parse_err("x = 1");

    insta::assert_snapshot!(err.to_string(), @"expected `;`, found end of stream");
    assert_eq!(err.expected(), Some(vec!["`;`".to_owned()]));
}

#[test]
fn test_missing_do() {
    let err = parse_err("while x end");

    insta::assert_snapshot!(err.to_string(), @"expected `do`, found `end`");
}

#[test]
fn test_unexpected_primary() {
    let err = parse_err("x = --y;");

    insta::assert_snapshot!(
        err.to_string(),
        @"expected `(`, `true`, `false`, an integer literal, a real literal, a string literal, or an identifier, found `-`"
    );
}

#[test]
fn test_missing_end() {
    let err = parse_err("if a then x = 1;");

    match err {
        ParserError::UnexpectedToken { actual, .. } => assert_eq!(actual.ty(), TokenType::Eof),
        _ => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn test_error_position() {
    let err = parse_err("int x = ;");
    let span = err.span();

    assert_eq!((span.start.line, span.start.col), (1, 9));
}

#[test]
fn test_duplicate_modifier() {
    let err = parse_err("int mut mut x;");

    assert!(matches!(err, ParserError::DuplicateModifier(_)));
    insta::assert_snapshot!(err.to_string(), @"the modifier `mut` is specified more than once");
}

#[test]
fn test_integer_too_large() {
    let err = parse_err("x = 99999999999999999999;");

    assert!(matches!(err, ParserError::IntegerTooLarge(_)));
    insta::assert_snapshot!(
        err.to_string(),
        @"the integer literal 99999999999999999999 is too large"
    );
}

#[test]
fn test_malformed_real() {
    assert!(parse("x = 12.5;").is_ok());

    match parse_err("x = 12.;") {
        ParserError::LexerError(e) => assert_eq!(e.kind(), LexerErrorKind::MalformedNumber),
        err => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn test_stray_keyword() {
    let err = parse_err("then;");

    match err {
        ParserError::UnexpectedToken { actual, .. } => {
            assert_eq!(actual.ty().to_string(), "`then`");
        }

        _ => panic!("unexpected error: {:?}", err),
    }
}

/// Runs `f` on a thread with the stack size of a typical main thread.
fn run_with_main_stack<F: FnOnce() + Send + 'static>(f: F) {
    thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

/// Parses `nest(depth)` for increasing depths and returns the first depth that fails to parse,
/// asserting that it failed due to the recursion limit.
fn first_rejected_depth(nest: impl Fn(usize) -> String) -> usize {
    for depth in 1..=1000 {
        match parse(&nest(depth)) {
            Ok(_) => continue,
            Err(ParserError::RecursionLimit(_)) => return depth,
            Err(e) => panic!("nesting depth {} failed to parse: {}", depth, e),
        }
    }

    panic!("no nesting depth up to 1000 reached the recursion limit");
}

#[test]
fn test_recursion_limit_nested_ifs() {
    run_with_main_stack(|| {
        let depth = first_rejected_depth(|depth| {
            format!("{}x;{}", "if a then ".repeat(depth), "end ".repeat(depth))
        });

        assert!(depth > 60, "rejected at depth {}", depth);
    });
}

#[test]
fn test_recursion_limit_nested_whiles() {
    run_with_main_stack(|| {
        let depth = first_rejected_depth(|depth| {
            format!("{}x;{}", "while a do ".repeat(depth), "end ".repeat(depth))
        });

        assert!(depth > 60, "rejected at depth {}", depth);
    });
}

#[test]
fn test_recursion_limit_nested_parens() {
    run_with_main_stack(|| {
        let depth = first_rejected_depth(|depth| {
            format!("{}x{};", "(".repeat(depth), ")".repeat(depth))
        });

        assert!(depth > 20, "rejected at depth {}", depth);
    });
}

#[test]
fn test_recursion_limit_nested_calls() {
    run_with_main_stack(|| {
        let depth = first_rejected_depth(|depth| {
            format!("{}x{};", "f(".repeat(depth), ")".repeat(depth))
        });

        assert!(depth > 15, "rejected at depth {}", depth);
    });
}

#[test]
fn test_recursion_limit_far_past_limit() {
    run_with_main_stack(|| {
        let depth = 5000;
        let code = format!("{}x;{}", "if (a) then ".repeat(depth), "end ".repeat(depth));

        assert!(matches!(
            parse(&code),
            Err(ParserError::RecursionLimit(_))
        ));
    });

    insta::assert_snapshot!(
        ParserError::RecursionLimit(Default::default()).to_string(),
        @"a recursion limit has been reached while parsing"
    );
}

#[test]
fn test_moderate_nesting() {
    run_with_main_stack(|| {
        let depth = 20;
        let code = format!("{}x{};", "(".repeat(depth), ")".repeat(depth));

        assert!(parse(&code).is_ok());

        let code = format!("{}x;{}", "if a then ".repeat(depth), "end ".repeat(depth));

        assert!(parse(&code).is_ok());
    });
}

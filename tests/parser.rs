use loxide::ast::{Expr, LiteralValue, Stmt};
use loxide::ast_printer::AstPrinter;
use loxide::context::Context;
use loxide::parser::Parser;
use loxide::scanner::Scanner;
use loxide::token::Token;

fn tokenize<'a>(source: &'a str, ctx: &mut Context) -> Vec<Token<'a>> {
    ctx.set_stage("scanning");

    let tokens = Scanner::new(source, ctx).scan_tokens();

    assert!(!ctx.has_static_errors(), "scan errors in test source");

    ctx.set_stage("parsing");
    tokens
}

/// Parse a single expression statement and render its expression tree.
fn render_expression(source: &str) -> String {
    let mut ctx = Context::new();
    let tokens = tokenize(source, &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(!ctx.has_static_errors(), "{:?}", ctx.static_errors());
    assert_eq!(statements.len(), 1);

    match &statements[0] {
        Stmt::Expression(expr) | Stmt::Print(expr) => AstPrinter.print(expr),
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(render_expression("1 + 2 * 3;"), "(+ 1.0 (* 2.0 3.0))");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(
        render_expression("(1 + 2) * 3;"),
        "(* (group (+ 1.0 2.0)) 3.0)"
    );
}

#[test]
fn comparison_binds_tighter_than_equality() {
    assert_eq!(
        render_expression("1 < 2 == true;"),
        "(== (< 1.0 2.0) true)"
    );
}

#[test]
fn logical_or_is_lower_than_and() {
    assert_eq!(
        render_expression("a or b and c;"),
        "(or a (and b c))"
    );
}

#[test]
fn unary_is_right_associative() {
    assert_eq!(render_expression("!!true;"), "(! (! true))");
    assert_eq!(render_expression("--1;"), "(- (- 1.0))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(render_expression("a = b = 1;"), "(= a (= b 1.0))");
}

#[test]
fn call_chains_produce_nested_nodes() {
    assert_eq!(render_expression("f(1)(2, 3);"), "(call (call f 1.0) 2.0 3.0)");
}

#[test]
fn parse_is_deterministic_over_identical_token_sequences() {
    let source = "var x = 1; { x = x + 2; } if (x) print x; while (x < 9) x = x * 2;";

    let mut ctx_a = Context::new();
    let tokens_a = tokenize(source, &mut ctx_a);
    let statements_a = Parser::new(&tokens_a, &mut ctx_a).parse();

    let mut ctx_b = Context::new();
    let tokens_b = tokenize(source, &mut ctx_b);
    let statements_b = Parser::new(&tokens_b, &mut ctx_b).parse();

    assert_eq!(statements_a, statements_b);
}

#[test]
fn for_desugars_into_while_at_parse_time() {
    let mut ctx = Context::new();
    let tokens = tokenize("for (var i = 0; i < 3; i = i + 1) print i;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(!ctx.has_static_errors());
    assert_eq!(statements.len(), 1);

    // { var i = 0; while (i < 3) { print i; i = i + 1; } }
    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected outer block, got {:?}", statements[0]);
    };

    assert_eq!(outer.len(), 2);
    assert!(matches!(&outer[0], Stmt::Var { name, .. } if name.lexeme == "i"));

    let Stmt::While { condition, body } = &outer[1] else {
        panic!("expected while, got {:?}", outer[1]);
    };

    assert!(matches!(condition, Expr::Binary { .. }));

    let Stmt::Block(inner) = body.as_ref() else {
        panic!("expected wrapped body block, got {:?}", body);
    };

    assert_eq!(inner.len(), 2);
    assert!(matches!(&inner[0], Stmt::Print(_)));
    assert!(matches!(&inner[1], Stmt::Expression(Expr::Assign { .. })));
}

#[test]
fn for_with_absent_clauses_defaults_condition_to_true() {
    let mut ctx = Context::new();
    let tokens = tokenize("for (;;) print 1;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(!ctx.has_static_errors());

    // No initializer and no increment means no wrapping blocks.
    let Stmt::While { condition, body } = &statements[0] else {
        panic!("expected bare while, got {:?}", statements[0]);
    };

    assert_eq!(*condition, Expr::Literal(LiteralValue::True));
    assert!(matches!(body.as_ref(), Stmt::Print(_)));
}

#[test]
fn invalid_assignment_target_is_nonfatal() {
    let mut ctx = Context::new();
    let tokens = tokenize("1 = 2;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert_eq!(ctx.static_errors().len(), 1);
    assert!(ctx.static_errors()[0].contains("Invalid assignment target"));

    // Parsing continued with the parsed left-hand expression.
    assert_eq!(
        statements,
        vec![Stmt::Expression(Expr::Literal(LiteralValue::Number(1.0)))]
    );
}

#[test]
fn missing_semicolon_names_the_expectation() {
    let mut ctx = Context::new();
    let tokens = tokenize("print 1", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(statements.is_empty());
    assert_eq!(ctx.static_errors().len(), 1);
    assert!(ctx.static_errors()[0].contains("Expected ';'"));
}

#[test]
fn two_malformed_statements_yield_exactly_two_diagnostics() {
    let mut ctx = Context::new();
    let tokens = tokenize("var ; var ;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(statements.is_empty());
    assert_eq!(ctx.static_errors().len(), 2);

    for error in ctx.static_errors() {
        assert!(error.contains("(stage parsing)"), "missing stage: {}", error);
    }
}

#[test]
fn parser_resynchronizes_and_resumes_after_an_error() {
    let mut ctx = Context::new();
    let tokens = tokenize("var ; print 1; if (missing print 2; print 3;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert_eq!(ctx.static_errors().len(), 2);

    // The well-formed statements around the errors survive.
    assert_eq!(statements.len(), 2);
    assert!(matches!(&statements[0], Stmt::Print(_)));
    assert!(matches!(&statements[1], Stmt::Print(_)));
}

#[test]
fn var_declaration_without_initializer() {
    let mut ctx = Context::new();
    let tokens = tokenize("var x;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(!ctx.has_static_errors());
    assert!(matches!(
        &statements[0],
        Stmt::Var {
            name,
            initializer: None
        } if name.lexeme == "x"
    ));
}

#[test]
fn if_with_and_without_else() {
    let mut ctx = Context::new();
    let tokens = tokenize("if (a) print 1; else print 2; if (b) print 3;", &mut ctx);
    let statements = Parser::new(&tokens, &mut ctx).parse();

    assert!(!ctx.has_static_errors());
    assert_eq!(statements.len(), 2);
    assert!(matches!(
        &statements[0],
        Stmt::If {
            else_branch: Some(_),
            ..
        }
    ));
    assert!(matches!(
        &statements[1],
        Stmt::If {
            else_branch: None,
            ..
        }
    ));
}

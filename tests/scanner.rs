use loxide::context::Context;
use loxide::scanner::Scanner;
use loxide::token::{Token, TokenType};

fn scan(source: &str) -> (Vec<Token<'_>>, Context) {
    let mut ctx = Context::new();
    ctx.set_stage("scanning");

    let tokens = Scanner::new(source, &mut ctx).scan_tokens();

    (tokens, ctx)
}

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let (tokens, ctx) = scan(source);

    assert!(!ctx.has_static_errors(), "unexpected scan errors");
    assert_eq!(tokens.len(), expected.len());

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn scans_symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn two_character_operators_use_maximal_munch() {
    assert_token_sequence(
        "! != = == < <= > >=",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords_are_distinguished_from_identifiers() {
    assert_token_sequence(
        "var foo = true and nilly or nil",
        &[
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "foo"),
            (TokenType::EQUAL, "="),
            (TokenType::TRUE, "true"),
            (TokenType::AND, "and"),
            (TokenType::IDENTIFIER, "nilly"),
            (TokenType::OR, "or"),
            (TokenType::NIL, "nil"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn string_literal_carries_unquoted_contents() {
    let (tokens, ctx) = scan("\"hello world\"");

    assert!(!ctx.has_static_errors());
    assert_eq!(tokens.len(), 2);

    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "hello world"),
        other => panic!("expected STRING, got {:?}", other),
    }

    assert_eq!(tokens[0].lexeme, "\"hello world\"");
}

#[test]
fn number_literals_parse_as_f64() {
    let (tokens, _) = scan("123 3.14");

    match tokens[0].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 123.0),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }

    match tokens[1].token_type {
        TokenType::NUMBER(n) => assert_eq!(n, 3.14),
        ref other => panic!("expected NUMBER, got {:?}", other),
    }
}

#[test]
fn trailing_dot_is_not_part_of_a_number() {
    assert_token_sequence(
        "123.",
        &[
            (TokenType::NUMBER(123.0), "123"),
            (TokenType::DOT, "."),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn line_comment_runs_to_end_of_line() {
    assert_token_sequence(
        "1 // all of this is ignored * + (\n2",
        &[
            (TokenType::NUMBER(1.0), "1"),
            (TokenType::NUMBER(2.0), "2"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn slash_without_second_slash_is_division() {
    assert_token_sequence(
        "1 / 2",
        &[
            (TokenType::NUMBER(1.0), "1"),
            (TokenType::SLASH, "/"),
            (TokenType::NUMBER(2.0), "2"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn newlines_increment_the_line_counter() {
    let (tokens, _) = scan("1\n2\n\n3");

    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[2].line, 4);
}

#[test]
fn empty_input_yields_exactly_one_eof() {
    let (tokens, ctx) = scan("");

    assert!(!ctx.has_static_errors());
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::EOF);
}

#[test]
fn unexpected_characters_are_reported_and_scanning_continues() {
    let (tokens, ctx) = scan(",.$(#");

    // The two bad characters are dropped; scanning picks up right after.
    assert_token_types(
        &tokens,
        &[
            TokenType::COMMA,
            TokenType::DOT,
            TokenType::LEFT_PAREN,
            TokenType::EOF,
        ],
    );

    assert_eq!(ctx.static_errors().len(), 2);

    for error in ctx.static_errors() {
        assert!(
            error.contains("Unexpected character"),
            "unexpected message: {}",
            error
        );
        assert!(error.contains("(stage scanning)"), "missing stage: {}", error);
    }
}

#[test]
fn unterminated_string_aborts_only_that_token() {
    let (tokens, ctx) = scan("1 \"never closed");

    assert_token_types(&tokens, &[TokenType::NUMBER(1.0), TokenType::EOF]);
    assert_eq!(ctx.static_errors().len(), 1);
    assert!(ctx.static_errors()[0].contains("Unterminated string"));
}

#[test]
fn last_token_is_always_the_end_marker() {
    for source in ["", "1 + 2", "\"open", "$$$", "// only a comment"] {
        let (tokens, _) = scan(source);

        let eof_count = tokens
            .iter()
            .filter(|t| t.token_type == TokenType::EOF)
            .count();

        assert_eq!(eof_count, 1, "source {:?}", source);
        assert_eq!(tokens.last().unwrap().token_type, TokenType::EOF);
    }
}

#[test]
fn token_display_is_the_stable_debug_tuple() {
    let (tokens, _) = scan("var x = 3 \"hi\" 2.5");

    let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

    assert_eq!(rendered[0], "VAR var null");
    assert_eq!(rendered[1], "IDENTIFIER x null");
    assert_eq!(rendered[2], "EQUAL = null");
    assert_eq!(rendered[3], "NUMBER 3 3.0");
    assert_eq!(rendered[4], "STRING \"hi\" hi");
    assert_eq!(rendered[5], "NUMBER 2.5 2.5");
    assert_eq!(rendered[6], "EOF  null");
}

fn assert_token_types(tokens: &[Token], expected: &[TokenType]) {
    assert_eq!(tokens.len(), expected.len());

    for (actual, expected_type) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
    }
}

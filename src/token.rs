use log::debug;
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the scanner.
///
/// Variants without data represent single-character, two-character, or
/// keyword tokens. `STRING(String)` and `NUMBER(f64)` carry their parsed
/// literal values. `IDENTIFIER` is used for user-defined names. `EOF` marks
/// the end of input; the scanner emits exactly one of them.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,
    /// ')'
    RIGHT_PAREN,
    /// '{'
    LEFT_BRACE,
    /// '}'
    RIGHT_BRACE,
    /// ','
    COMMA,
    /// '.'
    DOT,
    /// '-'
    MINUS,
    /// '+'
    PLUS,
    /// ';'
    SEMICOLON,
    /// '/'
    SLASH,
    /// '*'
    STAR,
    /// '!'
    BANG,
    /// '!='
    BANG_EQUAL,
    /// '='
    EQUAL,
    /// '=='
    EQUAL_EQUAL,
    /// '>'
    GREATER,
    /// '>='
    GREATER_EQUAL,
    /// '<'
    LESS,
    /// '<='
    LESS_EQUAL,

    /// A user-defined identifier.
    IDENTIFIER,

    /// A string literal (contents without quotes).
    STRING(String),

    /// A numeric literal.
    NUMBER(f64),

    // Reserved words.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End-of-input marker.
    EOF,
}

impl PartialEq for TokenType {
    /// Two `TokenType`s are equal if they share the same variant, ignoring
    /// any inner literal data. Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl TokenType {
    /// Variant name without payloads, for the debug tuple rendering.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::STRING(_) => "STRING",
            TokenType::NUMBER(_) => "NUMBER",
            TokenType::AND => "AND",
            TokenType::CLASS => "CLASS",
            TokenType::ELSE => "ELSE",
            TokenType::FALSE => "FALSE",
            TokenType::FUN => "FUN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::NIL => "NIL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::EOF => "EOF",
        }
    }
}

/// A scanned token: its type, the exact source slice that produced it, and
/// the 1-based line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// 1-based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new token with the given type, lexeme, and line.
    pub fn new(token_type: TokenType, lexeme: &'a str, line: usize) -> Self {
        debug!(
            "Creating token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    /// Stable debug tuple: `KIND lexeme literal`, where `literal` is the
    /// parsed value for strings and numbers and `null` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant: &'static str = self.token_type.name();

        match &self.token_type {
            TokenType::STRING(s) => write!(f, "{} {} {}", variant, self.lexeme, s),

            // 3 -> "3.0", 3.14 -> "3.14" (integral path uses a stack buffer)
            TokenType::NUMBER(n) if n.fract() == 0.0 => {
                let mut buf: itoa::Buffer = itoa::Buffer::new();

                write!(f, "{} {} {}.0", variant, self.lexeme, buf.format(*n as i64))
            }

            TokenType::NUMBER(n) => write!(f, "{} {} {}", variant, self.lexeme, n),

            _ => write!(f, "{} {} null", variant, self.lexeme),
        }
    }
}

//! Single-pass lexer turning source text into an ordered token sequence.
//!
//! The scanner never fails as a whole: malformed input records a static
//! diagnostic in the shared [`Context`] and scanning resumes with the next
//! character. The returned sequence always ends with exactly one `EOF`
//! token. Lexemes are zero-copy slices of the original source buffer.

use crate::context::Context;
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

// Reserved word table (compile-time perfect hash).
static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// A single-pass **scanner / lexer**. The lifetime `'a` ties every emitted
/// token's `lexeme` slice back to the original source buffer.
pub struct Scanner<'a, 'c> {
    src: &'a str,
    start: usize, // index of the first byte of the current lexeme
    curr: usize,  // index one past the last byte examined
    line: usize,  // 1-based line counter (\n increments)
    ctx: &'c mut Context,
}

impl<'a, 'c> Scanner<'a, 'c> {
    /// Create a new lexer over `src`, recording diagnostics into `ctx`.
    pub fn new(src: &'a str, ctx: &'c mut Context) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            ctx,
        }
    }

    /// Consume the whole input and return the token sequence, terminated by
    /// exactly one `EOF` token. Never raises; lexical errors are recorded
    /// and scanning continues.
    pub fn scan_tokens(&mut self) -> Vec<Token<'a>> {
        let mut tokens: Vec<Token<'a>> = Vec::new();

        while !self.is_at_end() {
            self.start = self.curr;

            if let Some(token_type) = self.scan_token() {
                let lexeme: &'a str = &self.src[self.start..self.curr];

                debug!("Scanned token ({:?}) on line {}", token_type, self.line);

                tokens.push(Token::new(token_type, lexeme, self.line));
            }
        }

        tokens.push(Token::new(TokenType::EOF, "", self.line));

        info!("Scanning produced {} tokens", tokens.len());

        tokens
    }

    // ───────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it. Callers always guard with
    /// [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it. Returns `0` if past
    /// the end to avoid branching at call-site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes()[self.curr]
        }
    }

    /// Peek one byte beyond [`Self::peek`]. Safe at the end of input.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.src.len() {
            0
        } else {
            self.bytes()[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────── core lexing ──────────────────────────────

    /// Scan a single lexeme starting at `self.start`. Returns the token
    /// kind, or `None` for whitespace, comments, and malformed input (the
    /// latter after recording a diagnostic).
    fn scan_token(&mut self) -> Option<TokenType> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ─────────────────────────────
            b'(' => Some(TokenType::LEFT_PAREN),
            b')' => Some(TokenType::RIGHT_PAREN),
            b'{' => Some(TokenType::LEFT_BRACE),
            b'}' => Some(TokenType::RIGHT_BRACE),
            b',' => Some(TokenType::COMMA),
            b'.' => Some(TokenType::DOT),
            b'-' => Some(TokenType::MINUS),
            b'+' => Some(TokenType::PLUS),
            b';' => Some(TokenType::SEMICOLON),
            b'*' => Some(TokenType::STAR),

            // ── two-character operators (maximal munch) ──────────────────
            b'!' => {
                if self.match_byte(b'=') {
                    Some(TokenType::BANG_EQUAL)
                } else {
                    Some(TokenType::BANG)
                }
            }

            b'=' => {
                if self.match_byte(b'=') {
                    Some(TokenType::EQUAL_EQUAL)
                } else {
                    Some(TokenType::EQUAL)
                }
            }

            b'<' => {
                if self.match_byte(b'=') {
                    Some(TokenType::LESS_EQUAL)
                } else {
                    Some(TokenType::LESS)
                }
            }

            b'>' => {
                if self.match_byte(b'=') {
                    Some(TokenType::GREATER_EQUAL)
                } else {
                    Some(TokenType::GREATER)
                }
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => None,

            b'\n' => {
                self.line += 1;
                None
            }

            // ── comments (// ... to end of line), else division ──────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast-forward to the next newline with memchr; if none
                    // remains, skip to the end of input.
                    if let Some(pos) = memchr(b'\n', &self.bytes()[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.src.len();
                    }

                    None
                } else {
                    Some(TokenType::SLASH)
                }
            }

            // ── string literal " ... " ───────────────────────────────────
            b'"' => self.parse_string(),

            // ── number literal (digit-leading) ───────────────────────────
            b'0'..=b'9' => Some(self.parse_number()),

            // ── identifiers / keywords (letter-leading) ──────────────────
            b'a'..=b'z' | b'A'..=b'Z' => Some(self.parse_identifier()),

            // ── unrecognized character ───────────────────────────────────
            _ => {
                self.ctx.report_static(
                    self.line,
                    &format!("Unexpected character '{}'", b as char),
                );

                None
            }
        }
    }

    /// Parse a double-quoted string literal. `self.start` still points to
    /// the opening `"`; on success `self.curr` points past the closing one.
    /// An unterminated string aborts only this token.
    fn parse_string(&mut self) -> Option<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1; // multi-line strings are allowed
            }
        }

        if self.is_at_end() {
            self.ctx.report_static(self.line, "Unterminated string");

            return None;
        }

        self.advance(); // consume closing quote

        // Slice excluding the surrounding quotes.
        let value: &str = &self.src[self.start + 1..self.curr - 1];

        Some(TokenType::STRING(value.to_owned()))
    }

    /// Parse a numeric literal (`123`, `3.14`). The fraction is optional; a
    /// trailing `.` without digits is left for the next token.
    fn parse_number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume "."

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: &str = &self.src[self.start..self.curr];
        let n: f64 = lexeme.parse::<f64>().unwrap_or(0.0); // digits checked above

        TokenType::NUMBER(n)
    }

    /// Parse an identifier and decide whether it is a reserved word or a
    /// generic `IDENTIFIER`.
    fn parse_identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }

        let lexeme: &str = &self.src[self.start..self.curr];

        KEYWORDS
            .get(lexeme)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

/*!
Recursive-descent parser with precedence climbing and per-declaration error
recovery.

Grammar (EBNF, condensed)
-------------------------

```text
program        → declaration* EOF ;
declaration    → varDecl | statement ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | printStmt | whileStmt | forStmt
               | ifStmt | block ;
exprStmt       → expression ";" ;
printStmt      → "print" expression ";" ;
whileStmt      → "while" "(" expression ")" statement ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
               expression? ";" expression? ")" statement ;
ifStmt         → "if" "(" expression ")" statement ( "else" statement )? ;
block          → "{" declaration* "}" ;
expression     → assignment ;
assignment     → IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" )* ;
arguments      → expression ( "," expression )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil"
               | IDENT | "(" expression ")" ;
```

`for` has no node of its own: it desugars at parse time into a `while`
wrapped in blocks carrying the initializer and increment.

Failure handling: every unmet expectation raises a structured
[`LoxError::Parse`], recorded at the point of detection and caught by the
top-level declaration loop, which resynchronizes to the next statement
boundary and resumes. A syntax error therefore never propagates to the
caller and never consumes more than one diagnostic per malformed statement.
*/

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::context::Context;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

use log::{debug, info};

/// Maximum number of arguments a call expression may carry.
const MAX_ARGUMENTS: usize = 255;

/// Top-level parser over an immutable slice of tokens.
///
/// The token slice must end with an `EOF` token, which the scanner
/// guarantees.
pub struct Parser<'t, 'c> {
    tokens: &'t [Token<'t>],
    current: usize,
    ctx: &'c mut Context,
}

impl<'t, 'c> Parser<'t, 'c> {
    /// Construct a new parser recording diagnostics into `ctx`.
    pub fn new(tokens: &'t [Token<'t>], ctx: &'c mut Context) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            ctx,
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse the entire token sequence and return its statement list.
    /// Syntax errors are recorded as static diagnostics; the statements
    /// that failed to parse are simply absent from the result.
    pub fn parse(&mut self) -> Vec<Stmt<'t>> {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt<'t>> = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),

                Err(err) => {
                    debug!("Recovering from parse error: {}", err);

                    self.synchronize();
                }
            }
        }

        statements
    }

    // ──────────────────────── declaration rules ───────────────────

    fn declaration(&mut self) -> Result<Stmt<'t>> {
        debug!("Entering declaration");

        if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt<'t>> {
        let name: &'t Token<'t> = self.consume(TokenType::IDENTIFIER, "Expected variable name")?;

        let initializer: Option<Expr<'t>> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expected ';' after variable declaration",
        )?;

        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt<'t>> {
        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    /// Desugar `for (init; cond; incr) body` into
    /// `{ init; while (cond) { body; incr; } }`. An absent condition
    /// defaults to literal `true`.
    fn for_statement(&mut self) -> Result<Stmt<'t>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'for'")?;

        let initializer: Option<Stmt<'t>> = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition: Expr<'t> = if self.check(TokenType::SEMICOLON) {
            Expr::Literal(LiteralValue::True)
        } else {
            self.expression()?
        };

        self.consume(TokenType::SEMICOLON, "Expected ';' after loop condition")?;

        let increment: Option<Expr<'t>> = if self.check(TokenType::RIGHT_PAREN) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after for clauses")?;

        let mut body: Stmt<'t> = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> Result<Stmt<'t>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'if'")?;
        let condition: Expr<'t> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;

        let then_branch: Box<Stmt<'t>> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt<'t>>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt<'t>> {
        self.consume(TokenType::LEFT_PAREN, "Expected '(' after 'while'")?;
        let condition: Expr<'t> = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after condition")?;
        let body: Box<Stmt<'t>> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn print_statement(&mut self) -> Result<Stmt<'t>> {
        let value: Expr<'t> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after value")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt<'t>> {
        let expr: Expr<'t> = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expected ';' after expression")?;

        Ok(Stmt::Expression(expr))
    }

    fn block(&mut self) -> Result<Vec<Stmt<'t>>> {
        let mut statements: Vec<Stmt<'t>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expected '}' after block")?;

        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr<'t>> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr<'t>> {
        let expr: Expr<'t> = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals: &'t Token<'t> = self.previous();
            let value: Expr<'t> = self.assignment()?;

            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                }),

                // Non-fatal: report, then keep parsing with the already
                // parsed left-hand expression.
                other => {
                    self.error(equals.line, "Invalid assignment target");

                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.comparison()?;

        while self.matches(TokenType::BANG_EQUAL) || self.matches(TokenType::EQUAL_EQUAL) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.comparison()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.term()?;

        while self.matches(TokenType::GREATER)
            || self.matches(TokenType::GREATER_EQUAL)
            || self.matches(TokenType::LESS)
            || self.matches(TokenType::LESS_EQUAL)
        {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.term()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.factor()?;

        while self.matches(TokenType::MINUS) || self.matches(TokenType::PLUS) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.factor()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.unary()?;

        while self.matches(TokenType::STAR) || self.matches(TokenType::SLASH) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.unary()?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr<'t>> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: &'t Token<'t> = self.previous();
            let right: Expr<'t> = self.unary()?;

            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr<'t>> {
        let mut expr: Expr<'t> = self.primary()?;

        // A primary may be followed by any number of argument lists,
        // producing nested Call nodes: `f(1)(2)`.
        while self.matches(TokenType::LEFT_PAREN) {
            expr = self.finish_call(expr)?;
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr<'t>) -> Result<Expr<'t>> {
        let mut arguments: Vec<Expr<'t>> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    // Non-fatal: record and keep consuming arguments.
                    let line: usize = self.peek().line;

                    self.error(line, "Cannot have more than 255 arguments");
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: &'t Token<'t> =
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr<'t>> {
        if self.matches(TokenType::FALSE) {
            return Ok(Expr::Literal(LiteralValue::False));
        }

        if self.matches(TokenType::TRUE) {
            return Ok(Expr::Literal(LiteralValue::True));
        }

        if self.matches(TokenType::NIL) {
            return Ok(Expr::Literal(LiteralValue::Nil));
        }

        if let TokenType::NUMBER(n) = self.peek().token_type {
            self.advance();

            return Ok(Expr::Literal(LiteralValue::Number(n)));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let value: String = s.clone();

            self.advance();

            return Ok(Expr::Literal(LiteralValue::Str(value)));
        }

        if self.matches(TokenType::IDENTIFIER) {
            return Ok(Expr::Variable(self.previous()));
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Expr<'t> = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

            return Ok(Expr::Grouping(Box::new(expr)));
        }

        let line: usize = self.peek().line;

        Err(self.error(line, "Expected expression"))
    }

    // ────────────────────── utility helpers ───────────────────────

    /// Record a static diagnostic and build the structured failure for it.
    /// Callers decide whether to raise the returned error (fatal) or drop
    /// it (non-fatal recovery).
    fn error(&mut self, line: usize, message: &str) -> LoxError {
        self.ctx.report_static(line, message);

        LoxError::parse(line, message)
    }

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'t Token<'t>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        let line: usize = self.peek().line;

        Err(self.error(line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'t Token<'t> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'t Token<'t> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'t Token<'t> {
        &self.tokens[self.current - 1]
    }

    /// Discard tokens until the next statement boundary: just past a
    /// semicolon, or just before a statement-starting keyword or EOF.
    fn synchronize(&mut self) {
        self.advance(); // skip the token that caused the error

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,

                _ => {}
            }

            self.advance();
        }
    }
}

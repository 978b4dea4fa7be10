//! Syntax-tree model: closed tagged-variant sets for expressions and
//! statements.
//!
//! Every consumer dispatches over these enums with an exhaustive `match`, so
//! adding a variant without updating all consumers is a compile-time error
//! rather than a silent runtime gap. Lifetime `'a` ties nodes that contain
//! token references back to the borrowed token slice held by the parser.

use serde::Serialize;

use crate::token::Token;

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the terminal leaves of the expression tree and do not
/// retain a reference to the originating [`Token`]; the parser copies the
/// value at parse time so the AST can outlive the lexer's token buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE-754 `f64`. Integral lexemes such as
    /// `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// Syntax-tree node for every kind of *expression*.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression, e.g. `!isReady` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: &'a Token<'a>,
        /// Operand to which the operator is applied.
        right: Box<Expr<'a>>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`.
    Binary {
        left: Box<Expr<'a>>,
        /// Operator token such as `+`, `*`, `==`, ...
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Parenthesised sub-expression.
    Grouping(Box<Expr<'a>>),

    /// Variable access; resolves to the identifier's current value.
    Variable(&'a Token<'a>),

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Short-circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        /// `AND` or `OR`.
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Invocation of a callable value, e.g. `clock()`.
    Call {
        /// Expression that evaluates to a callable.
        callee: Box<Expr<'a>>,
        /// The closing `)` token, retained for error reporting.
        paren: &'a Token<'a>,
        /// Argument list (may be empty).
        arguments: Vec<Expr<'a>>,
    },
}

/// Syntax-tree node for *statements*. A program is a sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt<'a> {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// `print` statement.
    Print(Expr<'a>),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    /// An absent initializer binds `nil`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    /// `if` / `else` conditional.
    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// `while` loop. `for` loops desugar to this at parse time.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },
}

//! Tree-walking evaluator.
//!
//! Executes statement trees against a chain of lexical scopes via an
//! exhaustive `match` over the AST variants. The only mutable state is the
//! "current scope" handle, swapped on block entry and restored on exit —
//! including when execution fails partway through a block.
//!
//! A runtime failure is caught at the boundary of the top-level statement
//! that raised it, recorded in the diagnostics collector with source-line
//! attribution, and execution proceeds with the next statement.

use std::cell::RefCell;
use std::io::{self, Stdout, Write};
use std::mem;
use std::rc::Rc;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, LiteralValue, Stmt};
use crate::context::Context;
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// The evaluator. Generic over the print handler's output sink so tests can
/// capture output; defaults to stdout.
pub struct Interpreter<W: Write = Stdout> {
    environment: Rc<RefCell<Environment>>,
    out: W,
}

impl Interpreter<Stdout> {
    /// An interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// An interpreter printing to `out`. The global scope starts with the
    /// native functions defined.
    pub fn with_output(out: W) -> Self {
        info!("Initializing interpreter");

        let environment = Rc::new(RefCell::new(Environment::new()));

        environment.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: |_args: &[Value]| {
                    let timestamp: f64 = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map_err(|e: SystemTimeError| format!("Clock error: {}", e))?
                        .as_secs_f64();

                    Ok(Value::Number(timestamp))
                },
            },
        );

        Self { environment, out }
    }

    /// Consume the interpreter and hand back its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute a list of top-level statements. Never raises: a runtime
    /// failure is recorded in `ctx` and execution continues with the next
    /// statement.
    pub fn interpret(&mut self, statements: &[Stmt], ctx: &mut Context) {
        debug!("Interpreting {} statements", statements.len());

        for statement in statements {
            if let Err(err) = self.execute(statement) {
                debug!("Statement failed: {}", err);

                ctx.report_runtime(&err);
            }
        }

        info!("Interpretation completed");
    }

    /// Execute a single statement for effect.
    pub fn execute(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                debug!("Printing value: {}", value);

                writeln!(self.out, "{}", value)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let enclosed = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, enclosed)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }

                Ok(())
            }
        }
    }

    /// Run `statements` inside `environment`, restoring the previous scope
    /// handle afterwards even if execution fails.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<()> {
        let previous: Rc<RefCell<Environment>> = mem::replace(&mut self.environment, environment);

        let result: Result<()> = statements.iter().try_for_each(|stmt| self.execute(stmt));

        self.environment = previous;

        result
    }

    /// Evaluate an expression to a value.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(literal_value(value)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable(name) => self.environment.borrow().get(name),

            Expr::Assign { name, value } => {
                let value: Value = self.evaluate(value)?;

                self.environment.borrow_mut().assign(name, value.clone())?;

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val: Value = self.evaluate(callee)?;

                let mut arg_values: Vec<Value> = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    arg_values.push(self.evaluate(argument)?);
                }

                self.invoke_callable(&callee_val, paren, &arg_values)
            }
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Result<Value> {
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(
                    operator.line,
                    format!("Operand of '{}' must be a number", operator.lexeme),
                )),
            },

            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),

            _ => unreachable!("parser only emits '!' and '-' unary operators"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        // '+' is overloaded: numeric addition or string concatenation.
        if operator.token_type == TokenType::PLUS {
            return match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(LoxError::runtime(
                    operator.line,
                    format!(
                        "Operands of '{}' must be two numbers or two strings",
                        operator.lexeme
                    ),
                )),
            };
        }

        // Equality is structural over the tagged value type, no coercion.
        if operator.token_type == TokenType::EQUAL_EQUAL {
            return Ok(Value::Bool(left_val == right_val));
        }

        if operator.token_type == TokenType::BANG_EQUAL {
            return Ok(Value::Bool(left_val != right_val));
        }

        // Everything else requires two numeric operands.
        let (a, b) = match (left_val, right_val) {
            (Value::Number(a), Value::Number(b)) => (a, b),

            _ => {
                return Err(LoxError::runtime(
                    operator.line,
                    format!("Operands of '{}' must be numbers", operator.lexeme),
                ));
            }
        };

        match operator.token_type {
            TokenType::MINUS => Ok(Value::Number(a - b)),

            TokenType::STAR => Ok(Value::Number(a * b)),

            TokenType::SLASH => {
                if b == 0.0 {
                    return Err(LoxError::DivisionByZero {
                        line: operator.line,
                    });
                }

                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => Ok(Value::Bool(a > b)),

            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),

            TokenType::LESS => Ok(Value::Bool(a < b)),

            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),

            _ => unreachable!("parser only emits arithmetic and comparison binary operators"),
        }
    }

    /// `or` returns the left operand immediately if truthy, `and` if falsy;
    /// otherwise the right operand is evaluated and returned as-is, with no
    /// boolean coercion of the result.
    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Result<Value> {
        let left_val: Value = self.evaluate(left)?;

        match operator.token_type {
            TokenType::OR if left_val.is_truthy() => Ok(left_val),

            TokenType::AND if !left_val.is_truthy() => Ok(left_val),

            TokenType::OR | TokenType::AND => self.evaluate(right),

            _ => unreachable!("parser only emits 'and' and 'or' logical operators"),
        }
    }

    /// Dispatch over the callable capability: the callee must expose an
    /// arity and an invocation hook, and the argument count must match the
    /// arity exactly. Arguments have already been evaluated left-to-right.
    fn invoke_callable(
        &mut self,
        callee_val: &Value,
        paren: &Token,
        arg_values: &[Value],
    ) -> Result<Value> {
        match callee_val {
            Value::NativeFunction { name, arity, func } => {
                if arg_values.len() != *arity {
                    return Err(LoxError::runtime(
                        paren.line,
                        format!("Expected {} arguments but got {}", arity, arg_values.len()),
                    ));
                }

                debug!("Calling native function '{}'", name);

                func(arg_values).map_err(|msg: String| LoxError::runtime(paren.line, msg))
            }

            _ => Err(LoxError::runtime(
                paren.line,
                "Can only call functions".to_string(),
            )),
        }
    }
}

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::String(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

//! Parenthesized, Polish-notation rendering of expression trees, used by the
//! driver's debug output and the parser tests.

use crate::ast::{Expr, LiteralValue};

pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Literal(value) => match value {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(inner) => format!("(group {})", self.print(inner)),

            Expr::Variable(token) => token.lexeme.to_string(),

            Expr::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut rendered = format!("(call {}", self.print(callee));

                for argument in arguments {
                    rendered.push(' ');
                    rendered.push_str(&self.print(argument));
                }

                rendered.push(')');
                rendered
            }
        }
    }
}

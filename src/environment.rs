//! Chained lexical scopes.
//!
//! The parent link is an `Rc<RefCell<_>>` so a scope captured by a callable
//! stays alive after its creating block exits; the interpreter's "current
//! scope" is a movable handle, not an owner.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A fresh child scope chained to `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Insert or overwrite a binding in **this** scope only. Redeclaration
    /// in the same scope is permitted and simply overwrites.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Whether `name` is bound in this scope, ignoring enclosing ones.
    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Look `name` up here, then walk outward. A miss at the root is an
    /// undefined-variable runtime failure carrying the token's line.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name.line,
                format!("Undefined variable '{}'", name.lexeme),
            ))
        }
    }

    /// Mutate an existing binding found here or in an enclosing scope.
    /// Assignment never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if self.values.contains_key(name.lexeme) {
            self.values.insert(name.lexeme.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name.line,
                format!("Undefined variable '{}'", name.lexeme),
            ))
        }
    }
}

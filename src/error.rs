//! Centralised error hierarchy for the interpreter.
//!
//! All subsystems convert their internal failure modes into one of the
//! variants defined here, enabling a uniform `Result<T>` alias throughout
//! the crate while preserving source-line detail for diagnostics.
//!
//! The module does not print diagnostics itself; rendering (including the
//! stage label) is the job of [`crate::context::Context`].

use std::io;
use thiserror::Error;

use log::debug;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Syntactic (parser) error, raised at an unmet expectation and caught
    /// by the top-level declaration loop.
    #[error("{message}")]
    Parse {
        /// Human-readable description naming what was expected.
        message: String,

        /// 1-based line where the error occurred.
        line: usize,
    },

    /// Runtime evaluation error with the offending token's line.
    #[error("{message}")]
    Runtime { message: String, line: usize },

    /// Division by zero. Kept as its own variant so callers can match on it
    /// without string inspection; treated as a runtime failure when recorded.
    #[error("Division by zero")]
    DivisionByZero { line: usize },

    /// Wrapper around `std::io::Error` (transparent). Enables `?` on the
    /// print handler's write calls.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Parse error: line={}, msg={}", line, message);

        LoxError::Parse { message, line }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("Creating Runtime error: line={}, msg={}", line, message);

        LoxError::Runtime { message, line }
    }

    /// Source line the error refers to, when one is known.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Parse { line, .. }
            | LoxError::Runtime { line, .. }
            | LoxError::DivisionByZero { line } => Some(*line),

            LoxError::Io(_) => None,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

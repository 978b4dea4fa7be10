//! Stage-tagged diagnostics collector shared by the scanner, parser, and
//! interpreter.
//!
//! Static (scan/parse) and runtime errors are kept in separate ordered lists
//! so a driver can refuse execution when static errors exist. The collector
//! is never cleared implicitly; a caller running independent inputs through
//! the same instance must call [`Context::clear`] between runs.

use log::debug;

use crate::error::LoxError;

/// Diagnostics collector with a current-stage label.
#[derive(Debug)]
pub struct Context {
    stage: String,
    statics: Vec<String>,
    runtimes: Vec<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            stage: String::from("initial"),
            statics: Vec::new(),
            runtimes: Vec::new(),
        }
    }

    /// Label subsequent diagnostics with the given processing stage.
    pub fn set_stage(&mut self, stage: &str) {
        debug!("Diagnostics stage set to '{}'", stage);

        self.stage = stage.to_string();
    }

    /// Record a static (scan or parse) error against a source line.
    pub fn report_static(&mut self, line: usize, message: &str) {
        let rendered = format!("[line {}] Error: {} (stage {})", line, message, self.stage);

        debug!("Static diagnostic: {}", rendered);

        self.statics.push(rendered);
    }

    /// Record a runtime failure caught at a statement boundary. Attribution
    /// uses the offending token's line when the error carries one.
    pub fn report_runtime(&mut self, err: &LoxError) {
        let rendered = match err.line() {
            Some(line) => format!("[line {}] Error: {} (stage {})", line, err, self.stage),
            None => format!("Error: {} (stage {})", err, self.stage),
        };

        debug!("Runtime diagnostic: {}", rendered);

        self.runtimes.push(rendered);
    }

    pub fn has_static_errors(&self) -> bool {
        !self.statics.is_empty()
    }

    pub fn has_runtime_errors(&self) -> bool {
        !self.runtimes.is_empty()
    }

    /// Rendered static diagnostics, in the order they were recorded.
    pub fn static_errors(&self) -> &[String] {
        &self.statics
    }

    /// Rendered runtime diagnostics, in the order they were recorded.
    pub fn runtime_errors(&self) -> &[String] {
        &self.runtimes
    }

    /// Drop all recorded diagnostics. The stage label is kept.
    pub fn clear(&mut self) {
        self.statics.clear();
        self.runtimes.clear();
    }
}

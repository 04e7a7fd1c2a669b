//! Console narration of a rotation run.

use colored::Colorize;
use reseal_core::term::rule;
use reseal_types::Reporter;
use std::io::{self, Write};
use std::sync::Mutex;

const RULE_WIDTH: usize = 60;

/// Writes run narration as emoji-prefixed lines.
pub struct ConsoleReporter<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleReporter<io::Stdout> {
    /// Reporter printing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        // Narration is best effort; a closed stdout must not abort the run.
        let _ = writeln!(out, "{}", text);
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn section(&self, title: &str) {
        self.line("");
        self.line(&format!("📌 {}", title.bold()));
        self.line(&rule(RULE_WIDTH).dimmed().to_string());
    }

    fn info(&self, message: &str) {
        self.line(&format!("ℹ️  {}", message));
    }

    fn success(&self, message: &str) {
        self.line(&format!("✅ {}", message.green()));
    }

    fn error(&self, message: &str) {
        self.line(&format!("❌ {}", message.red()));
    }
}

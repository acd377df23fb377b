//! Output handling
//!
//! All user-visible lines flow through a [`ResultSink`] so the dispatch loop
//! can be exercised in tests without touching real stdio. [`StdoutSink`] is
//! the production implementation; [`MemorySink`] captures lines for
//! assertions, in the spirit of a mock engine.
//!
//! Lines from different members interleave in whatever order the scheduler
//! produces. Only per-member ordering is meaningful.

pub mod json;

use std::sync::Mutex;

/// Destination for user-visible lines
pub trait ResultSink: Send + Sync {
    /// A result or menu line (stdout in production)
    fn result_line(&self, line: &str);

    /// A diagnostic line (stderr in production)
    fn error_line(&self, line: &str);
}

/// Production sink: results to stdout, diagnostics to stderr
pub struct StdoutSink;

impl ResultSink for StdoutSink {
    fn result_line(&self, line: &str) {
        println!("{}", line);
    }

    fn error_line(&self, line: &str) {
        eprintln!("{}", line);
    }
}

/// Capturing sink for tests
///
/// Stores every line in arrival order. Lines emitted by one member keep
/// their relative order; lines from different members interleave.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty capturing sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All result lines captured so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// All diagnostic lines captured so far
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ResultSink for MemorySink {
    fn result_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn error_line(&self, line: &str) {
        self.errors.lock().unwrap().push(line.to_string());
    }
}

/// Print the interactive menu (coordinator only)
pub fn print_menu(sink: &dyn ResultSink) {
    sink.result_line("");
    sink.result_line("Menu:");
    sink.result_line("1. Generate Patient Data");
    sink.result_line("2. Calculate and Display BMI");
    sink.result_line("3. Calculate and Display Average Heart Rate");
    sink.result_line("4. Exit");
    sink.result_line("Enter your choice:");
}

//! User-facing progress output.
//!
//! The install flow never branches on what a reporter does; it only tells it
//! what happened.

/// One-way sink for progress, warning and success messages.
#[cfg_attr(test, mockall::automock)]
pub trait Reporter {
    /// A step in progress (`   cloning ...`).
    fn step(&self, message: &str);
    /// Something went wrong but the operation continues.
    fn warn(&self, message: &str);
    /// An operation finished.
    fn success(&self, message: &str);
}

/// Prints to the terminal: progress and success on stdout, warnings on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    progress: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self { progress: true }
    }

    /// Only warnings, for commands whose stdout is consumed by scripts.
    pub fn errors_only() -> Self {
        Self { progress: false }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn step(&self, message: &str) {
        if self.progress {
            println!("   {}", message);
        }
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn success(&self, message: &str) {
        if self.progress {
            println!("{}", message);
        }
    }
}

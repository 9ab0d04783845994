// src/logging.rs
//
// Diagnostic sinks for run-configuration resolution.
// - DiagnosticSink: trait used by the resolver for warnings + debug lines
// - NoopSink:       discards everything
// - StderrSink:     prints warnings always, debug lines gated by verbosity
// - MemorySink:     records everything, for tests

/// Debug verbosity thresholds, lowest first.
pub const DBG_LOW: u8 = 1;
pub const DBG_MED: u8 = 2;
pub const DBG_HIGH: u8 = 3;

/// Abstract sink for resolver diagnostics.
///
/// Warnings are non-fatal by definition: the resolver emits one whenever it
/// silently overrides or clamps a caller-supplied value, and never aborts
/// because of one. Debug lines carry a level and only reach the user when
/// the configured verbosity is at least that level.
pub trait DiagnosticSink {
    fn warn(&mut self, message: &str);
    fn debug(&mut self, level: u8, message: &str);
}

/// Sink that discards all diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn warn(&mut self, _message: &str) {}
    fn debug(&mut self, _level: u8, _message: &str) {}
}

/// Stderr sink with a verbosity cutoff for debug lines.
#[derive(Debug, Clone, Copy)]
pub struct StderrSink {
    verbosity: i64,
}

impl StderrSink {
    pub fn new(verbosity: i64) -> Self {
        Self { verbosity }
    }
}

impl DiagnosticSink for StderrSink {
    fn warn(&mut self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn debug(&mut self, level: u8, message: &str) {
        if i64::from(level) <= self.verbosity {
            eprintln!("debug[{}]: {}", level, message);
        }
    }
}

/// Recording sink for assertions in tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub warnings: Vec<String>,
    pub debug_lines: Vec<(u8, String)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn debug(&mut self, level: u8, message: &str) {
        self.debug_lines.push((level, message.to_string()));
    }
}

// src/errors.rs
//
// Error taxonomy for run-configuration resolution.
//
// Three kinds, with distinct process exit codes:
// - Usage:    malformed or contradictory input from the caller.
// - Resource: an external resource (the p-values directory) could not
//             be opened at all.
// - Contract: an internal precondition was violated. Unreachable through
//             the public grammar; indicates a defect in the embedding
//             program, not user error.

use std::fmt;

/// Fatal resolution failure. Warnings are not errors and flow through the
/// diagnostic sink instead (see `logging::DiagnosticSink`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Bad or contradictory command-line input.
    Usage { message: String },
    /// The p-values directory could not be opened.
    Resource { path: String, source: String },
    /// Internal precondition violated by the embedding program.
    Contract { message: String },
}

impl ResolveError {
    /// Build a usage error from anything printable.
    pub fn usage(message: impl Into<String>) -> Self {
        ResolveError::Usage {
            message: message.into(),
        }
    }

    /// Build a contract-violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        ResolveError::Contract {
            message: message.into(),
        }
    }

    /// Process exit code for this failure.
    ///
    /// 0 is reserved for success / help, codes above 3 for the downstream
    /// execution phase.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::Usage { .. } => 1,
            ResolveError::Resource { .. } => 1,
            ResolveError::Contract { .. } => 2,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Usage { message } => write!(f, "usage error: {}", message),
            ResolveError::Resource { path, source } => {
                write!(f, "could not open the directory '{}': {}", path, source)
            }
            ResolveError::Contract { message } => {
                write!(f, "internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for ResolveError {}

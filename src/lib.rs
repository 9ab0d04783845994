//! sts-run core library.
//!
//! This crate turns heterogeneous run instructions — command-line flags,
//! one positional argument, and the names of previously produced p-value
//! artifact files — into one fully validated, internally consistent
//! [`RunDescriptor`] that a downstream statistical-testing engine consumes
//! read-only. The binary (`src/main.rs`) is just a thin harness around
//! [`resolve`].
//!
//! # Architecture
//!
//! Resolution is a strictly sequential, single-threaded pass:
//!
//! - **Option grammar** (`options`): the declarative flag table, including
//!   the comma-separated `-t` and `-P num=value` lists.
//! - **Parameter overrides** (`params`): the eleven `-P` identifiers, each
//!   mapped to one descriptor field, integer or float by identifier range.
//! - **Test selection** (`selection`): the set of enabled tests, with the
//!   historical `0` alias for "all tests".
//! - **Derivation & cross-validation** (`resolve`): the fixed-order
//!   pipeline that fills in derived defaults (uniformity bins, thread
//!   count), reconciles contradictions, and validates invariants last.
//! - **Work discovery** (`discovery`): reconstructs iteration counts from
//!   p-value artifact filenames for assess-only runs.
//!
//! Collaborators at the boundary — the core-count query, the legacy
//! interactive prompt, and the diagnostic sink — are traits, so the whole
//! pipeline is deterministic under test.

pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod logging;
pub mod options;
pub mod params;
pub mod resolve;
pub mod selection;

// --- Re-exports for ergonomic external use ---------------------------------

pub use descriptor::{DataFormat, DataSource, RunDescriptor, RunMode, TestParams};
pub use errors::ResolveError;
pub use logging::{DiagnosticSink, MemorySink, NoopSink, StderrSink};
pub use options::CliOptions;
pub use resolve::{
    finalize, resolve, CoreCountProvider, FixedCores, IterationPrompt, ScriptedPrompt,
    SystemCores, TerminalPrompt,
};
pub use selection::{TestSelection, NUM_TESTS};

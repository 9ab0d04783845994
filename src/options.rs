// src/options.rs
//
// The command-line option grammar, declared as a table on a clap struct:
// one entry per flag with its arity, value kind, validation rule, and
// target field. The two list-valued flags (`-t`, `-P`) split on commas and
// parse each sub-token with a strict integer / float grammar.
//
// `CliOptions` is the raw, typed event stream; `apply_to` walks it once
// and feeds the parameter-override table, the test-selection set, and the
// scalar descriptor fields. All cross-field work happens later, in
// `resolve::finalize`.

use std::path::PathBuf;

use clap::Parser;

use crate::descriptor::{DataFormat, DataSource, RunDescriptor, RunMode};
use crate::errors::ResolveError;
use crate::params::ParamAssignment;
use crate::selection::NUM_TESTS;

const AFTER_HELP: &str = "\
tests (-t):
    0: Run all tests (1-15)
    1: Frequency                        2: Block Frequency
    3: Cumulative Sums                  4: Runs
    5: Longest Run of Ones              6: Rank
    7: Discrete Fourier Transform       8: Nonperiodic Template Matchings
    9: Overlapping Template Matchings  10: Universal Statistical
   11: Approximate Entropy             12: Random Excursions
   13: Random Excursions Variant       14: Serial
   15: Linear Complexity

parameters (-P num=value):
    1: Block Frequency Test - block length(M):             16384
    2: NonOverlapping Template Test - block length(m):     9
    3: Overlapping Template Test - block length(m):        9
    4: Approximate Entropy Test - block length(m):         10
    5: Serial Test - block length(m):                      16
    6: Linear Complexity Test - block length(M):           500
    7: Number of bitcount runs (same as -i iterations):    1
    8: Uniformity bins:                                    sqrt(iterations) or 10 (if -O)
    9: Bits to process per iteration (same as -S):         1048576 (== 1024*1024)
   10: Uniformity Cutoff Level:                            0.0001
   11: Alpha Confidence Level:                             0.01
   Warning: change the above parameters only if you really know what you are doing!

randdata is the path to the input file to test (required for -m b and
-m i, optional for -A and -m a). If randdata is -, data is read from the
beginning of standard input and no seek for -j jobnum is performed.";

/// Raw command-line options, one field per flag.
///
/// Every value is already parsed and range-checked by its entry's value
/// parser; `apply_to` only moves values into the descriptor.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sts-run",
    version,
    about = "Resolve a statistical test suite run configuration",
    after_help = AFTER_HELP
)]
pub struct CliOptions {
    /// Debug level (def: 0 -> no debug messages).
    #[arg(
        short = 'v',
        value_name = "debuglevel",
        default_value_t = 0,
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub debug_level: i64,

    /// Ask a human what to do, use obsolete interactive mode (def: batch mode).
    #[arg(short = 'A')]
    pub interactive: bool,

    /// Tests to invoke, 0-15 (def: 0 -> run all tests).
    #[arg(
        short = 't',
        value_name = "test1[,test2]..",
        value_delimiter = ',',
        value_parser = parse_test_number
    )]
    pub tests: Vec<usize>,

    /// Change parameter num to value (def: keep defaults).
    #[arg(
        short = 'P',
        value_name = "num=value[,num=value]..",
        value_delimiter = ',',
        value_parser = ParamAssignment::parse
    )]
    pub params: Vec<ParamAssignment>,

    /// Number of iterations (bitstreams) to test (same as -P 7=iterations).
    #[arg(
        short = 'i',
        value_name = "iterations",
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub iterations: Option<i64>,

    /// Report after completion of this many iterations (def: 0: do not report).
    #[arg(
        short = 'I',
        value_name = "reportCycle",
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub report_cycle: Option<i64>,

    /// Try to mimic the output format of the legacy code.
    #[arg(short = 'O')]
    pub legacy_output: bool,

    /// Write experiment results under this directory (def: .).
    #[arg(short = 'w', value_name = "workDir")]
    pub work_dir: Option<PathBuf>,

    /// Don't create any directories needed for creating files (def: do create).
    #[arg(short = 'c')]
    pub no_sub_dirs: bool,

    /// Create result.txt, data*.txt, and stats.txt (def: don't create).
    #[arg(short = 's')]
    pub results_txt: bool,

    /// randdata format: 'r': raw binary, 'a': ASCII '0'/'1' chars (def: 'r').
    #[arg(short = 'F', value_name = "format", value_parser = parse_data_format)]
    pub data_format: Option<DataFormat>,

    /// Number of bits to process in a single iteration (same as -P 9=bitcount).
    #[arg(
        short = 'S',
        value_name = "bitcount",
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(i64)
    )]
    pub bits_per_stream: Option<i64>,

    /// Seek into randdata, jobnum * bitcount * iterations bits (def: 0).
    #[arg(
        short = 'j',
        value_name = "jobnum",
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub job_number: Option<i64>,

    /// Run mode: b iterate+assess, i iterate only, a assess only (def: b).
    #[arg(short = 'm', value_name = "mode", value_parser = parse_run_mode)]
    pub run_mode: Option<RunMode>,

    /// Custom number of threads (def: number of cores of the CPU).
    #[arg(
        short = 'T',
        value_name = "numOfThreads",
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    pub threads: Option<i64>,

    /// Folder holding previously computed binary .pvalues files (requires -m a).
    #[arg(short = 'd', value_name = "pvaluesdir")]
    pub pvalues_dir: Option<PathBuf>,

    // Retired flags, kept so callers migrating from old scripts get a
    // pointed rejection rather than a generic unknown-option error.
    #[arg(short = 'b', hide = true)]
    pub retired_batch: bool,
    #[arg(short = 'g', value_name = "generator", hide = true)]
    pub retired_generator: Option<String>,
    #[arg(short = 'p', hide = true)]
    pub retired_prompt: bool,
    #[arg(short = 'f', value_name = "randdata", hide = true)]
    pub retired_file: Option<String>,

    /// Path to the input data to test, or '-' for standard input.
    #[arg(value_name = "randdata")]
    pub randdata: Option<String>,
}

/// Parse one `-t` sub-token: a bare integer in [0, NUM_TESTS].
fn parse_test_number(token: &str) -> Result<usize, String> {
    let number: i64 = token.trim().parse().map_err(|_| {
        format!(
            "-t test1[,test2].. must only have comma separated integers: {}",
            token
        )
    })?;
    if !(0..=NUM_TESTS as i64).contains(&number) {
        return Err(format!(
            "-t test: {} must be in the range [0-{}]",
            number, NUM_TESTS
        ));
    }
    Ok(number as usize)
}

/// Parse the `-F` value: exactly one of 'r' or 'a', or the legacy aliases
/// '1' (raw) and '0' (ASCII).
fn parse_data_format(token: &str) -> Result<DataFormat, String> {
    let mut chars = token.chars();
    let (first, rest) = (chars.next(), chars.next());
    if rest.is_some() {
        return Err(format!(
            "-F format: {} must be a single character: r or a",
            token
        ));
    }
    match first {
        Some('r') | Some('1') => Ok(DataFormat::RawBinary),
        Some('a') | Some('0') => Ok(DataFormat::Ascii01),
        _ => Err(format!("-F format: {} must be r or a", token)),
    }
}

/// Parse the `-m` value: exactly one of 'b', 'i' or 'a'.
fn parse_run_mode(token: &str) -> Result<RunMode, String> {
    let mut chars = token.chars();
    let (first, rest) = (chars.next(), chars.next());
    if rest.is_some() {
        return Err(format!("-m mode must be a single character: {}", token));
    }
    match first {
        Some('b') => Ok(RunMode::IterateAndAssess),
        Some('i') => Ok(RunMode::IterateOnly),
        Some('a') => Ok(RunMode::AssessOnly),
        _ => Err(format!("-m mode must be one of b, i or a: {}", token)),
    }
}

impl CliOptions {
    /// Single linear pass moving parsed option values into the descriptor.
    ///
    /// Parameter overrides (`-P`) land first, then the scalar flags, so an
    /// explicit `-i` wins over `-P 7=` when both are given. No cross-field
    /// validation happens here; that is `resolve::finalize`'s job.
    pub fn apply_to(&self, desc: &mut RunDescriptor) -> Result<(), ResolveError> {
        if self.retired_batch {
            return Err(ResolveError::usage(
                "-b is no longer required as batch is now the default",
            ));
        }
        if self.retired_generator.is_some() {
            return Err(ResolveError::usage(
                "-g is no longer supported, reading from a file is the only generator; \
                 for everything else use the generator tool, or online data files",
            ));
        }
        if self.retired_prompt {
            return Err(ResolveError::usage("-p is no longer needed"));
        }
        if self.retired_file.is_some() {
            return Err(ResolveError::usage(
                "-f is no longer needed, instead put randdata as last argument",
            ));
        }

        if self.interactive {
            desc.batch_mode = false;
        }
        if !self.tests.is_empty() {
            desc.flags.selection = true;
            for &number in &self.tests {
                desc.selection.enable(number);
            }
        }
        for assignment in &self.params {
            assignment.apply(desc)?;
        }
        if let Some(iterations) = self.iterations {
            desc.flags.iterations = true;
            desc.params.iterations = iterations;
        }
        if let Some(report_cycle) = self.report_cycle {
            desc.flags.report_cycle = true;
            desc.report_cycle = report_cycle;
        }
        if self.legacy_output {
            desc.legacy_output = true;
        }
        if let Some(work_dir) = &self.work_dir {
            desc.flags.work_dir = true;
            desc.work_dir = work_dir.clone();
        }
        if self.no_sub_dirs {
            desc.flags.sub_dirs = true;
            desc.create_sub_dirs = false;
        }
        if self.results_txt {
            desc.flags.results_txt = true;
            desc.write_results_txt = true;
        }
        if let Some(format) = self.data_format {
            desc.flags.data_format = true;
            desc.data_format = format;
        }
        if let Some(bits) = self.bits_per_stream {
            desc.params.bits_per_stream = bits;
        }
        if let Some(job_number) = self.job_number {
            desc.flags.job_number = true;
            desc.job_number = job_number;
        }
        if let Some(run_mode) = self.run_mode {
            desc.flags.run_mode = true;
            desc.run_mode = run_mode;
        }
        if let Some(threads) = self.threads {
            desc.flags.threads = true;
            desc.thread_count = threads;
        }
        if let Some(dir) = &self.pvalues_dir {
            desc.pvalues_dir = Some(dir.clone());
        }
        if let Some(randdata) = &self.randdata {
            desc.data_source = if randdata == "-" {
                DataSource::Stdin
            } else {
                DataSource::File(PathBuf::from(randdata))
            };
        }
        Ok(())
    }
}

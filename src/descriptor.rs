// src/descriptor.rs
//
// The Run Descriptor: the single aggregate configuration object handed to
// the downstream test-execution engine.
//
// Lifecycle: built fresh from the default template, mutated during the one
// linear option-parsing pass and the one derivation pass, then frozen.
// Nothing in this crate takes `&mut RunDescriptor` after `resolve`
// returns; downstream consumers read it only.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{DiagnosticSink, DBG_LOW, DBG_MED};
use crate::selection::{TestSelection, TEST_NAMES};

/// Shortest bitstream the test battery accepts.
pub const GLOBAL_MIN_BITCOUNT: i64 = 1_000;

/// Default bits per iteration (1024 * 1024).
pub const DEFAULT_BITCOUNT: i64 = 1_048_576;

/// Default iteration (bitstream) count.
pub const DEFAULT_ITERATIONS: i64 = 1;

/// Uniformity-bin count used when legacy output compatibility is on.
pub const DEFAULT_UNIFORMITY_BINS: i64 = 10;

/// Default uniformity cutoff level.
pub const DEFAULT_UNIFORMITY_LEVEL: f64 = 0.0001;

/// Default p-value significance level.
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Per-test block-length defaults.
pub const DEFAULT_BLOCK_FREQUENCY: i64 = 16_384;
pub const DEFAULT_NON_OVERLAPPING: i64 = 9;
pub const DEFAULT_OVERLAPPING: i64 = 9;
pub const DEFAULT_APEN: i64 = 10;
pub const DEFAULT_SERIAL: i64 = 16;
pub const DEFAULT_LINEARCOMPLEXITY: i64 = 500;

/// What the run does with fresh data and with p-values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// `-m b`: iterate over the input data and assess the p-values.
    IterateAndAssess,
    /// `-m i`: iterate only, saving p-values to a binary file for later.
    IterateOnly,
    /// `-m a`: assess previously computed p-value files only.
    AssessOnly,
}

impl RunMode {
    pub fn as_char(self) -> char {
        match self {
            RunMode::IterateAndAssess => 'b',
            RunMode::IterateOnly => 'i',
            RunMode::AssessOnly => 'a',
        }
    }

    /// True when the mode consumes fresh input data (and therefore needs
    /// the trailing randdata argument).
    pub fn needs_input_data(self) -> bool {
        matches!(self, RunMode::IterateAndAssess | RunMode::IterateOnly)
    }
}

/// On-disk representation of the input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    /// 8 bits per byte, raw.
    RawBinary,
    /// One ASCII '0' or '1' character per bit.
    Ascii01,
}

/// Where the input bitstreams come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// No randdata argument was given.
    Unspecified,
    /// Read from a file on disk.
    File(PathBuf),
    /// The `-` sentinel: read from standard input. Seeking is disabled and
    /// interactive mode is forbidden.
    Stdin,
}

impl DataSource {
    pub fn is_stdin(&self) -> bool {
        matches!(self, DataSource::Stdin)
    }

    /// True when any randdata argument (file or stdin) was supplied.
    pub fn was_given(&self) -> bool {
        !matches!(self, DataSource::Unspecified)
    }
}

/// Numeric parameters shared with the statistical tests (`-P` targets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParams {
    /// Block Frequency test block length (`-P 1=M`).
    pub block_frequency_block_length: i64,
    /// Non-overlapping Template test block length (`-P 2=m`).
    pub non_overlapping_template_length: i64,
    /// Overlapping Template test block length (`-P 3=m`).
    pub overlapping_template_length: i64,
    /// Approximate Entropy test block length (`-P 4=m`).
    pub approximate_entropy_block_length: i64,
    /// Serial test block length (`-P 5=m`).
    pub serial_block_length: i64,
    /// Linear Complexity test sequence length (`-P 6=M`).
    pub linear_complexity_sequence_length: i64,
    /// Number of bitstreams to test (`-P 7`, same as `-i`).
    pub iterations: i64,
    /// Buckets for the chi-square uniformity assessment (`-P 8`).
    pub uniformity_bins: i64,
    /// Bits per bitstream (`-P 9`, same as `-S`).
    pub bits_per_stream: i64,
    /// Uniformity cutoff level (`-P 10`).
    pub uniformity_level: f64,
    /// p-value significance level (`-P 11`).
    pub alpha: f64,
}

impl Default for TestParams {
    fn default() -> Self {
        Self {
            block_frequency_block_length: DEFAULT_BLOCK_FREQUENCY,
            non_overlapping_template_length: DEFAULT_NON_OVERLAPPING,
            overlapping_template_length: DEFAULT_OVERLAPPING,
            approximate_entropy_block_length: DEFAULT_APEN,
            serial_block_length: DEFAULT_SERIAL,
            linear_complexity_sequence_length: DEFAULT_LINEARCOMPLEXITY,
            iterations: DEFAULT_ITERATIONS,
            uniformity_bins: DEFAULT_UNIFORMITY_BINS,
            bits_per_stream: DEFAULT_BITCOUNT,
            uniformity_level: DEFAULT_UNIFORMITY_LEVEL,
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Which fields the caller set explicitly, one flag per overridable field.
///
/// These gate the default-derivation logic and stay part of the finalized
/// descriptor: downstream reporting distinguishes "requested" from
/// "derived" values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitFlags {
    pub selection: bool,
    pub iterations: bool,
    pub report_cycle: bool,
    pub run_mode: bool,
    pub work_dir: bool,
    pub sub_dirs: bool,
    pub results_txt: bool,
    pub data_format: bool,
    pub job_number: bool,
    pub threads: bool,
    pub uniformity_bins: bool,
}

/// The aggregate, mutable-then-frozen run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// False only when `-A` requested the obsolete interactive mode.
    pub batch_mode: bool,
    pub run_mode: RunMode,
    pub data_format: DataFormat,
    pub selection: TestSelection,
    pub params: TestParams,
    /// Report progress every this many iterations; 0 disables reporting.
    pub report_cycle: i64,
    /// `-O`: mimic the older tool's output format and parameter defaults.
    pub legacy_output: bool,
    pub work_dir: PathBuf,
    /// False when `-c` asked us not to create directories.
    pub create_sub_dirs: bool,
    /// `-s`: write result.txt, data*.txt and stats.txt.
    pub write_results_txt: bool,
    pub data_source: DataSource,
    /// Seek multiplier into the input data (`-j`).
    pub job_number: i64,
    /// Worker count for the downstream execution phase. Derived from the
    /// core count unless `-T` set it explicitly.
    pub thread_count: i64,
    /// Directory of previously computed p-value files (`-d`).
    pub pvalues_dir: Option<PathBuf>,
    /// Filenames matched by the work-discovery scan, in filesystem
    /// enumeration order. Callers needing determinism must sort.
    pub discovered_files: Vec<String>,
    pub flags: ExplicitFlags,
}

impl RunDescriptor {
    /// Fresh descriptor holding the immutable default template.
    ///
    /// A value-producing function rather than a shared global: every run
    /// starts from its own copy.
    pub fn template() -> Self {
        Self {
            batch_mode: true,
            run_mode: RunMode::IterateAndAssess,
            data_format: DataFormat::RawBinary,
            selection: TestSelection::default(),
            params: TestParams::default(),
            report_cycle: 0,
            legacy_output: false,
            work_dir: PathBuf::from("."),
            create_sub_dirs: true,
            write_results_txt: false,
            data_source: DataSource::Unspecified,
            job_number: 0,
            thread_count: 0,
            pvalues_dir: None,
            discovered_files: Vec::new(),
            flags: ExplicitFlags::default(),
        }
    }

    /// Total bits this run will consume from the data source.
    pub fn total_bits(&self) -> i64 {
        self.params.iterations.saturating_mul(self.params.bits_per_stream)
    }

    /// Leveled human-readable dump of the finalized configuration, in the
    /// shape operators of the original tool expect.
    pub fn log_summary(&self, sink: &mut dyn DiagnosticSink) {
        if self.batch_mode {
            sink.debug(DBG_MED, "running in (non-interactive) batch mode");
        } else {
            sink.debug(DBG_MED, "obsolete interactive mode");
        }
        sink.debug(
            DBG_MED,
            &format!(
                "run mode -m {}: {}",
                self.run_mode.as_char(),
                match self.run_mode {
                    RunMode::IterateAndAssess => "iterate over the data and assess it",
                    RunMode::IterateOnly => "iterate only, saving p-values for later",
                    RunMode::AssessOnly => "assess previously computed p-values only",
                }
            ),
        );
        sink.debug(
            DBG_MED,
            &format!(
                "performing {} iterations each of {} bits ({} bits total)",
                self.params.iterations,
                self.params.bits_per_stream,
                self.total_bits()
            ),
        );

        sink.debug(DBG_MED, "tests enabled:");
        for number in self.selection.iter_enabled() {
            sink.debug(
                DBG_MED,
                &format!("  test[{}] {}: enabled", number, TEST_NAMES[number]),
            );
        }
        sink.debug(
            DBG_MED,
            &format!("  {} tests enabled", self.selection.count()),
        );

        match &self.data_source {
            DataSource::File(path) => {
                sink.debug(DBG_LOW, &format!("testing data from file: {}", path.display()));
            }
            DataSource::Stdin => {
                sink.debug(DBG_LOW, "test data will be read from standard input");
            }
            DataSource::Unspecified => {
                sink.debug(DBG_LOW, "no randdata argument given");
            }
        }

        if self.report_cycle == 0 {
            sink.debug(DBG_MED, "will not report on progress of iterations");
        } else {
            sink.debug(
                DBG_MED,
                &format!("will report on progress every {} iterations", self.report_cycle),
            );
        }
        if self.legacy_output {
            sink.debug(DBG_MED, "-O was given, legacy output mode where reasonable");
        }
        sink.debug(
            DBG_MED,
            &format!("workDir: {}", self.work_dir.display()),
        );
        sink.debug(
            DBG_MED,
            if self.create_sub_dirs {
                "create directories needed for writing to any file"
            } else {
                "do not create directories, assume they exist"
            },
        );
        sink.debug(
            DBG_MED,
            if self.write_results_txt {
                "create result.txt, data*.txt and stats.txt"
            } else {
                "do not create result.txt, data*.txt and stats.txt"
            },
        );
        sink.debug(
            DBG_MED,
            &format!(
                "data format: {}",
                match self.data_format {
                    DataFormat::RawBinary => "raw binary, 8 bits per byte",
                    DataFormat::Ascii01 => "ASCII '0' and '1' character bits",
                }
            ),
        );
        if self.flags.job_number {
            sink.debug(DBG_MED, &format!("-j jobnum was set to {}", self.job_number));
        }
        sink.debug(
            DBG_MED,
            &format!(
                "will use {} thread{}",
                self.thread_count,
                if self.thread_count == 1 { "" } else { "s" }
            ),
        );
        if let Some(dir) = &self.pvalues_dir {
            sink.debug(
                DBG_MED,
                &format!(
                    "p-values directory {}: {} matching files, {} iterations recovered",
                    dir.display(),
                    self.discovered_files.len(),
                    self.params.iterations
                ),
            );
        }

        sink.debug(DBG_MED, "test parameters:");
        let p = &self.params;
        sink.debug(
            DBG_MED,
            &format!("  blockFrequencyBlockLength = {}", p.block_frequency_block_length),
        );
        sink.debug(
            DBG_MED,
            &format!(
                "  nonOverlappingTemplateLength = {}",
                p.non_overlapping_template_length
            ),
        );
        sink.debug(
            DBG_MED,
            &format!("  overlappingTemplateLength = {}", p.overlapping_template_length),
        );
        sink.debug(
            DBG_MED,
            &format!(
                "  approximateEntropyBlockLength = {}",
                p.approximate_entropy_block_length
            ),
        );
        sink.debug(DBG_MED, &format!("  serialBlockLength = {}", p.serial_block_length));
        sink.debug(
            DBG_MED,
            &format!(
                "  linearComplexitySequenceLength = {}",
                p.linear_complexity_sequence_length
            ),
        );
        sink.debug(DBG_MED, &format!("  uniformityBins = {}", p.uniformity_bins));
        sink.debug(DBG_MED, &format!("  uniformityLevel = {}", p.uniformity_level));
        sink.debug(DBG_MED, &format!("  alpha = {}", p.alpha));
    }
}

// src/resolve.rs
//
// Derivation & cross-validation: the fixed-order pipeline that turns a
// raw-parsed Run Descriptor into a finalized one. Order matters: later
// steps read fields earlier steps produce, and the bitcount check runs
// last so every override has already taken effect.
//
// External collaborators are injected as traits so the pipeline itself
// stays deterministic and testable: a core-count provider (may be
// unavailable), the legacy interactive prompt, and the diagnostic sink.

use std::io::{self, BufRead, Write};

use crate::descriptor::{
    RunDescriptor, RunMode, DEFAULT_UNIFORMITY_BINS, GLOBAL_MIN_BITCOUNT,
};
use crate::discovery::scan_pvalues_dir;
use crate::errors::ResolveError;
use crate::logging::DiagnosticSink;
use crate::options::CliOptions;

/// Capability provider for the number of usable processors.
///
/// `None` means the platform cannot answer; derivation then leaves the
/// thread count at whatever value it already holds.
pub trait CoreCountProvider {
    fn available_cores(&self) -> Option<i64>;
}

/// Core count from the running system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCores;

impl CoreCountProvider for SystemCores {
    fn available_cores(&self) -> Option<i64> {
        std::thread::available_parallelism()
            .ok()
            .map(|n| n.get() as i64)
    }
}

/// Fixed core count (or unavailability), for tests and embedding.
#[derive(Debug, Clone, Copy)]
pub struct FixedCores(pub Option<i64>);

impl CoreCountProvider for FixedCores {
    fn available_cores(&self) -> Option<i64> {
        self.0
    }
}

/// Collaborator for the obsolete interactive mode: a blocking question to
/// a human. No cancellation, no timeout; the reference behavior has none.
pub trait IterationPrompt {
    fn ask_iterations(&mut self) -> io::Result<i64>;
}

/// Prompt on stdout, read the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl IterationPrompt for TerminalPrompt {
    fn ask_iterations(&mut self) -> io::Result<i64> {
        print!("   How many bitstreams? ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        println!();
        line.trim().parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("not a valid number of bitstreams: {}", line.trim()),
            )
        })
    }
}

/// Canned prompt answer, for tests and non-interactive embedders.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedPrompt(pub i64);

impl IterationPrompt for ScriptedPrompt {
    fn ask_iterations(&mut self) -> io::Result<i64> {
        Ok(self.0)
    }
}

/// Resolve raw command-line options into a finalized Run Descriptor.
///
/// One linear option pass, then the ordered derivation pipeline. On any
/// fatal condition the whole resolution fails; no partial descriptor is
/// ever returned. Warnings flow through `sink` and never abort.
pub fn resolve(
    opts: &CliOptions,
    cores: &dyn CoreCountProvider,
    prompt: &mut dyn IterationPrompt,
    sink: &mut dyn DiagnosticSink,
) -> Result<RunDescriptor, ResolveError> {
    let mut desc = RunDescriptor::template();
    opts.apply_to(&mut desc)?;
    finalize(&mut desc, cores, prompt, sink)?;
    Ok(desc)
}

/// The fixed-order derivation and cross-validation pipeline.
///
/// Public so embedders that build a descriptor programmatically can still
/// run the same checks the command-line path runs.
pub fn finalize(
    desc: &mut RunDescriptor,
    cores: &dyn CoreCountProvider,
    prompt: &mut dyn IterationPrompt,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), ResolveError> {
    // The dedicated -i flag range-checks at the grammar, but the override
    // table (-P 7=) can store any integer; catch it before anything derives
    // from the count. Discovery may still reset it to zero later.
    if desc.params.iterations < 1 {
        return Err(ResolveError::usage(format!(
            "iterations (number of bit streams): {} can't be less than 1",
            desc.params.iterations
        )));
    }

    // Modes that iterate need the randdata argument.
    if desc.run_mode.needs_input_data() && !desc.data_source.was_given() {
        return Err(ResolveError::usage("missing randdata argument"));
    }

    // Reading data from stdin rules out interactivity and open-ended runs:
    // there is no way to rewind and no human to ask.
    if desc.data_source.is_stdin() {
        if !desc.batch_mode {
            return Err(ResolveError::usage(
                "-A not allowed when randdata is - (reading data from standard input)",
            ));
        }
        if !desc.flags.iterations && desc.run_mode != RunMode::AssessOnly {
            return Err(ResolveError::usage(
                "-i iterations or -m a required when randdata is - \
                 (reading data from standard input)",
            ));
        }
    }

    // Legacy interactive path: block on the human for the iteration count.
    if !desc.batch_mode && !desc.flags.iterations && !desc.data_source.is_stdin() {
        let answer = prompt.ask_iterations().map_err(|e| {
            ResolveError::usage(format!("error reading the number of bitstreams: {}", e))
        })?;
        if answer < 1 {
            return Err(ResolveError::usage(format!(
                "iterations (number of bit streams): {} can't be less than 1",
                answer
            )));
        }
        desc.params.iterations = answer;
    }

    // No -t in batch mode, or the all-tests alias: enable everything.
    if (desc.batch_mode && !desc.flags.selection) || desc.selection.alias_used() {
        desc.selection.enable_all();
    }
    if desc.batch_mode && desc.selection.count() == 0 {
        return Err(ResolveError::usage("no tests enabled"));
    }

    // Uniformity bins default to sqrt(iterations) unless customized or in
    // legacy-output mode (which keeps the old fixed default).
    if !desc.flags.uniformity_bins && !desc.legacy_output {
        desc.params.uniformity_bins = (desc.params.iterations as f64).sqrt() as i64;
    }

    // A customized bin count loses to legacy compatibility; thread-count
    // derivation is the else-branch of this override, as in the original.
    if desc.flags.uniformity_bins && desc.legacy_output {
        sink.warn(&format!(
            "the number of uniformity bins was set back to {} due to '-O' legacy mode flag",
            DEFAULT_UNIFORMITY_BINS
        ));
        desc.params.uniformity_bins = DEFAULT_UNIFORMITY_BINS;
    } else if !desc.flags.threads {
        if let Some(cores) = cores.available_cores() {
            desc.thread_count = cores.min(desc.params.iterations);
        }
    }

    if desc.flags.threads {
        if let Some(cores) = cores.available_cores() {
            if desc.thread_count > cores {
                sink.warn(&format!(
                    "you selected a number of threads greater than the number of cores in \
                     this computer; for better performance, choose a number of threads < {}",
                    cores
                ));
            }
        }
        if desc.thread_count > desc.params.iterations {
            sink.warn(&format!(
                "you chose to use {} threads, but that is greater than the number of \
                 bitstreams, which you set to {}; only {} threads will be used",
                desc.thread_count, desc.params.iterations, desc.params.iterations
            ));
            desc.thread_count = desc.params.iterations;
        }
    }

    // Assess-only work discovery: iteration counts come from the artifact
    // filenames, replacing whatever was configured.
    if let Some(dir) = desc.pvalues_dir.clone() {
        let work = scan_pvalues_dir(&dir, desc.params.bits_per_stream)?;
        desc.params.iterations = work.iterations;
        desc.discovered_files = work.filenames;
    }

    // Result/stats files are meaningless when no fresh iteration runs.
    if desc.run_mode == RunMode::AssessOnly && desc.write_results_txt {
        sink.warn(
            "mode 'a' (assess only) does not support the -s flag; this run won't \
             produce any stats.txt or results.txt file",
        );
        desc.write_results_txt = false;
    }

    // Bitcount checks run last so every override above has taken effect.
    if desc.params.bits_per_stream % 8 != 0 {
        return Err(ResolveError::usage(format!(
            "bitcount(n): {} must be a multiple of 8",
            desc.params.bits_per_stream
        )));
    }
    if desc.params.bits_per_stream < GLOBAL_MIN_BITCOUNT {
        return Err(ResolveError::usage(format!(
            "bitcount(n): {} must be >= {}",
            desc.params.bits_per_stream, GLOBAL_MIN_BITCOUNT
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;
    use crate::selection::NUM_TESTS;
    use clap::Parser;

    fn resolve_args(
        args: &[&str],
        cores: FixedCores,
        sink: &mut MemorySink,
    ) -> Result<RunDescriptor, ResolveError> {
        let opts = CliOptions::try_parse_from(args).expect("arguments should parse");
        resolve(&opts, &cores, &mut ScriptedPrompt(1), sink)
    }

    #[test]
    fn defaults_resolve_to_all_tests_and_one_iteration() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(&["sts-run", "data.bin"], FixedCores(Some(4)), &mut sink)
            .expect("defaults should resolve");
        assert_eq!(desc.selection.count(), NUM_TESTS);
        assert_eq!(desc.params.iterations, 1);
        assert_eq!(desc.thread_count, 1); // min(cores=4, iterations=1)
        assert!(sink.warnings.is_empty());
    }

    #[test]
    fn missing_randdata_is_fatal_for_iterating_modes() {
        let mut sink = MemorySink::new();
        let err = resolve_args(&["sts-run"], FixedCores(Some(4)), &mut sink)
            .expect_err("missing randdata");
        assert!(err.to_string().contains("missing randdata"));

        let err = resolve_args(&["sts-run", "-m", "i"], FixedCores(Some(4)), &mut sink)
            .expect_err("missing randdata");
        assert!(err.to_string().contains("missing randdata"));

        // Assess-only does not need the data argument.
        resolve_args(&["sts-run", "-m", "a"], FixedCores(Some(4)), &mut sink)
            .expect("assess-only without randdata");
    }

    #[test]
    fn thread_count_derives_from_cores_and_iterations() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-i", "5", "data.bin"],
            FixedCores(Some(16)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.thread_count, 5);
        assert!(sink.warnings.is_empty());

        let desc = resolve_args(
            &["sts-run", "-i", "100", "data.bin"],
            FixedCores(Some(16)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.thread_count, 16);
    }

    #[test]
    fn unavailable_core_count_keeps_prior_thread_count() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-i", "5", "data.bin"],
            FixedCores(None),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.thread_count, 0); // template value untouched
        assert!(sink.warnings.is_empty());
    }

    #[test]
    fn explicit_threads_above_iterations_warns_and_clamps() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-T", "20", "-i", "5", "data.bin"],
            FixedCores(Some(32)),
            &mut sink,
        )
        .expect("warning is not fatal");
        assert_eq!(desc.thread_count, 5);
        assert_eq!(sink.warnings.len(), 1);
        assert!(sink.warnings[0].contains("20"));
    }

    #[test]
    fn explicit_threads_above_cores_warns_without_clamping() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-T", "8", "-i", "100", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("warning is not fatal");
        assert_eq!(desc.thread_count, 8);
        assert_eq!(sink.warnings.len(), 1);
    }

    #[test]
    fn bins_default_to_sqrt_of_iterations() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-i", "100", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.params.uniformity_bins, 10);

        let desc = resolve_args(
            &["sts-run", "-i", "50", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.params.uniformity_bins, 7); // floor(sqrt(50))
    }

    #[test]
    fn explicit_bins_survive_without_legacy_mode() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-P", "8=25", "-i", "100", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.params.uniformity_bins, 25);
        assert!(sink.warnings.is_empty());
    }

    #[test]
    fn legacy_mode_downgrades_custom_bins_with_one_warning() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-O", "-P", "8=25", "-i", "100", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("warning is not fatal");
        assert_eq!(desc.params.uniformity_bins, DEFAULT_UNIFORMITY_BINS);
        assert_eq!(sink.warnings.len(), 1);
    }

    #[test]
    fn legacy_bins_override_skips_thread_derivation() {
        // The derivation is the else-branch of the bins downgrade: with
        // both conditions active, the thread count keeps its template
        // value even though cores are known.
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-O", "-P", "8=25", "-i", "100", "data.bin"],
            FixedCores(Some(16)),
            &mut sink,
        )
        .expect("should resolve");
        assert_eq!(desc.thread_count, 0);
    }

    #[test]
    fn stdin_with_interactive_mode_is_rejected() {
        let mut sink = MemorySink::new();
        let err = resolve_args(&["sts-run", "-A", "-"], FixedCores(Some(4)), &mut sink)
            .expect_err("contradictory input");
        assert!(err.to_string().contains("-A not allowed"));
    }

    #[test]
    fn stdin_requires_iterations_or_assess_only() {
        let mut sink = MemorySink::new();
        let err = resolve_args(&["sts-run", "-"], FixedCores(Some(4)), &mut sink)
            .expect_err("open-ended stdin run");
        assert!(err.to_string().contains("-i iterations or -m a"));

        resolve_args(&["sts-run", "-i", "3", "-"], FixedCores(Some(4)), &mut sink)
            .expect("stdin with explicit iterations");
        resolve_args(&["sts-run", "-m", "a", "-"], FixedCores(Some(4)), &mut sink)
            .expect("stdin with assess-only mode");
    }

    #[test]
    fn interactive_mode_asks_the_prompt_for_iterations() {
        let opts =
            CliOptions::try_parse_from(["sts-run", "-A", "data.bin"]).expect("should parse");
        let mut sink = MemorySink::new();
        let desc = resolve(
            &opts,
            &FixedCores(Some(4)),
            &mut ScriptedPrompt(12),
            &mut sink,
        )
        .expect("should resolve");
        assert!(!desc.batch_mode);
        assert_eq!(desc.params.iterations, 12);
    }

    #[test]
    fn interactive_prompt_answer_below_one_is_fatal() {
        let opts =
            CliOptions::try_parse_from(["sts-run", "-A", "data.bin"]).expect("should parse");
        let mut sink = MemorySink::new();
        let err = resolve(
            &opts,
            &FixedCores(Some(4)),
            &mut ScriptedPrompt(0),
            &mut sink,
        )
        .expect_err("zero bitstreams");
        assert!(err.to_string().contains("less than 1"));
    }

    #[test]
    fn iteration_override_below_one_is_rejected() {
        let mut sink = MemorySink::new();
        for args in [
            &["sts-run", "-P", "7=0", "data.bin"][..],
            &["sts-run", "-P", "7=-5", "data.bin"][..],
        ] {
            let err = resolve_args(args, FixedCores(Some(4)), &mut sink)
                .expect_err("iteration count below 1");
            assert!(err.to_string().contains("less than 1"), "args: {args:?}");
        }
    }

    #[test]
    fn assess_only_forces_results_files_off_with_a_warning() {
        let mut sink = MemorySink::new();
        let desc = resolve_args(
            &["sts-run", "-m", "a", "-s"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect("warning is not fatal");
        assert!(!desc.write_results_txt);
        assert!(desc.flags.results_txt); // the request itself is remembered
        assert_eq!(sink.warnings.len(), 1);
    }

    #[test]
    fn bitcount_not_a_multiple_of_eight_is_rejected_from_any_source() {
        let mut sink = MemorySink::new();
        for args in [
            &["sts-run", "-S", "1001", "data.bin"][..],
            &["sts-run", "-P", "9=1001", "data.bin"][..],
        ] {
            let err = resolve_args(args, FixedCores(Some(4)), &mut sink)
                .expect_err("odd bitcount");
            assert!(err.to_string().contains("multiple of 8"));
        }
    }

    #[test]
    fn bitcount_below_global_minimum_is_rejected() {
        let mut sink = MemorySink::new();
        let err = resolve_args(
            &["sts-run", "-S", "8", "data.bin"],
            FixedCores(Some(4)),
            &mut sink,
        )
        .expect_err("tiny bitcount");
        assert!(err.to_string().contains(">= 1000"));
    }

    #[test]
    fn resolving_twice_yields_identical_descriptors() {
        let args = [
            "sts-run", "-t", "1,2,3", "-P", "8=20,11=0.05", "-i", "40", "-T", "4", "-w",
            "work", "-O", "data.bin",
        ];
        let mut sink = MemorySink::new();
        let a = resolve_args(&args, FixedCores(Some(8)), &mut sink).expect("first");
        let b = resolve_args(&args, FixedCores(Some(8)), &mut sink).expect("second");
        assert_eq!(a, b);
    }
}

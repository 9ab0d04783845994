// tests/discovery_tests.rs
//
// Work-discovery scanning against real directories: p-value artifact
// filenames are the only metadata, so the scan must reconstruct iteration
// counts from names alone and ignore everything else in the directory.

use std::fs;

use clap::Parser;

use sts_run::discovery::scan_pvalues_dir;
use sts_run::{resolve, CliOptions, FixedCores, MemorySink, ResolveError, ScriptedPrompt};

fn touch(dir: &std::path::Path, name: &str) {
    fs::write(dir.join(name), b"").expect("failed to create test file");
}

#[test]
fn matching_files_sum_iterations_and_are_recorded() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    touch(temp_dir.path(), "sts.0.100.1048576.pvalues");
    touch(temp_dir.path(), "sts.1.50.1048576.pvalues");
    touch(temp_dir.path(), "sts.0.100.2048.pvalues"); // mismatched bitcount
    touch(temp_dir.path(), "notes.txt");

    let work = scan_pvalues_dir(temp_dir.path(), 1_048_576).expect("scan should succeed");
    assert_eq!(work.iterations, 150);

    let mut names = work.filenames.clone();
    names.sort();
    assert_eq!(
        names,
        vec!["sts.0.100.1048576.pvalues", "sts.1.50.1048576.pvalues"]
    );
}

#[test]
fn directories_and_non_matching_names_are_skipped_silently() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    // A directory whose name would otherwise match.
    fs::create_dir(temp_dir.path().join("sts.0.100.2048.pvalues"))
        .expect("failed to create subdir");
    touch(temp_dir.path(), "sts.0.7.2048.pvalues");
    touch(temp_dir.path(), "sts.100.2048.pvalues"); // four fields only

    let work = scan_pvalues_dir(temp_dir.path(), 2048).expect("scan should succeed");
    assert_eq!(work.iterations, 7);
    assert_eq!(work.filenames, vec!["sts.0.7.2048.pvalues"]);
}

#[test]
fn empty_directory_yields_zero_iterations_not_an_error() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let work = scan_pvalues_dir(temp_dir.path(), 2048).expect("scan should succeed");
    assert_eq!(work.iterations, 0);
    assert!(work.filenames.is_empty());
}

#[test]
fn unopenable_directory_is_a_resource_error() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    let missing = temp_dir.path().join("no_such_dir");
    let err = scan_pvalues_dir(&missing, 2048).expect_err("scan should fail");
    assert!(matches!(err, ResolveError::Resource { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn assess_only_run_takes_its_iteration_count_from_the_directory() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    touch(temp_dir.path(), "sts.0.100.1048576.pvalues");
    touch(temp_dir.path(), "sts.1.50.1048576.pvalues");

    let dir_arg = temp_dir.path().to_str().expect("utf-8 temp path");
    let opts = CliOptions::try_parse_from([
        "sts-run", "-m", "a", "-i", "9999", "-d", dir_arg,
    ])
    .expect("arguments should parse");
    let mut sink = MemorySink::new();
    let desc = resolve(
        &opts,
        &FixedCores(Some(4)),
        &mut ScriptedPrompt(1),
        &mut sink,
    )
    .expect("resolution should succeed");

    // The configured count is replaced, not added to.
    assert_eq!(desc.params.iterations, 150);
    assert_eq!(desc.discovered_files.len(), 2);
}

#[test]
fn scan_respects_the_bitcount_configured_by_override() {
    let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
    touch(temp_dir.path(), "sts.0.100.2048.pvalues");
    touch(temp_dir.path(), "sts.0.100.1048576.pvalues");

    let dir_arg = temp_dir.path().to_str().expect("utf-8 temp path");
    let opts = CliOptions::try_parse_from([
        "sts-run", "-m", "a", "-S", "2048", "-d", dir_arg,
    ])
    .expect("arguments should parse");
    let mut sink = MemorySink::new();
    let desc = resolve(
        &opts,
        &FixedCores(Some(4)),
        &mut ScriptedPrompt(1),
        &mut sink,
    )
    .expect("resolution should succeed");

    assert_eq!(desc.params.iterations, 100);
    assert_eq!(desc.discovered_files, vec!["sts.0.100.2048.pvalues"]);
}

// src/discovery.rs
//
// Work discovery for assess-only runs: reconstruct how many iterations a
// directory of previously computed p-value files holds, from the
// filenames alone.
//
// Files are named `sts.<jobnum>.<iterations>.<bitcount>.pvalues`. There is
// no accompanying metadata; the iteration count in the name is trusted,
// assuming the files were not renamed.

use std::fs;
use std::path::Path;

use crate::errors::ResolveError;

/// Filename marker in the first dot-delimited field.
const NAME_PREFIX: &str = "sts";
/// Filename marker in the fifth dot-delimited field.
const NAME_SUFFIX: &str = "pvalues";

/// What a p-values directory scan recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredWork {
    /// Sum of the per-file iteration counts.
    pub iterations: i64,
    /// Matching filenames in filesystem enumeration order. Not sorted;
    /// callers needing determinism across filesystems must sort.
    pub filenames: Vec<String>,
}

/// Match one directory-entry name against the p-values naming shape and
/// return the iteration count it encodes.
///
/// A match takes the first five dot-delimited tokens and requires exactly
/// five: the literal `sts`, a job number (ignored), an integer iteration
/// count, an integer bitcount equal to `bits_per_stream`, and the literal
/// `pvalues`. Anything after a fifth token is not examined. Names whose
/// integer fields do not parse are not matches.
fn parse_pvalues_name(name: &str, bits_per_stream: i64) -> Option<i64> {
    let tokens: Vec<&str> = name.split('.').take(5).collect();
    if tokens.len() != 5 {
        return None;
    }
    if tokens[0] != NAME_PREFIX || tokens[4] != NAME_SUFFIX {
        return None;
    }
    let bitcount: i64 = tokens[3].parse().ok()?;
    if bitcount != bits_per_stream {
        return None;
    }
    tokens[2].parse().ok()
}

/// Scan `dir` for p-value files whose names encode `bits_per_stream`.
///
/// Accumulation starts from zero: whatever iteration count was configured
/// before the scan is discarded by the caller in favor of the returned
/// total. Non-regular entries and non-matching names are skipped silently;
/// an empty result is not an error. A directory that cannot be opened at
/// all is fatal.
pub fn scan_pvalues_dir(dir: &Path, bits_per_stream: i64) -> Result<DiscoveredWork, ResolveError> {
    let entries = fs::read_dir(dir).map_err(|e| ResolveError::Resource {
        path: dir.display().to_string(),
        source: e.to_string(),
    })?;

    let mut work = DiscoveredWork::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            // An entry that vanished mid-scan is treated like a non-match.
            Err(_) => continue,
        };

        // stat() semantics: follow symlinks, keep regular files only.
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_file() => {}
            _ => continue,
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(iterations) = parse_pvalues_name(name, bits_per_stream) {
            work.iterations += iterations;
            work.filenames.push(name.to_string());
        }
    }
    Ok(work)
}

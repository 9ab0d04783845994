// src/main.rs
//
// Thin CLI harness: parse the flag table, run resolution, report how the
// run would execute, and exit with the documented codes.
//
// Exit codes: 0 success / help shown; 1 usage or resource error;
// 2 internal contract violation. Codes above 3 belong to the downstream
// execution phase, which is not part of this binary.

use std::process;

use clap::error::ErrorKind;
use clap::Parser;

use sts_run::logging::DBG_HIGH;
use sts_run::{resolve, CliOptions, StderrSink, SystemCores, TerminalPrompt};

fn main() {
    let opts = match CliOptions::try_parse() {
        Ok(opts) => opts,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            // clap renders its own message (help included).
            let _ = err.print();
            process::exit(code);
        }
    };

    let verbosity = opts.debug_level;
    let mut sink = StderrSink::new(verbosity);

    let descriptor = match resolve(&opts, &SystemCores, &mut TerminalPrompt, &mut sink) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            eprintln!("sts-run: {}", err);
            process::exit(err.exit_code());
        }
    };

    if verbosity > 0 {
        descriptor.log_summary(&mut sink);
    }
    if verbosity >= i64::from(DBG_HIGH) {
        // Machine-readable dump of the frozen descriptor.
        match serde_json::to_string(&descriptor) {
            Ok(json) => eprintln!("{}", json),
            Err(err) => eprintln!("sts-run: could not serialize the run descriptor: {}", err),
        }
    }

    println!(
        "sts-run | mode={} tests={} iterations={} bits_per_stream={} threads={}",
        descriptor.run_mode.as_char(),
        descriptor.selection.count(),
        descriptor.params.iterations,
        descriptor.params.bits_per_stream,
        descriptor.thread_count,
    );
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the suggest-partitions tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes. The integration
//! tests cover it by running the built binary.

use std::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use argh::FromArgs;
use suggest_partitions::{CpuinfoSource, RunInput, run};
use tracing_subscriber::EnvFilter;

/// Inspect the processor topology of this host and print a suggested [partitions] configuration
/// block with one logical processor per physical core.
#[derive(FromArgs)]
struct Args {
    /// read processor information from this file instead of /proc/cpuinfo ('-' for stdin)
    #[argh(option)]
    cpuinfo: Option<CpuinfoSource>,

    /// log diagnostics about the scanned topology to stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    let args: Args = argh::from_env();

    init_logging(args.verbose);

    let input = RunInput {
        source: args.cpuinfo.unwrap_or_default(),
    };

    match run(&input) {
        Ok(outcome) => {
            // The suggestion already ends with a newline.
            print!("{}", outcome.suggestion);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", describe_error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr so that stdout carries nothing but the configuration block.
///
/// `RUST_LOG` takes precedence over the `--verbose` switch when set.
#[cfg_attr(test, mutants::skip)]
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Joins the error with all of its sources, e.g.
/// `malformed processor information in /proc/cpuinfo: line 4: blank line before ...`.
fn describe_error_chain(error: &dyn Error) -> String {
    let mut description = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }

    description
}

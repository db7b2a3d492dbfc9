#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Inspects the processor topology of a Linux host and suggests a partition layout with one
//! logical processor ("lcore") per physical core.
//!
//! The processor information is read in the `/proc/cpuinfo` format: blocks of `key : value` lines,
//! one block per logical processor, separated by blank lines. Of every block we use only the
//! `processor`, `physical id` and `core id` lines. Hyperthreading siblings share a
//! (`physical id`, `core id`) pair, so keeping the first processor seen for every pair yields one
//! logical processor per physical core.
//!
//! The result is rendered as a configuration block meant to be pasted into the `[partitions]`
//! section of a partitioned store's configuration file:
//!
//! ```text
//! [partitions]
//! lcores = [0, 1, 2, 3]
//! partition_count = 4
//! ```
//!
//! The binary entry point is in `main.rs`. The scanning logic is available directly via [`scan`].
//!
//! # Example
//!
//! ```
//! let cpuinfo = "\
//! processor\t: 0
//! physical id\t: 0
//! core id\t\t: 0
//!
//! processor\t: 1
//! physical id\t: 0
//! core id\t\t: 1
//!
//! processor\t: 2
//! physical id\t: 0
//! core id\t\t: 0
//!
//! ";
//!
//! let report = suggest_partitions::scan(cpuinfo).unwrap();
//!
//! assert_eq!(
//!     report.suggestion.to_string(),
//!     "[partitions]\nlcores = [0, 1]\npartition_count = 2\n"
//! );
//! ```

mod error;
mod pal;
mod primitive_types;
mod scanner;
mod suggestion;
mod types;

pub use error::*;
use pal::{Filesystem, FilesystemFacade};
pub use primitive_types::*;
pub use scanner::*;
pub use suggestion::*;
use tracing::{debug, info};
pub use types::*;

/// Core logic of the tool, extracted for testability.
///
/// Reads the processor information from the requested source, scans it and returns the
/// suggestion. Printing is left to the caller.
#[doc(hidden)]
pub fn run(input: &RunInput) -> Result<RunOutcome, RunError> {
    run_with_filesystem(input, &FilesystemFacade::target())
}

/// Internal implementation of `run` that accepts a filesystem abstraction.
///
/// This allows mocking the input source in tests.
fn run_with_filesystem(input: &RunInput, fs: &impl Filesystem) -> Result<RunOutcome, RunError> {
    debug!(source = %input.source, "reading processor information");

    let contents = match &input.source {
        CpuinfoSource::ProcCpuinfo => fs.read_proc_cpuinfo(),
        CpuinfoSource::File(path) => fs.read_file(path),
        CpuinfoSource::Stdin => fs.read_stdin(),
    }
    .map_err(|error| RunError::Read {
        input: input.source.clone(),
        error,
    })?;

    let report = scan(&contents).map_err(|error| RunError::Scan {
        input: input.source.clone(),
        error,
    })?;

    info!(
        logical_processors = report.summary.logical_processors,
        packages = report.summary.packages,
        physical_cores = report.summary.physical_cores,
        partitions = report.suggestion.partition_count(),
        "scanned processor topology"
    );

    Ok(RunOutcome {
        suggestion: report.suggestion,
        summary: report.summary,
    })
}

// Public API types for suggest-partitions.
//
// These types are used by main.rs and exposed via the crate's public API.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::{PartitionSuggestion, ScanError, TopologySummary};

/// Where to read processor information from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum CpuinfoSource {
    /// The `/proc/cpuinfo` file of the current host.
    #[default]
    ProcCpuinfo,

    /// A file in the `/proc/cpuinfo` format, e.g. a copy saved on another host.
    File(PathBuf),

    /// Standard input, read until end of stream.
    Stdin,
}

impl FromStr for CpuinfoSource {
    type Err = String;

    /// Parses a command line value: `-` means standard input, anything else is a file path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("cpuinfo path must not be empty, use '-' for standard input".to_string()),
            "-" => Ok(Self::Stdin),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for CpuinfoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcCpuinfo => f.write_str("/proc/cpuinfo"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => f.write_str("standard input"),
        }
    }
}

/// Input parameters for the `run` function.
///
/// This is the parsed and validated input that the core logic operates on.
#[doc(hidden)]
#[derive(Clone, Debug, Default)]
#[allow(
    clippy::exhaustive_structs,
    reason = "This is a hidden struct for internal/test use only"
)]
pub struct RunInput {
    /// Where to read processor information from.
    pub source: CpuinfoSource,
}

/// The outcome of a successful run.
#[doc(hidden)]
#[derive(Clone, Debug, Eq, PartialEq)]
#[allow(
    clippy::exhaustive_structs,
    reason = "This is a hidden struct for internal/test use only"
)]
pub struct RunOutcome {
    /// The configuration block to print.
    pub suggestion: PartitionSuggestion,

    /// Shape of the scanned topology.
    pub summary: TopologySummary,
}

/// Errors that can occur during a run.
#[doc(hidden)]
#[derive(Debug, Error)]
#[allow(
    clippy::exhaustive_enums,
    reason = "This is a hidden enum for internal/test use only"
)]
pub enum RunError {
    /// The processor information could not be read.
    #[error("failed to read processor information from {input}")]
    Read {
        /// The source we attempted to read.
        input: CpuinfoSource,

        /// The underlying I/O failure.
        #[source]
        error: io::Error,
    },

    /// The processor information was read but is malformed.
    #[error("malformed processor information in {input}")]
    Scan {
        /// The source the malformed data came from.
        input: CpuinfoSource,

        /// What was wrong with it.
        #[source]
        error: ScanError,
    },
}

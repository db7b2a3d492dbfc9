use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// One of the `/proc/cpuinfo` keys that the scanner extracts from each processor block.
///
/// Every other key in the block is ignored.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Field {
    /// `processor : N`, the logical processor index.
    Processor,

    /// `physical id : N`, the index of the physical package the processor belongs to.
    PhysicalId,

    /// `core id : N`, the index of the physical core within its package.
    CoreId,
}

impl Field {
    /// All recognized fields.
    pub(crate) const ALL: [Self; 3] = [Self::Processor, Self::PhysicalId, Self::CoreId];

    /// The key text as it appears at the start of a `/proc/cpuinfo` line.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Processor => "processor",
            Self::PhysicalId => "physical id",
            Self::CoreId => "core id",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The processor information did not have the expected shape.
///
/// Line numbers are 1-based. For errors detected at a block boundary, the line number is that of
/// the blank line terminating the block.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScanError {
    /// A recognized key had a value that is not an unsigned decimal integer.
    #[error("line {line}: '{field}' value '{value}' is not a valid integer")]
    InvalidValue {
        /// Line the value was found on.
        line: usize,

        /// Which key the value belonged to.
        field: Field,

        /// The raw value, trimmed of surrounding whitespace.
        value: String,

        /// Why the integer parse failed.
        #[source]
        source: ParseIntError,
    },

    /// A processor block ended before all recognized keys were seen.
    #[error("line {line}: processor block ended without a '{field}' line")]
    MissingField {
        /// Line on which the block ended.
        line: usize,

        /// The first field that was not present in the block.
        field: Field,
    },

    /// A recognized key appeared twice in the same block, which usually means that the blank line
    /// separating two blocks is missing.
    #[error("line {line}: '{field}' appears more than once in the same processor block")]
    DuplicateField {
        /// Line of the second occurrence.
        line: usize,

        /// The repeated field.
        field: Field,
    },

    /// A blank line was encountered before any processor block was read.
    #[error("line {line}: blank line before the first processor block")]
    BlankBeforeFirstBlock {
        /// Line of the offending blank line.
        line: usize,
    },

    /// The input ended inside a processor block. Only a blank line terminates a block, so a
    /// truncated capture is rejected rather than guessed at.
    #[error("line {line}: input ended without a blank line terminating the last processor block")]
    UnterminatedBlock {
        /// Last line of the input.
        line: usize,
    },

    /// The input did not contain a single processor block.
    #[error("no processor blocks found in the input")]
    NoProcessors,
}

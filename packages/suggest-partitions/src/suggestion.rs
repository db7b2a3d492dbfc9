use std::fmt;

use itertools::Itertools;

use crate::ProcessorId;

/// A suggested `[partitions]` configuration block: one logical processor per physical core.
///
/// The [`Display`][fmt::Display] implementation renders the block in the exact format that the
/// downstream configuration file expects:
///
/// ```text
/// [partitions]
/// lcores = [0, 1, 2, 3]
/// partition_count = 4
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PartitionSuggestion {
    lcores: Vec<ProcessorId>,
}

impl PartitionSuggestion {
    pub(crate) const fn new(lcores: Vec<ProcessorId>) -> Self {
        Self { lcores }
    }

    /// The selected logical processors, in the order their physical cores were first seen.
    #[must_use]
    pub fn lcores(&self) -> &[ProcessorId] {
        &self.lcores
    }

    /// The number of partitions, equal to the number of distinct physical cores.
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.lcores.len()
    }
}

impl fmt::Display for PartitionSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[partitions]")?;
        writeln!(f, "lcores = [{}]", self.lcores.iter().join(", "))?;
        writeln!(f, "partition_count = {}", self.partition_count())
    }
}

//! Topology scanner for the `/proc/cpuinfo` format.
//!
//! The input is a sequence of processor blocks separated by blank lines, each block a list of
//! `key : value` lines. We extract the logical processor index, the physical package index and the
//! core index from each block and keep the first logical processor seen for every distinct
//! (package, core) pair. Hyperthreading siblings that share a physical core are skipped.

use std::mem;

use foldhash::HashSet;
use tracing::debug;

use crate::{CoreId, Field, PackageId, PartitionSuggestion, ProcessorId, ScanError};

/// Everything learned from one pass over the processor information.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ScanReport {
    /// One logical processor per physical core, ready to be rendered as configuration.
    pub suggestion: PartitionSuggestion,

    /// Counts gathered during the same pass, for diagnostics.
    pub summary: TopologySummary,
}

/// Shape of the processor topology described by the input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct TopologySummary {
    /// Number of processor blocks, i.e. logical processors including SMT siblings.
    pub logical_processors: usize,

    /// Number of distinct physical packages.
    pub packages: usize,

    /// Number of distinct (package, core) pairs.
    pub physical_cores: usize,
}

/// Scans processor information in the `/proc/cpuinfo` format and selects the first logical
/// processor of every physical core.
///
/// The selected processors are returned in the order their physical cores were first encountered.
/// Only a blank line terminates a block, so the input must end with one.
///
/// # Errors
///
/// Returns an error if a recognized value is not an unsigned integer, if a block lacks one of the
/// `processor`, `physical id` or `core id` lines or repeats one of them, if a blank line precedes
/// the first block, if the input ends inside a block or if the input contains no processor blocks
/// at all.
///
/// # Example
///
/// ```
/// let cpuinfo = "processor : 0\nphysical id : 0\ncore id : 0\n\n\
///                processor : 1\nphysical id : 0\ncore id : 0\n\n";
///
/// let report = suggest_partitions::scan(cpuinfo).unwrap();
///
/// assert_eq!(report.suggestion.lcores(), &[0]);
/// assert_eq!(report.summary.logical_processors, 2);
/// ```
pub fn scan(contents: &str) -> Result<ScanReport, ScanError> {
    let mut scanner = Scanner::default();
    let mut line_number: usize = 0;

    for line in contents.lines() {
        line_number = line_number.saturating_add(1);
        scanner.feed(line, line_number)?;
    }

    scanner.finish(line_number)
}

#[derive(Debug, Default)]
struct Scanner {
    block: PartialRecord,
    selection: Selection,
}

impl Scanner {
    fn feed(&mut self, line: &str, line_number: usize) -> Result<(), ScanError> {
        if is_blank(line) && self.block.is_empty() {
            // Nothing accumulated since the last boundary. Extra separators between blocks are
            // harmless but a leading blank line means we are not looking at cpuinfo data.
            return if self.selection.is_empty() {
                Err(ScanError::BlankBeforeFirstBlock { line: line_number })
            } else {
                Ok(())
            };
        }

        match mem::take(&mut self.block).step(line, line_number)? {
            BlockState::Accumulating(block) => self.block = block,
            BlockState::ReadyToFlush(record) => self.selection.flush(record),
        }

        Ok(())
    }

    fn finish(self, last_line_number: usize) -> Result<ScanReport, ScanError> {
        if !self.block.is_empty() {
            return Err(ScanError::UnterminatedBlock {
                line: last_line_number,
            });
        }

        if self.selection.is_empty() {
            return Err(ScanError::NoProcessors);
        }

        Ok(self.selection.into_report())
    }
}

/// State of the block currently being scanned.
///
/// Non-blank lines keep a block accumulating. A blank line makes it ready to flush, which is only
/// possible once every recognized field has been seen.
#[derive(Debug)]
enum BlockState {
    Accumulating(PartialRecord),
    ReadyToFlush(ProcessorRecord),
}

#[derive(Debug, Default)]
struct PartialRecord {
    processor_id: Option<ProcessorId>,
    physical_id: Option<PackageId>,
    core_id: Option<CoreId>,

    // Non-blank lines seen in this block, recognized or not.
    line_count: usize,
}

impl PartialRecord {
    const fn is_empty(&self) -> bool {
        self.line_count == 0
    }

    fn step(mut self, line: &str, line_number: usize) -> Result<BlockState, ScanError> {
        if is_blank(line) {
            return self.complete(line_number).map(BlockState::ReadyToFlush);
        }

        self.accept(line, line_number)?;
        Ok(BlockState::Accumulating(self))
    }

    fn accept(&mut self, line: &str, line_number: usize) -> Result<(), ScanError> {
        self.line_count = self.line_count.saturating_add(1);

        let Some((field, value)) = parse_line(line) else {
            return Ok(());
        };

        let parsed = value
            .parse::<u32>()
            .map_err(|source| ScanError::InvalidValue {
                line: line_number,
                field,
                value: value.to_string(),
                source,
            })?;

        let slot = match field {
            Field::Processor => &mut self.processor_id,
            Field::PhysicalId => &mut self.physical_id,
            Field::CoreId => &mut self.core_id,
        };

        if slot.replace(parsed).is_some() {
            return Err(ScanError::DuplicateField {
                line: line_number,
                field,
            });
        }

        Ok(())
    }

    fn complete(self, line_number: usize) -> Result<ProcessorRecord, ScanError> {
        let missing = |field| ScanError::MissingField {
            line: line_number,
            field,
        };

        Ok(ProcessorRecord {
            processor_id: self
                .processor_id
                .ok_or_else(|| missing(Field::Processor))?,
            physical_id: self.physical_id.ok_or_else(|| missing(Field::PhysicalId))?,
            core_id: self.core_id.ok_or_else(|| missing(Field::CoreId))?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct ProcessorRecord {
    processor_id: ProcessorId,
    physical_id: PackageId,
    core_id: CoreId,
}

#[derive(Debug, Default)]
struct Selection {
    seen_cores: HashSet<(PackageId, CoreId)>,
    seen_packages: HashSet<PackageId>,
    lcores: Vec<ProcessorId>,
    blocks_flushed: usize,
}

impl Selection {
    const fn is_empty(&self) -> bool {
        self.blocks_flushed == 0
    }

    fn flush(&mut self, record: ProcessorRecord) {
        self.blocks_flushed = self.blocks_flushed.saturating_add(1);
        self.seen_packages.insert(record.physical_id);

        if self.seen_cores.insert((record.physical_id, record.core_id)) {
            debug!(
                processor = record.processor_id,
                physical_id = record.physical_id,
                core_id = record.core_id,
                "selected processor as partition lcore"
            );
            self.lcores.push(record.processor_id);
        } else {
            debug!(
                processor = record.processor_id,
                physical_id = record.physical_id,
                core_id = record.core_id,
                "skipped processor, its physical core already has an lcore"
            );
        }
    }

    fn into_report(self) -> ScanReport {
        let summary = TopologySummary {
            logical_processors: self.blocks_flushed,
            packages: self.seen_packages.len(),
            physical_cores: self.seen_cores.len(),
        };

        ScanReport {
            suggestion: PartitionSuggestion::new(self.lcores),
            summary,
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Recognizes `processor`, `physical id` and `core id` lines, returning the field and its trimmed
/// raw value. The key must start at the beginning of the line; whitespace between the key and the
/// `:` separator is allowed.
fn parse_line(line: &str) -> Option<(Field, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim_end();

    let field = Field::ALL.into_iter().find(|field| field.key() == key)?;

    Some((field, value.trim()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Write;

    use super::*;

    /// Renders cpuinfo text for the given (processor, physical id, core id) triples, padded with
    /// a few of the keys that real x86 cpuinfo carries so we prove they are ignored.
    fn simulate_cpuinfo(layout: &[(u32, u32, u32)]) -> String {
        let mut cpuinfo = String::new();

        for &(processor, physical_id, core_id) in layout {
            writeln!(cpuinfo, "processor\t: {processor}").unwrap();
            writeln!(cpuinfo, "vendor_id\t: GenuineIntel").unwrap();
            writeln!(cpuinfo, "model name\t: Intel(R) Xeon(R) CPU E5-2680 v3 @ 2.50GHz").unwrap();
            writeln!(cpuinfo, "cpu MHz\t\t: 2494.224").unwrap();
            writeln!(cpuinfo, "physical id\t: {physical_id}").unwrap();
            writeln!(cpuinfo, "siblings\t: 4").unwrap();
            writeln!(cpuinfo, "core id\t\t: {core_id}").unwrap();
            writeln!(cpuinfo, "cpu cores\t: 2").unwrap();
            writeln!(cpuinfo, "flags\t\t: fpu vme de pse tsc msr pae mce cx8").unwrap();
            writeln!(cpuinfo).unwrap();
        }

        cpuinfo
    }

    #[test]
    fn two_packages_two_cores_two_threads() {
        // Linux enumerates the first thread of every core before any second threads.
        let cpuinfo = simulate_cpuinfo(&[
            (0, 0, 0),
            (1, 0, 1),
            (2, 1, 0),
            (3, 1, 1),
            (4, 0, 0),
            (5, 0, 1),
            (6, 1, 0),
            (7, 1, 1),
        ]);

        let report = scan(&cpuinfo).unwrap();

        assert_eq!(report.suggestion.lcores(), &[0, 1, 2, 3]);
        assert_eq!(report.suggestion.partition_count(), 4);
        assert_eq!(
            report.summary,
            TopologySummary {
                logical_processors: 8,
                packages: 2,
                physical_cores: 4,
            }
        );
    }

    #[test]
    fn adjacent_siblings_keep_first_seen() {
        let cpuinfo = simulate_cpuinfo(&[
            (0, 0, 0),
            (1, 0, 0),
            (2, 0, 1),
            (3, 0, 1),
            (4, 1, 0),
            (5, 1, 0),
            (6, 1, 1),
            (7, 1, 1),
        ]);

        let report = scan(&cpuinfo).unwrap();

        assert_eq!(report.suggestion.lcores(), &[0, 2, 4, 6]);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let cpuinfo = simulate_cpuinfo(&[(9, 1, 3), (4, 0, 0), (7, 1, 3), (2, 0, 5)]);

        let report = scan(&cpuinfo).unwrap();

        assert_eq!(report.suggestion.lcores(), &[9, 4, 2]);
    }

    #[test]
    fn same_core_id_in_different_packages_is_distinct() {
        let cpuinfo = simulate_cpuinfo(&[(0, 0, 0), (1, 1, 0)]);

        let report = scan(&cpuinfo).unwrap();

        assert_eq!(report.suggestion.lcores(), &[0, 1]);
        assert_eq!(report.summary.packages, 2);
    }

    #[test]
    fn single_block() {
        let report = scan("processor : 5\nphysical id : 0\ncore id : 0\n\n").unwrap();

        assert_eq!(report.suggestion.lcores(), &[5]);
        assert_eq!(report.suggestion.partition_count(), 1);
    }

    #[test]
    fn keys_may_appear_in_any_order() {
        let report = scan("core id : 3\nprocessor : 11\nphysical id : 2\n\n").unwrap();

        assert_eq!(report.suggestion.lcores(), &[11]);
    }

    #[test]
    fn last_block_without_trailing_blank_line_is_error() {
        let cpuinfo = "processor : 0\nphysical id : 0\ncore id : 0\n\n\
                       processor : 1\nphysical id : 0\ncore id : 1";

        let result = scan(cpuinfo);

        assert!(matches!(
            result,
            Err(ScanError::UnterminatedBlock { line: 7 })
        ));
    }

    #[test]
    fn single_block_without_trailing_blank_line_is_error() {
        let result = scan("processor : 0\nphysical id : 0\ncore id : 0");

        assert!(matches!(
            result,
            Err(ScanError::UnterminatedBlock { line: 3 })
        ));
    }

    #[test]
    fn extra_blank_lines_between_blocks_are_tolerated() {
        let cpuinfo = "processor : 0\nphysical id : 0\ncore id : 0\n\n  \n\t\n\
                       processor : 1\nphysical id : 0\ncore id : 1\n\n\n";

        let report = scan(cpuinfo).unwrap();

        assert_eq!(report.suggestion.lcores(), &[0, 1]);
        assert_eq!(report.summary.logical_processors, 2);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let report = scan("processor : 3\r\nphysical id : 0\r\ncore id : 1\r\n\r\n").unwrap();

        assert_eq!(report.suggestion.lcores(), &[3]);
    }

    #[test]
    fn scanning_is_idempotent() {
        let cpuinfo = simulate_cpuinfo(&[(0, 0, 0), (1, 0, 0), (2, 0, 1)]);

        assert_eq!(scan(&cpuinfo).unwrap(), scan(&cpuinfo).unwrap());
    }

    #[test]
    fn blank_line_before_first_block_is_error() {
        let result = scan("\nprocessor : 0\nphysical id : 0\ncore id : 0\n\n");

        assert!(matches!(
            result,
            Err(ScanError::BlankBeforeFirstBlock { line: 1 })
        ));
    }

    #[test]
    fn whitespace_only_input_is_error() {
        let result = scan("   \n");

        assert!(matches!(
            result,
            Err(ScanError::BlankBeforeFirstBlock { line: 1 })
        ));
    }

    #[test]
    fn empty_input_is_error() {
        assert!(matches!(scan(""), Err(ScanError::NoProcessors)));
    }

    #[test]
    fn missing_core_id_is_error() {
        let result = scan("processor : 0\nphysical id : 0\n\n");

        assert!(matches!(
            result,
            Err(ScanError::MissingField {
                line: 3,
                field: Field::CoreId
            })
        ));
    }

    #[test]
    fn block_with_no_recognized_keys_is_error() {
        let result = scan("model name : whatever\nflags : fpu\n\n");

        assert!(matches!(
            result,
            Err(ScanError::MissingField {
                line: 3,
                field: Field::Processor
            })
        ));
    }

    #[test]
    fn fields_do_not_carry_over_between_blocks() {
        let cpuinfo = "processor : 0\nphysical id : 0\ncore id : 0\n\n\
                       processor : 1\nphysical id : 0\n\n";

        let result = scan(cpuinfo);

        assert!(matches!(
            result,
            Err(ScanError::MissingField {
                line: 7,
                field: Field::CoreId
            })
        ));
    }

    #[test]
    fn incomplete_last_block_without_blank_line_is_error() {
        let result = scan("processor : 0\ncore id : 0\nflags : fpu");

        assert!(matches!(
            result,
            Err(ScanError::UnterminatedBlock { line: 3 })
        ));
    }

    #[test]
    fn unparsable_value_is_error() {
        let result = scan("processor : 0\nphysical id : zero\ncore id : 0\n\n");

        match result {
            Err(ScanError::InvalidValue {
                line, field, value, ..
            }) => {
                assert_eq!(line, 2);
                assert_eq!(field, Field::PhysicalId);
                assert_eq!(value, "zero");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn negative_value_is_error() {
        let result = scan("processor : -1\nphysical id : 0\ncore id : 0\n\n");

        assert!(matches!(
            result,
            Err(ScanError::InvalidValue {
                line: 1,
                field: Field::Processor,
                ..
            })
        ));
    }

    #[test]
    fn repeated_key_in_block_is_error() {
        let result = scan("processor : 0\nphysical id : 0\ncore id : 0\nprocessor : 1\n\n");

        assert!(matches!(
            result,
            Err(ScanError::DuplicateField {
                line: 4,
                field: Field::Processor
            })
        ));
    }

    #[test]
    fn indented_key_is_not_recognized() {
        let result = scan("  processor : 0\nphysical id : 0\ncore id : 0\n\n");

        assert!(matches!(
            result,
            Err(ScanError::MissingField {
                field: Field::Processor,
                ..
            })
        ));
    }

    #[test]
    fn parse_line_recognizes_keys() {
        assert_eq!(
            parse_line("processor\t: 29"),
            Some((Field::Processor, "29"))
        );
        assert_eq!(
            parse_line("physical id : 1"),
            Some((Field::PhysicalId, "1"))
        );
        assert_eq!(parse_line("core id\t\t: 12 "), Some((Field::CoreId, "12")));
        assert_eq!(parse_line("processor:7"), Some((Field::Processor, "7")));

        assert_eq!(parse_line("cpu MHz\t\t: 3400.036"), None);
        assert_eq!(parse_line("core ids : 1"), None);
        assert_eq!(parse_line("processor 5"), None);
        assert_eq!(parse_line(" core id : 1"), None);
    }
}

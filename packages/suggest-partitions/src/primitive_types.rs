/// Identifies a logical processor (an "lcore"), as listed in the `processor` line of
/// `/proc/cpuinfo`.
///
/// This will match the numeric identifier used by standard tooling of the operating system and by
/// the `lcores` list of the suggested configuration.
///
/// The values are not guaranteed to be sequential/contiguous or to start from zero.
pub type ProcessorId = u32;

/// Identifies a physical processor package (socket), as listed in the `physical id` line.
pub type PackageId = u32;

/// Identifies a physical core within its package, as listed in the `core id` line.
///
/// Core IDs are only unique within a package and may have gaps.
pub type CoreId = u32;

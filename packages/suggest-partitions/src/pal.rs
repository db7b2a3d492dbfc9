// Platform abstraction layer for suggest-partitions.
//
// The only platform interaction is reading processor information, which we abstract to allow the
// run logic to be tested against a mock filesystem. Same three-layer approach as elsewhere in the
// workspace: abstraction (trait) → facade (enum) → real implementation.

mod filesystem;

pub(crate) use filesystem::*;

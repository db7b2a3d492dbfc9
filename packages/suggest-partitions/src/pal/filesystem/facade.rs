use std::io;
use std::path::Path;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::MockFilesystem;
use crate::pal::{BuildTargetFilesystem, Filesystem};

/// Facade over filesystem operations, dispatching to real or mock implementation.
///
/// In production, this always uses `BuildTargetFilesystem`. In tests, it can also wrap a
/// `MockFilesystem` for controlled test scenarios.
#[derive(Clone)]
pub(crate) enum FilesystemFacade {
    /// Real filesystem implementation.
    Target(&'static BuildTargetFilesystem),

    /// Mock filesystem for testing.
    #[cfg(test)]
    Mock(Arc<MockFilesystem>),
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl std::fmt::Debug for FilesystemFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(_) => f.debug_struct("FilesystemFacade::Target").finish(),
            #[cfg(test)]
            Self::Mock(_) => f.debug_struct("FilesystemFacade::Mock").finish(),
        }
    }
}

static BUILD_TARGET_FILESYSTEM: BuildTargetFilesystem = BuildTargetFilesystem;

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl FilesystemFacade {
    /// Creates a facade using the real filesystem.
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_FILESYSTEM)
    }

    /// Creates a facade wrapping a mock filesystem (test builds only).
    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockFilesystem) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Pass-through layer - not worth testing on its own.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Filesystem for FilesystemFacade {
    fn read_proc_cpuinfo(&self) -> io::Result<String> {
        match self {
            Self::Target(fs) => fs.read_proc_cpuinfo(),
            #[cfg(test)]
            Self::Mock(mock) => mock.read_proc_cpuinfo(),
        }
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        match self {
            Self::Target(fs) => fs.read_file(path),
            #[cfg(test)]
            Self::Mock(mock) => mock.read_file(path),
        }
    }

    fn read_stdin(&self) -> io::Result<String> {
        match self {
            Self::Target(fs) => fs.read_stdin(),
            #[cfg(test)]
            Self::Mock(mock) => mock.read_stdin(),
        }
    }
}

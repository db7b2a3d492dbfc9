use std::fmt::Debug;
use std::io;
use std::path::Path;

/// Abstraction over the sources we read processor information from.
///
/// All I/O is synchronous and blocking. Every operation reads the entire source to completion,
/// as the input is small and we scan it in a single pass.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockFilesystem`.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Filesystem: Debug + Send + Sync + 'static {
    /// Gets the contents of the `/proc/cpuinfo` file.
    ///
    /// This is a plaintext file with "key    : value" pairs, blocks separated by empty lines.
    fn read_proc_cpuinfo(&self) -> io::Result<String>;

    /// Gets the contents of an arbitrary file, typically a saved copy of `/proc/cpuinfo`.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Reads standard input until end of stream.
    fn read_stdin(&self) -> io::Result<String>;
}

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::pal::Filesystem;

/// The filesystem of the real operating system that the build is targeting.
///
/// You would only use a different filesystem in unit tests that need to mock it.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetFilesystem;

// Trivial forwarder to system APIs, exercised by the integration tests.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Filesystem for BuildTargetFilesystem {
    fn read_proc_cpuinfo(&self) -> io::Result<String> {
        fs::read_to_string("/proc/cpuinfo")
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_stdin(&self) -> io::Result<String> {
        let mut contents = String::new();
        io::stdin().lock().read_to_string(&mut contents)?;
        Ok(contents)
    }
}

//! System capability probing.
//!
//! Everything configure learns about the host goes through [`SystemProbe`]:
//! the host identifier, `uname`, text files under `/etc` and `/proc`,
//! helper scripts such as `sdl2-config`, pkg-config, and compile tests for
//! libraries and headers. [`HostProbe`] talks to the real system.

mod host;

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::flags::FlagSet;

pub use host::{host_identifier, HostProbe};

/// Flags reported by pkg-config for one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PkgConfigFlags {
    /// `pkg-config --cflags`
    pub cflags: Vec<String>,
    /// `pkg-config --libs`
    pub libs: Vec<String>,
}

/// Access to the host system.
///
/// `Err` means a tool could not be run at all; a library or package that is
/// simply absent is reported as `Ok(None)` or `Ok(false)`.
pub trait SystemProbe {
    /// Platform identifier of the host, e.g. `x86_64-linux` or `x64-mingw32`.
    fn host_identifier(&self) -> String;

    /// Operating system name as reported by `uname`.
    fn os_name(&self) -> Result<String>;

    /// Kernel release as reported by `uname -r`.
    fn kernel_release(&self) -> Result<String>;

    /// Location of an external tool, `None` when it is not installed.
    fn locate(&self, tool: &str) -> Option<PathBuf>;

    /// Contents of a text file, `None` when unreadable.
    fn read_text(&self, path: &Path) -> Option<String>;

    /// Trimmed stdout of a helper program, `None` when it is missing or fails.
    fn helper(&self, program: &str, args: &[&str]) -> Result<Option<String>>;

    /// Flags of a pkg-config package, `None` when the package is unknown.
    fn pkg_config(&self, package: &str) -> Result<Option<PkgConfigFlags>>;

    /// Whether a program calling `symbol` links against `library` with the
    /// flags accumulated so far.
    fn have_library(&self, library: &str, symbol: Option<&str>, flags: &FlagSet) -> Result<bool>;

    /// Whether `header` can be included with the flags accumulated so far.
    fn have_header(&self, header: &str, flags: &FlagSet) -> Result<bool>;
}

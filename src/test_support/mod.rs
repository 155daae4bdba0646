//! Test utilities and mocks for extconf unit tests.
//!
//! [`MockProbe`] stands in for the host system: it answers `uname`,
//! pkg-config, helper scripts and compile tests from tables and records
//! every query so tests can assert on probe order.
//!
//! # Example
//!
//! ```rust,ignore
//! use extconf::test_support::MockProbe;
//!
//! #[test]
//! fn test_example() {
//!     let probe = MockProbe::linux().without_package("sdl2");
//!     let profile = detect_platform(&probe);
//!     assert!(resolve_flags(&profile, &probe, &ResolveOptions::default()).is_err());
//!     assert!(probe.called("pkg-config sdl2"));
//! }
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::flags::{split_flags, FlagSet};
use crate::probe::{PkgConfigFlags, SystemProbe};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Table-driven [`SystemProbe`].
#[derive(Debug, Default)]
pub struct MockProbe {
    host: String,
    os_name: Option<String>,
    kernel_release: String,
    files: HashMap<PathBuf, String>,
    tools: HashMap<String, PathBuf>,
    helpers: HashMap<String, String>,
    packages: HashMap<String, PkgConfigFlags>,
    pkg_config_broken: bool,
    libraries: HashSet<String>,
    headers: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockProbe {
    /// A desktop Linux host with every Gosu dependency installed.
    pub fn linux() -> Self {
        MockProbe {
            host: "x86_64-linux".to_string(),
            os_name: Some("Linux".to_string()),
            kernel_release: "6.1.0-18-amd64".to_string(),
            ..Default::default()
        }
        .with_tool("cc", "/usr/bin/cc")
        .with_tool("pkg-config", "/usr/bin/pkg-config")
        .with_package("gl", "", "-lGL")
        .with_package("sdl2", "-I/usr/include/SDL2 -D_REENTRANT", "-lSDL2")
        .with_package(
            "pangoft2",
            "-I/usr/include/pango-1.0 -I/usr/include/glib-2.0 -pthread",
            "-lpangoft2-1.0 -lpango-1.0 -lglib-2.0",
        )
        .with_package("vorbisfile", "", "-lvorbisfile -lvorbis -logg")
        .with_package("openal", "", "-lopenal")
        .with_package("sndfile", "", "-lsndfile")
        .with_library("SDL2_ttf")
        .with_library("openal")
        .with_header("SDL_ttf.h")
        .with_header("AL/al.h")
    }

    /// A macOS host with the given Darwin kernel release and SDL2 installed.
    pub fn macos(kernel_release: &str) -> Self {
        MockProbe {
            host: "x86_64-darwin".to_string(),
            os_name: Some("Darwin".to_string()),
            kernel_release: kernel_release.to_string(),
            ..Default::default()
        }
        .with_tool("cc", "/usr/bin/cc")
        .with_tool("sdl2-config", "/usr/local/bin/sdl2-config")
        .with_helper(
            "sdl2-config",
            &["--cflags"],
            "-I/usr/local/include/SDL2 -D_THREAD_SAFE",
        )
        .with_helper("sdl2-config", &["--libs"], "-L/usr/local/lib -lSDL2")
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_os_name(mut self, os_name: impl Into<String>) -> Self {
        self.os_name = Some(os_name.into());
        self
    }

    /// Make `uname` fail.
    pub fn with_failing_uname(mut self) -> Self {
        self.os_name = None;
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with_tool(mut self, tool: &str, path: impl Into<PathBuf>) -> Self {
        self.tools.insert(tool.to_string(), path.into());
        self
    }

    pub fn with_helper(mut self, program: &str, args: &[&str], output: &str) -> Self {
        self.helpers
            .insert(command_key(program, args), output.to_string());
        self
    }

    /// Remove a helper program entirely.
    pub fn without_helper(mut self, program: &str) -> Self {
        let prefix = format!("{} ", program);
        self.helpers
            .retain(|key, _| key != program && !key.starts_with(&prefix));
        self.tools.remove(program);
        self
    }

    pub fn with_package(mut self, name: &str, cflags: &str, libs: &str) -> Self {
        self.packages.insert(
            name.to_string(),
            PkgConfigFlags {
                cflags: split_flags(cflags),
                libs: split_flags(libs),
            },
        );
        self
    }

    pub fn without_package(mut self, name: &str) -> Self {
        self.packages.remove(name);
        self
    }

    /// Make every pkg-config query fail as if the tool could not run.
    pub fn with_broken_pkg_config(mut self) -> Self {
        self.pkg_config_broken = true;
        self.tools.remove("pkg-config");
        self
    }

    pub fn with_library(mut self, name: &str) -> Self {
        self.libraries.insert(name.to_string());
        self
    }

    pub fn without_library(mut self, name: &str) -> Self {
        self.libraries.remove(name);
        self
    }

    pub fn with_header(mut self, name: &str) -> Self {
        self.headers.insert(name.to_string());
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(name);
        self
    }

    /// Every recorded query, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Whether any recorded query starts with `prefix`.
    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn command_key(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

impl SystemProbe for MockProbe {
    fn host_identifier(&self) -> String {
        self.host.clone()
    }

    fn os_name(&self) -> Result<String> {
        self.record("uname".to_string());
        match &self.os_name {
            Some(name) => Ok(name.clone()),
            None => bail!("uname: command not found"),
        }
    }

    fn kernel_release(&self) -> Result<String> {
        self.record("uname -r".to_string());
        if self.os_name.is_none() {
            bail!("uname: command not found");
        }
        Ok(self.kernel_release.clone())
    }

    fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.tools.get(tool).cloned()
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn helper(&self, program: &str, args: &[&str]) -> Result<Option<String>> {
        let key = command_key(program, args);
        self.record(key.clone());
        Ok(self.helpers.get(&key).cloned())
    }

    fn pkg_config(&self, package: &str) -> Result<Option<PkgConfigFlags>> {
        self.record(format!("pkg-config {}", package));
        if self.pkg_config_broken {
            bail!("pkg-config not found in PATH");
        }
        Ok(self.packages.get(package).cloned())
    }

    fn have_library(&self, library: &str, _symbol: Option<&str>, _flags: &FlagSet) -> Result<bool> {
        self.record(format!("have_library {}", library));
        Ok(self.libraries.contains(library))
    }

    fn have_header(&self, header: &str, _flags: &FlagSet) -> Result<bool> {
        self.record(format!("have_header {}", header));
        Ok(self.headers.contains(header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let probe = MockProbe::linux();
        probe.os_name().unwrap();
        probe.pkg_config("sdl2").unwrap();
        probe.helper("sdl2-config", &["--cflags"]).unwrap();

        assert_eq!(
            probe.calls(),
            vec!["uname", "pkg-config sdl2", "sdl2-config --cflags"]
        );
        assert!(probe.called("pkg-config"));
    }

    #[test]
    fn test_without_helper_removes_tool() {
        let probe = MockProbe::macos("14.0.0").without_helper("sdl2-config");
        assert!(probe.locate("sdl2-config").is_none());
        assert!(probe.helper("sdl2-config", &["--libs"]).unwrap().is_none());
    }

    #[test]
    fn test_failing_uname() {
        let probe = MockProbe::linux().with_failing_uname();
        assert!(probe.os_name().is_err());
        assert!(probe.kernel_release().is_err());
    }
}

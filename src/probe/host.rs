//! Probing the real host through external tools.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::flags::{split_flags, FlagSet};
use crate::util::process::{find_c_compiler, find_executable, find_pkg_config, ProcessBuilder};

use super::{PkgConfigFlags, SystemProbe};

/// Platform identifier of the running host.
///
/// Windows hosts are named the way pre-built packages are (`x64-mingw32`,
/// `x64-mswin64`); other hosts are `<arch>-<os>`.
pub fn host_identifier() -> String {
    let arch = std::env::consts::ARCH;
    if cfg!(target_os = "windows") {
        let arch = if arch == "x86_64" { "x64" } else { "i386" };
        if cfg!(target_env = "gnu") {
            format!("{}-mingw32", arch)
        } else {
            format!("{}-mswin64", arch)
        }
    } else {
        format!("{}-{}", arch, std::env::consts::OS)
    }
}

/// [`SystemProbe`] backed by `uname`, pkg-config and the C compiler.
#[derive(Debug, Clone)]
pub struct HostProbe {
    host: String,
    cc: Option<PathBuf>,
    pkg_config: Option<PathBuf>,
}

impl HostProbe {
    /// Probe the running host.
    pub fn new() -> Self {
        HostProbe {
            host: host_identifier(),
            cc: find_c_compiler(),
            pkg_config: find_pkg_config(),
        }
    }

    /// Override the host identifier, e.g. to check the Windows redirect.
    pub fn with_host_identifier(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    fn require_cc(&self) -> Result<&Path> {
        match self.cc.as_deref() {
            Some(cc) => Ok(cc),
            None => bail!(
                "no C compiler found\n\
                 Set the CC environment variable or install cc, gcc, or clang."
            ),
        }
    }

    /// Compile `program` in a scratch directory with the given arguments.
    fn try_compile(&self, program: &str, args: &[String]) -> Result<bool> {
        let cc = self.require_cc()?;
        let dir = tempfile::tempdir().context("failed to create scratch directory")?;
        let source = dir.path().join("conftest.c");
        std::fs::write(&source, program)
            .with_context(|| format!("failed to write {}", source.display()))?;

        let output = ProcessBuilder::new(cc)
            .arg(&source)
            .args(args)
            .cwd(dir.path())
            .exec()?;

        if !output.status.success() {
            tracing::debug!(
                "test program failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output.status.success())
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for HostProbe {
    fn host_identifier(&self) -> String {
        self.host.clone()
    }

    fn os_name(&self) -> Result<String> {
        ProcessBuilder::new("uname").read_stdout()
    }

    fn kernel_release(&self) -> Result<String> {
        ProcessBuilder::new("uname").arg("-r").read_stdout()
    }

    fn locate(&self, tool: &str) -> Option<PathBuf> {
        match tool {
            "cc" => self.cc.clone(),
            "pkg-config" => self.pkg_config.clone(),
            _ => find_executable(tool),
        }
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn helper(&self, program: &str, args: &[&str]) -> Result<Option<String>> {
        let Some(path) = find_executable(program) else {
            tracing::debug!("`{}` not found in PATH", program);
            return Ok(None);
        };

        let output = ProcessBuilder::new(path).args(args).exec()?;
        if !output.status.success() {
            tracing::debug!(
                "`{} {}` failed: {}",
                program,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    fn pkg_config(&self, package: &str) -> Result<Option<PkgConfigFlags>> {
        let Some(pkg_config) = self.pkg_config.as_deref() else {
            bail!("pkg-config not found in PATH");
        };

        let exists = ProcessBuilder::new(pkg_config)
            .args(["--exists", package])
            .exec()?;
        if !exists.status.success() {
            tracing::debug!("pkg-config has no package `{}`", package);
            return Ok(None);
        }

        let cflags = ProcessBuilder::new(pkg_config)
            .args(["--cflags", package])
            .read_stdout()?;
        let libs = ProcessBuilder::new(pkg_config)
            .args(["--libs", package])
            .read_stdout()?;

        tracing::debug!("pkg-config {}: cflags `{}`, libs `{}`", package, cflags, libs);
        Ok(Some(PkgConfigFlags {
            cflags: split_flags(&cflags),
            libs: split_flags(&libs),
        }))
    }

    fn have_library(&self, library: &str, symbol: Option<&str>, flags: &FlagSet) -> Result<bool> {
        let program = match symbol {
            Some(symbol) => format!(
                "char {symbol}(void);\nint main(void) {{ return (int){symbol}(); }}\n"
            ),
            None => "int main(void) { return 0; }\n".to_string(),
        };

        let mut args = flags.compile_args();
        args.extend(["-o".to_string(), "conftest".to_string()]);
        args.extend(flags.link_args());
        args.push(format!("-l{}", library));

        let found = self.try_compile(&program, &args)?;
        tracing::debug!("library `{}` ({:?}): {}", library, symbol, found);
        Ok(found)
    }

    fn have_header(&self, header: &str, flags: &FlagSet) -> Result<bool> {
        let program = format!("#include <{}>\n", header);

        let mut args = flags.compile_args();
        args.extend(["-E".to_string(), "-o".to_string(), "conftest.i".to_string()]);

        let found = self.try_compile(&program, &args)?;
        tracing::debug!("header `{}`: {}", header, found);
        Ok(found)
    }
}

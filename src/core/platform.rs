//! Host platform detection.
//!
//! Detection order matters: Windows identifiers are rejected from the host
//! identifier alone, before any external command runs. Everything that is not
//! Darwin is treated as Linux.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::core::errors::ConfigureError;
use crate::probe::SystemProbe;

/// Host identifiers that denote a Windows build.
static WINDOWS_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mswin$|mswin64|mingw32|mingw64|win32-|-win32|windows")
        .expect("windows identifier pattern is valid")
});

/// Text file naming the distribution.
pub const OS_ISSUE_PATH: &str = "/etc/issue";

/// Text file describing the CPU.
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// First Darwin kernel release that gets C++11 and libc++ (OS X 10.9).
pub const MIN_CXX11_KERNEL: u32 = 13;

/// The build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    /// Raspberry Pi class boards with the Broadcom GPU userland.
    LinuxEmbedded,
}

impl Platform {
    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::LinuxEmbedded => "linux-embedded",
        }
    }

    /// Whether this is a Linux variant.
    pub fn is_linux(&self) -> bool {
        matches!(self, Platform::Linux | Platform::LinuxEmbedded)
    }

    /// File extension of the loadable module produced by the makefile.
    pub fn module_extension(&self) -> &'static str {
        match self {
            Platform::Windows => "dll",
            Platform::MacOs => "bundle",
            Platform::Linux | Platform::LinuxEmbedded => "so",
        }
    }

    /// Page listing the system libraries to install.
    pub fn getting_started_url(&self) -> Option<&'static str> {
        match self {
            Platform::Windows => None,
            Platform::MacOs => Some("https://github.com/jlnr/gosu/wiki/Getting-Started-on-OS-X"),
            Platform::Linux | Platform::LinuxEmbedded => {
                Some("https://github.com/jlnr/gosu/wiki/Getting-Started-on-Linux")
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The detected target environment. Immutable once detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    platform: Platform,
    host: String,
    kernel_release: String,
}

impl PlatformProfile {
    pub fn new(platform: Platform, host: impl Into<String>, kernel_release: impl Into<String>) -> Self {
        PlatformProfile {
            platform,
            host: host.into(),
            kernel_release: kernel_release.into(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Host identifier the profile was detected from.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Raw kernel release string, e.g. `14.5.0`.
    pub fn kernel_release(&self) -> &str {
        &self.kernel_release
    }

    /// Leading integer of the kernel release; 0 when there is none.
    pub fn kernel_major(&self) -> u32 {
        let digits: String = self
            .kernel_release
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap_or(0)
    }

    /// Whether the C++11 / libc++ flag pair applies.
    pub fn wants_cxx11(&self) -> bool {
        self.platform == Platform::MacOs && self.kernel_major() >= MIN_CXX11_KERNEL
    }

    /// Abort on Windows with a redirect to the pre-built package.
    ///
    /// `redirect_template` may contain `{name}` and `{platform}`.
    pub fn ensure_supported(&self, name: &str, redirect_template: &str) -> Result<(), ConfigureError> {
        match self.platform {
            Platform::Windows => {
                let redirect = redirect_template
                    .replace("{name}", name)
                    .replace("{platform}", windows_prebuilt_platform(&self.host));
                Err(ConfigureError::UnsupportedPlatform {
                    name: name.to_string(),
                    host: self.host.clone(),
                    redirect: Some(redirect),
                })
            }
            Platform::MacOs | Platform::Linux | Platform::LinuxEmbedded => Ok(()),
        }
    }

    /// Error for operations that never run on an unsupported profile.
    pub(crate) fn unsupported(&self, name: &str) -> ConfigureError {
        ConfigureError::UnsupportedPlatform {
            name: name.to_string(),
            host: self.host.clone(),
            redirect: None,
        }
    }
}

/// Whether a host identifier denotes Windows.
pub fn is_windows_identifier(host: &str) -> bool {
    WINDOWS_IDENTIFIER.is_match(host)
}

/// Pre-built package platform matching a Windows host identifier.
pub fn windows_prebuilt_platform(host: &str) -> &'static str {
    if host.starts_with("x64-") || host.starts_with("x86_64") {
        "x64-mingw32"
    } else {
        "i386-mingw32"
    }
}

/// Detect the platform profile of the host described by `probe`.
pub fn detect_platform(probe: &dyn SystemProbe) -> PlatformProfile {
    let host = probe.host_identifier();
    if is_windows_identifier(&host) {
        tracing::debug!("host `{}` is a Windows identifier", host);
        return PlatformProfile::new(Platform::Windows, host, "");
    }

    let os = probe.os_name().unwrap_or_else(|e| {
        tracing::warn!("could not determine OS name: {:#}", e);
        String::new()
    });
    let kernel_release = probe.kernel_release().unwrap_or_else(|e| {
        tracing::warn!("could not determine kernel release: {:#}", e);
        String::new()
    });

    let platform = if os == "Darwin" {
        Platform::MacOs
    } else {
        if os != "Linux" {
            tracing::warn!(
                "unrecognized OS `{}`, configuring as Linux",
                if os.is_empty() { "<unknown>" } else { &os }
            );
        }
        if is_embedded_board(probe) {
            Platform::LinuxEmbedded
        } else {
            Platform::Linux
        }
    };

    tracing::debug!(
        "detected platform {} (os `{}`, kernel `{}`)",
        platform,
        os,
        kernel_release
    );
    PlatformProfile::new(platform, host, kernel_release)
}

fn is_embedded_board(probe: &dyn SystemProbe) -> bool {
    let issue_matches = probe
        .read_text(Path::new(OS_ISSUE_PATH))
        .is_some_and(|text| text.contains("Raspbian"));

    issue_matches
        || probe
            .read_text(Path::new(CPUINFO_PATH))
            .is_some_and(|text| text.contains("BCM2708"))
}

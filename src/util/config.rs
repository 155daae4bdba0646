//! Configuration file support for extconf.
//!
//! extconf reads two configuration files with the same format:
//! - Global: `~/.extconf/config.toml` - User-wide defaults
//! - Project: `extconf.toml` at the project root - Project-specific settings
//!
//! Project config takes precedence over global config, and command-line
//! options take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::source_set::SourceLists;

/// File name of the project manifest.
pub const MANIFEST_NAME: &str = "extconf.toml";

/// Library name used when the manifest does not name one.
pub const DEFAULT_PACKAGE_NAME: &str = "gosu";

/// Source directory, relative to the project root.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Frameworks linked on macOS.
pub const DEFAULT_FRAMEWORKS: &[&str] = &[
    "AppKit",
    "ApplicationServices",
    "AudioToolbox",
    "Carbon",
    "ForceFeedback",
    "Foundation",
    "IOKit",
    "OpenAL",
    "OpenGL",
];

/// Libraries linked as static archives when static dependencies are enabled.
pub const DEFAULT_STATIC_LIBRARIES: &[&str] = &["SDL2"];

/// Install prefix holding the static archives.
pub const DEFAULT_STATIC_PREFIX: &str = "/usr/local";

/// Command suggested to Windows users. `{name}` and `{platform}` are substituted.
pub const DEFAULT_WINDOWS_REDIRECT: &str = "gem install {name} --platform={platform}";

/// extconf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package identity
    pub package: PackageConfig,

    /// Source lists
    pub sources: SourcesConfig,

    /// macOS link settings
    pub macos: MacosConfig,

    /// Build settings
    pub build: BuildConfig,
}

/// Package identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Name of the library; also the makefile target
    pub name: Option<String>,
}

/// Source lists, relative to the source root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Source directory, relative to the project root
    pub root: Option<PathBuf>,

    /// Sources compiled on every platform
    pub base: Option<Vec<PathBuf>>,

    /// Sources compiled only on macOS
    pub macos: Option<Vec<PathBuf>>,

    /// Sources compiled only on Linux
    pub linux: Option<Vec<PathBuf>>,
}

/// macOS link settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MacosConfig {
    /// Frameworks passed as `-framework <name>`
    pub frameworks: Option<Vec<String>>,

    /// Libraries linked from `<static-prefix>/lib/lib<name>.a`
    pub static_libraries: Option<Vec<String>>,

    /// Install prefix of the static archives
    pub static_prefix: Option<PathBuf>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Link dependencies statically where supported
    pub static_dependencies: Option<bool>,

    /// Version of the makefile generator consuming our output
    pub toolchain_version: Option<String>,

    /// Directory receiving the shims and the makefile
    pub out_dir: Option<PathBuf>,

    /// Command suggested to Windows users
    pub windows_redirect: Option<String>,

    /// Additional C compiler flags
    pub cflags: Vec<String>,

    /// Additional C++ compiler flags
    pub cxxflags: Vec<String>,

    /// Additional linker flags
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = crate::util::fs::read_to_string(path)?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.package.name.is_some() {
            self.package.name = other.package.name;
        }

        if other.sources.root.is_some() {
            self.sources.root = other.sources.root;
        }
        if other.sources.base.is_some() {
            self.sources.base = other.sources.base;
        }
        if other.sources.macos.is_some() {
            self.sources.macos = other.sources.macos;
        }
        if other.sources.linux.is_some() {
            self.sources.linux = other.sources.linux;
        }

        if other.macos.frameworks.is_some() {
            self.macos.frameworks = other.macos.frameworks;
        }
        if other.macos.static_libraries.is_some() {
            self.macos.static_libraries = other.macos.static_libraries;
        }
        if other.macos.static_prefix.is_some() {
            self.macos.static_prefix = other.macos.static_prefix;
        }

        if other.build.static_dependencies.is_some() {
            self.build.static_dependencies = other.build.static_dependencies;
        }
        if other.build.toolchain_version.is_some() {
            self.build.toolchain_version = other.build.toolchain_version;
        }
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.windows_redirect.is_some() {
            self.build.windows_redirect = other.build.windows_redirect;
        }
        if !other.build.cflags.is_empty() {
            self.build.cflags = other.build.cflags;
        }
        if !other.build.cxxflags.is_empty() {
            self.build.cxxflags = other.build.cxxflags;
        }
        if !other.build.ldflags.is_empty() {
            self.build.ldflags = other.build.ldflags;
        }
    }

    /// Library name, defaulting to `gosu`.
    pub fn package_name(&self) -> &str {
        self.package.name.as_deref().unwrap_or(DEFAULT_PACKAGE_NAME)
    }

    /// Source directory relative to the project root.
    pub fn source_root(&self) -> PathBuf {
        self.sources
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_ROOT))
    }

    /// Source lists with built-in defaults for any list not configured.
    pub fn source_lists(&self) -> SourceLists {
        let defaults = SourceLists::default();
        SourceLists {
            base: self.sources.base.clone().unwrap_or(defaults.base),
            macos: self.sources.macos.clone().unwrap_or(defaults.macos),
            linux: self.sources.linux.clone().unwrap_or(defaults.linux),
        }
    }

    /// macOS frameworks to link.
    pub fn frameworks(&self) -> Vec<String> {
        self.macos
            .frameworks
            .clone()
            .unwrap_or_else(|| DEFAULT_FRAMEWORKS.iter().map(|s| s.to_string()).collect())
    }

    /// Libraries linked as static archives on macOS.
    pub fn static_libraries(&self) -> Vec<String> {
        self.macos.static_libraries.clone().unwrap_or_else(|| {
            DEFAULT_STATIC_LIBRARIES
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    /// Install prefix of the static archives.
    pub fn static_prefix(&self) -> PathBuf {
        self.macos
            .static_prefix
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_PREFIX))
    }

    /// Whether dependencies are linked statically, off by default.
    pub fn static_dependencies(&self) -> bool {
        self.build.static_dependencies.unwrap_or(false)
    }

    /// Redirect command template for Windows users.
    pub fn windows_redirect(&self) -> &str {
        self.build
            .windows_redirect
            .as_deref()
            .unwrap_or(DEFAULT_WINDOWS_REDIRECT)
    }

    /// Output directory relative to the project root, `ext/<name>` by default.
    pub fn out_dir(&self) -> PathBuf {
        self.build
            .out_dir
            .clone()
            .unwrap_or_else(|| Path::new("ext").join(self.package_name()))
    }

    /// Parse the configured toolchain version.
    ///
    /// Accepts partial versions such as `2.7` by padding missing components.
    pub fn toolchain_version(&self) -> Result<Option<Version>> {
        self.build
            .toolchain_version
            .as_deref()
            .map(parse_toolchain_version)
            .transpose()
    }
}

/// Parse a version string, padding `2` or `2.7` to a full semver triple.
///
/// A patchlevel suffix such as `-p247` is dropped; it does not order the
/// release below its `major.minor.patch`.
pub fn parse_toolchain_version(s: &str) -> Result<Version> {
    let trimmed = strip_patchlevel(s.trim());
    let padded = match trimmed.matches('.').count() {
        0 => format!("{}.0.0", trimmed),
        1 => format!("{}.0", trimmed),
        _ => trimmed.to_string(),
    };
    Version::parse(&padded).with_context(|| format!("invalid toolchain version `{}`", s))
}

fn strip_patchlevel(s: &str) -> &str {
    match s.rsplit_once("-p") {
        Some((release, level))
            if !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()) =>
        {
            release
        }
        _ => s,
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project manifest (extconf.toml)
/// 2. Global config (~/.extconf/config.toml)
/// 3. Defaults
///
/// A broken global config only warns; a broken project manifest is an error.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load(project_path)?;
        config.merge(project);
    }

    Ok(config)
}

/// Get the global extconf config directory (~/.extconf).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".extconf"))
}

//! Flag resolution.
//!
//! Resolution is a fixed, order-sensitive sequence of steps folded over a
//! `FlagSet`: base flags, the platform branch, then the toolchain workaround.
//! Every probe is recorded in a `DependencyReport`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use semver::Version;

use crate::core::dependency::{DependencyReport, ProbeMethod, ProbeOutcome, Requirement};
use crate::core::errors::ConfigureError;
use crate::core::flags::{header_define, FlagSet, FlagVar, ToolchainDefaults};
use crate::core::platform::{Platform, PlatformProfile};
use crate::probe::SystemProbe;
use crate::util::config::{
    Config, DEFAULT_FRAMEWORKS, DEFAULT_PACKAGE_NAME, DEFAULT_STATIC_LIBRARIES,
    DEFAULT_STATIC_PREFIX,
};
use crate::util::fs::{relative_path, to_slash};

/// Silences the library's internal deprecation warnings.
pub const DEPRECATION_DEFINE: &str = "-DGOSU_DEPRECATED=";

/// SDL2 helper script used on macOS.
pub const SDL2_CONFIG: &str = "sdl2-config";

/// pkg-config package providing desktop OpenGL.
pub const GL_PACKAGE: &str = "gl";

/// pkg-config packages required on every Linux variant, in probe order.
pub const LINUX_PACKAGES: &[&str] = &["sdl2", "pangoft2", "vorbisfile", "openal", "sndfile"];

/// Broadcom GPU userland include directories.
pub const EMBEDDED_INCLUDE_DIRS: &[&str] = &["/opt/vc/include/GLES", "/opt/vc/include"];

/// Broadcom GPU userland library directory.
pub const EMBEDDED_LIB_DIR: &str = "/opt/vc/lib";

/// OpenGL ES library linked on embedded boards.
pub const EMBEDDED_GLES_LIB: &str = "GLESv1_CM";

/// Makefile generators from this version on ignore the C++-only flags.
pub const CXXFLAGS_WORKAROUND_SINCE: Version = Version::new(2, 0, 0);

/// Whether configure aborts on the first missing required dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Abort on the first missing required dependency.
    FailFast,
    /// Record every outcome and keep going.
    Collect,
}

/// Inputs to flag resolution besides the platform and the probe.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Library name
    pub name: String,
    /// Project root, relative to the output directory
    pub project_include: String,
    /// Source root, relative to the output directory
    pub source_include: String,
    /// Flags inherited from the environment and configuration
    pub defaults: ToolchainDefaults,
    /// Link SDL2 and friends from static archives on macOS
    pub static_dependencies: bool,
    pub static_prefix: PathBuf,
    pub static_libraries: Vec<String>,
    pub frameworks: Vec<String>,
    /// Version of the consuming makefile generator; `None` means current
    pub toolchain_version: Option<Version>,
}

impl ResolveOptions {
    /// Options for the conventional `ext/<name>` layout with built-in defaults.
    pub fn new(name: impl Into<String>) -> Self {
        ResolveOptions {
            name: name.into(),
            project_include: "../..".to_string(),
            source_include: "../../src".to_string(),
            defaults: ToolchainDefaults::default(),
            static_dependencies: false,
            static_prefix: PathBuf::from(DEFAULT_STATIC_PREFIX),
            static_libraries: DEFAULT_STATIC_LIBRARIES.iter().map(|s| s.to_string()).collect(),
            frameworks: DEFAULT_FRAMEWORKS.iter().map(|s| s.to_string()).collect(),
            toolchain_version: None,
        }
    }

    /// Options from merged configuration and resolved directories.
    pub fn from_config(
        config: &Config,
        project_root: &Path,
        source_root: &Path,
        output_dir: &Path,
    ) -> Result<Self> {
        Ok(ResolveOptions {
            name: config.package_name().to_string(),
            project_include: include_dir(output_dir, project_root),
            source_include: include_dir(output_dir, source_root),
            defaults: ToolchainDefaults::from_env(
                &config.build.cflags,
                &config.build.cxxflags,
                &config.build.ldflags,
            ),
            static_dependencies: config.static_dependencies(),
            static_prefix: config.static_prefix(),
            static_libraries: config.static_libraries(),
            frameworks: config.frameworks(),
            toolchain_version: config.toolchain_version()?,
        })
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PACKAGE_NAME)
    }
}

/// Path of `to` as seen from `from`, with forward slashes.
pub fn include_dir(from: &Path, to: &Path) -> String {
    let rel = relative_path(from, to);
    if rel.as_os_str().is_empty() {
        ".".to_string()
    } else {
        to_slash(&rel)
    }
}

/// Whether the C flags must be copied into the C++ flags.
pub fn needs_cxxflags_workaround(version: Option<&Version>) -> bool {
    version.map_or(true, |v| *v >= CXXFLAGS_WORKAROUND_SINCE)
}

/// Resolved flags plus the outcome of every probe.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub flags: FlagSet,
    pub report: DependencyReport,
}

/// Resolve flags, aborting on the first missing required dependency.
pub fn resolve_flags(
    profile: &PlatformProfile,
    probe: &dyn SystemProbe,
    options: &ResolveOptions,
) -> Result<Resolution, ConfigureError> {
    FlagResolver::new(probe, options, ProbeMode::FailFast).resolve(profile)
}

/// Runs the resolution steps against a probe.
pub struct FlagResolver<'a> {
    probe: &'a dyn SystemProbe,
    options: &'a ResolveOptions,
    mode: ProbeMode,
    report: DependencyReport,
}

impl<'a> FlagResolver<'a> {
    pub fn new(probe: &'a dyn SystemProbe, options: &'a ResolveOptions, mode: ProbeMode) -> Self {
        FlagResolver {
            probe,
            options,
            mode,
            report: DependencyReport::new(),
        }
    }

    /// Run every step for `profile`.
    pub fn resolve(mut self, profile: &PlatformProfile) -> Result<Resolution, ConfigureError> {
        let flags = FlagSet::from_defaults(&self.options.defaults);
        let flags = self.base_flags(flags);

        let flags = match profile.platform() {
            Platform::MacOs => self.macos_flags(flags, profile)?,
            Platform::Linux => {
                let flags = self.probe_package(flags, GL_PACKAGE)?;
                self.linux_flags(flags)?
            }
            Platform::LinuxEmbedded => {
                let flags = self.embedded_flags(flags);
                self.linux_flags(flags)?
            }
            Platform::Windows => return Err(profile.unsupported(&self.options.name)),
        };

        let flags = if needs_cxxflags_workaround(self.options.toolchain_version.as_ref()) {
            tracing::debug!("copying CFLAGS into CXXFLAGS");
            flags.with_merged_cxxflags()
        } else {
            flags
        };

        Ok(Resolution {
            flags,
            report: self.report,
        })
    }

    fn base_flags(&self, flags: FlagSet) -> FlagSet {
        flags
            .append(FlagVar::CFlags, "base", [DEPRECATION_DEFINE])
            .append(
                FlagVar::IncFlags,
                "base",
                [
                    format!("-I{}", self.options.project_include),
                    format!("-I{}", self.options.source_include),
                ],
            )
    }

    fn macos_flags(
        &mut self,
        flags: FlagSet,
        profile: &PlatformProfile,
    ) -> Result<FlagSet, ConfigureError> {
        // Every unit is compiled as Objective-C(++) because the generated
        // makefile only knows .c and .cpp rules.
        let flags = flags
            .append(FlagVar::CFlags, "macos", ["-x", "objective-c", "-DNDEBUG"])
            .append(
                FlagVar::CxxFlags,
                "macos",
                [
                    "-x",
                    "objective-c++",
                    "-U_GLIBCXX_DEBUG",
                    "-U_GLIBCXX_DEBUG_PEDANTIC",
                ],
            );

        let flags = if profile.wants_cxx11() {
            // libc++ must be explicit or we compile against libstdc++ and
            // link against libc++.
            flags.append(FlagVar::CxxFlags, "macos", ["-std=gnu++11", "-stdlib=libc++"])
        } else {
            flags
        };

        let sdl2_cflags = self.sdl2_config("--cflags")?;
        let have_sdl2_config = sdl2_cflags.is_some();
        let flags = match sdl2_cflags {
            Some(cflags) => flags.append_str(FlagVar::CxxFlags, SDL2_CONFIG, &cflags),
            None => flags,
        };

        let flags = flags.append(FlagVar::LdFlags, "macos", ["-liconv"]);

        let flags = if self.options.static_dependencies {
            let archives: Vec<String> = self
                .options
                .static_libraries
                .iter()
                .map(|lib| {
                    to_slash(
                        &self
                            .options
                            .static_prefix
                            .join("lib")
                            .join(format!("lib{}.a", lib)),
                    )
                })
                .collect();
            flags.append(FlagVar::LdFlags, "static dependencies", archives)
        } else if have_sdl2_config {
            match self.sdl2_config("--libs")? {
                Some(libs) => flags.append_str(FlagVar::LdFlags, SDL2_CONFIG, &libs),
                None => flags,
            }
        } else {
            flags
        };

        if self.report.get(SDL2_CONFIG).is_none() {
            self.report.add(ProbeOutcome::found(
                SDL2_CONFIG,
                Requirement::Required,
                ProbeMethod::Helper,
            ));
        }

        let frameworks = self
            .options
            .frameworks
            .iter()
            .flat_map(|f| ["-framework".to_string(), f.clone()]);
        Ok(flags.append(FlagVar::LdFlags, "frameworks", frameworks))
    }

    /// Query `sdl2-config`; a missing helper is a missing required dependency.
    fn sdl2_config(&mut self, arg: &str) -> Result<Option<String>, ConfigureError> {
        match self.probe.helper(SDL2_CONFIG, &[arg]) {
            Ok(Some(out)) => Ok(Some(out)),
            Ok(None) => {
                self.missing(ProbeOutcome::missing(
                    SDL2_CONFIG,
                    Requirement::Required,
                    ProbeMethod::Helper,
                    format!("`{} {}` is unavailable or failed", SDL2_CONFIG, arg),
                ))?;
                Ok(None)
            }
            Err(e) => {
                self.tool_failed(
                    SDL2_CONFIG,
                    ProbeOutcome::missing(
                        SDL2_CONFIG,
                        Requirement::Required,
                        ProbeMethod::Helper,
                        format!("{:#}", e),
                    ),
                    e,
                )?;
                Ok(None)
            }
        }
    }

    fn embedded_flags(&mut self, flags: FlagSet) -> FlagSet {
        self.report.add(ProbeOutcome::found(
            EMBEDDED_GLES_LIB,
            Requirement::Required,
            ProbeMethod::Fixed,
        ));

        flags
            .append(
                FlagVar::IncFlags,
                "embedded",
                EMBEDDED_INCLUDE_DIRS.iter().map(|d| format!("-I{}", d)),
            )
            .append(FlagVar::LdFlags, "embedded", [format!("-L{}", EMBEDDED_LIB_DIR)])
            .with_lib("embedded", EMBEDDED_GLES_LIB)
    }

    fn linux_flags(&mut self, flags: FlagSet) -> Result<FlagSet, ConfigureError> {
        let flags = LINUX_PACKAGES
            .iter()
            .try_fold(flags, |flags, package| self.probe_package(flags, package))?;

        let flags = if self.check_library(&flags, "SDL2_ttf", Some("TTF_RenderUTF8_Blended")) {
            let flags = flags.with_lib("SDL2_ttf", "SDL2_ttf");
            self.check_header(flags, "SDL_ttf.h")
        } else {
            flags
        };

        let flags = if self.check_library(&flags, "openal", None) {
            let flags = flags.with_lib("openal", "openal");
            self.check_header(flags, "AL/al.h")
        } else {
            flags
        };

        Ok(flags)
    }

    /// Required pkg-config probe.
    fn probe_package(&mut self, flags: FlagSet, package: &str) -> Result<FlagSet, ConfigureError> {
        match self.probe.pkg_config(package) {
            Ok(Some(pkg)) => {
                self.report.add(ProbeOutcome::found(
                    package,
                    Requirement::Required,
                    ProbeMethod::PkgConfig,
                ));
                Ok(flags.with_pkg_config(package, &pkg))
            }
            Ok(None) => {
                self.missing(ProbeOutcome::missing(
                    package,
                    Requirement::Required,
                    ProbeMethod::PkgConfig,
                    format!("pkg-config has no package named `{}`", package),
                ))?;
                Ok(flags)
            }
            Err(e) => {
                self.tool_failed(
                    "pkg-config",
                    ProbeOutcome::missing(
                        package,
                        Requirement::Required,
                        ProbeMethod::PkgConfig,
                        format!("{:#}", e),
                    ),
                    e,
                )?;
                Ok(flags)
            }
        }
    }

    /// Optional library check. Never fails configuration.
    fn check_library(&mut self, flags: &FlagSet, library: &str, symbol: Option<&str>) -> bool {
        let name = format!("lib{}", library);
        let found = self
            .probe
            .have_library(library, symbol, flags)
            .unwrap_or_else(|e| {
                tracing::warn!("could not check for {}: {:#}", name, e);
                false
            });

        let outcome = if found {
            ProbeOutcome::found(&name, Requirement::Optional, ProbeMethod::Library)
        } else {
            let detail = match symbol {
                Some(symbol) => format!("could not link `{}` from {}", symbol, name),
                None => format!("could not link {}", name),
            };
            ProbeOutcome::missing(&name, Requirement::Optional, ProbeMethod::Library, detail)
        };
        self.report.add(outcome);
        found
    }

    /// Optional header check; defines `HAVE_<HEADER>` when found.
    fn check_header(&mut self, flags: FlagSet, header: &str) -> FlagSet {
        let define = header_define(header);
        let found = self.probe.have_header(header, &flags).unwrap_or_else(|e| {
            tracing::warn!("could not check for {}: {:#}", header, e);
            false
        });

        if found {
            self.report.add(
                ProbeOutcome::found(header, Requirement::Optional, ProbeMethod::Header)
                    .with_define(&define),
            );
            flags.with_define(header, &define)
        } else {
            self.report.add(
                ProbeOutcome::missing(
                    header,
                    Requirement::Optional,
                    ProbeMethod::Header,
                    format!("`{}` not found", header),
                )
                .with_define(&define),
            );
            flags
        }
    }

    /// Record a missing required dependency; fatal in fail-fast mode.
    fn missing(&mut self, outcome: ProbeOutcome) -> Result<(), ConfigureError> {
        tracing::debug!("missing required dependency `{}`", outcome.name);
        let err = ConfigureError::MissingDependency {
            name: outcome.name.clone(),
            detail: outcome.detail.clone().unwrap_or_default(),
        };
        self.report.add(outcome);

        match self.mode {
            ProbeMode::FailFast => Err(err),
            ProbeMode::Collect => Ok(()),
        }
    }

    /// Record a probe tool that could not run; fatal in fail-fast mode.
    fn tool_failed(
        &mut self,
        tool: &str,
        outcome: ProbeOutcome,
        err: anyhow::Error,
    ) -> Result<(), ConfigureError> {
        self.report.add(outcome);

        match self.mode {
            ProbeMode::FailFast => Err(ConfigureError::probe(tool, err)),
            ProbeMode::Collect => Ok(()),
        }
    }
}

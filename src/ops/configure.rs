//! Implementation of `extconf configure`.
//!
//! Detect → (Windows: abort) | select sources → resolve flags → write shims
//! → write the makefile. Every probe runs before anything is written.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::builder::makefile::{emit_build_descriptor, MAKEFILE_NAME};
use crate::builder::resolve::{resolve_flags, ResolveOptions};
use crate::builder::shim::{materialize_shims, preview_shims, MaterializedShim, ShimStatus};
use crate::core::dependency::DependencyReport;
use crate::core::flags::RenderedFlags;
use crate::core::platform::{detect_platform, Platform, PlatformProfile};
use crate::core::source_set::{select_source_set, SourceFileSet};
use crate::probe::SystemProbe;
use crate::util::config::Config;
use crate::util::fs::absolutize;
use crate::util::shell::{Shell, Status};

/// Options for the configure command.
#[derive(Debug, Clone)]
pub struct ConfigureOptions {
    /// Absolute project root
    pub project_root: PathBuf,

    /// Absolute directory receiving the shims and the makefile
    pub output_dir: PathBuf,

    /// Report what would be written without touching the filesystem
    pub plan_only: bool,
}

impl ConfigureOptions {
    /// Options using the configured output directory under `project_root`.
    pub fn new(config: &Config, project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let output_dir = absolutize(&project_root, &config.out_dir());
        ConfigureOptions {
            project_root,
            output_dir,
            plan_only: false,
        }
    }
}

/// Everything a configure run decided.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigureOutcome {
    pub name: String,
    pub profile: PlatformProfile,
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
    pub sources: SourceFileSet,
    pub shims: Vec<MaterializedShim>,
    pub dependencies: DependencyReport,
    pub flags: RenderedFlags,
    pub makefile: PathBuf,
    /// Whether this was a plan only and nothing was written
    pub planned: bool,
}

/// Tell the user which system libraries to install before probing.
pub fn print_intro(shell: &Shell, name: &str, profile: &PlatformProfile) {
    shell.print_line(format!(
        "The {} extension needs some system libraries installed system-wide.",
        name
    ));
    if let Some(url) = profile.platform().getting_started_url() {
        shell.print_line(format!("See {} for the list.", url));
    }
}

/// Run configure for the host described by `probe`.
pub fn configure(
    config: &Config,
    options: &ConfigureOptions,
    probe: &dyn SystemProbe,
    shell: &Arc<Shell>,
) -> Result<ConfigureOutcome> {
    let name = config.package_name();
    let span = shell.span(Status::Configuring, name);

    let profile = detect_platform(probe);
    profile.ensure_supported(name, config.windows_redirect())?;
    tracing::info!("configuring {} for {}", name, profile.platform());
    shell.status(
        Status::Found,
        format!("{} host `{}`", profile.platform(), profile.host()),
    );
    print_intro(shell, name, &profile);
    if config.static_dependencies() && profile.platform() != Platform::MacOs {
        shell.warn("static dependencies are only linked on macOS; ignoring");
    }

    let source_root = absolutize(&options.project_root, &config.source_root());
    let sources = select_source_set(&profile, &config.source_lists(), name)?;
    sources.verify_exists(&source_root)?;
    tracing::info!("selected {} sources", sources.len());

    let resolve_options =
        ResolveOptions::from_config(config, &options.project_root, &source_root, &options.output_dir)?;
    let resolution = resolve_flags(&profile, probe, &resolve_options)?;
    report_dependencies(shell, &resolution.report);

    let flags = resolution.flags.rendered();
    let makefile = options.output_dir.join(MAKEFILE_NAME);

    if options.plan_only {
        let shims = preview_shims(&sources, &source_root, &options.output_dir)?;
        return Ok(ConfigureOutcome {
            name: name.to_string(),
            profile,
            source_root,
            output_dir: options.output_dir.clone(),
            sources,
            shims,
            dependencies: resolution.report,
            flags,
            makefile,
            planned: true,
        });
    }

    let shims = materialize_shims(&sources, &source_root, &options.output_dir)?;
    report_shims(shell, &shims, &options.output_dir);

    let shim_files: Vec<_> = shims.iter().map(|s| s.shim.clone()).collect();
    let makefile = emit_build_descriptor(
        name,
        resolution.flags,
        &shim_files,
        &profile,
        &options.output_dir,
    )?;
    shell.status(Status::Writing, makefile.display());

    span.finish_with_message(format!("configured {}", name));

    Ok(ConfigureOutcome {
        name: name.to_string(),
        profile,
        source_root,
        output_dir: options.output_dir.clone(),
        sources,
        shims,
        dependencies: resolution.report,
        flags,
        makefile,
        planned: false,
    })
}

fn report_dependencies(shell: &Shell, report: &DependencyReport) {
    for outcome in report.outcomes() {
        if outcome.found {
            shell.status(Status::Found, format!("{} ({})", outcome.name, outcome.method));
        } else {
            shell.status(
                Status::Missing,
                format!(
                    "{} ({}, optional): {}",
                    outcome.name,
                    outcome.method,
                    outcome.detail.as_deref().unwrap_or("not found")
                ),
            );
        }
    }
}

fn report_shims(shell: &Shell, shims: &[MaterializedShim], output_dir: &Path) {
    let created = shims.iter().filter(|s| s.status == ShimStatus::Created).count();
    let updated = shims.iter().filter(|s| s.status == ShimStatus::Updated).count();
    let fresh = shims.len() - created - updated;

    if shell.is_verbose() {
        for shim in shims {
            let status = match shim.status {
                ShimStatus::Created => Status::Created,
                ShimStatus::Updated => Status::Updated,
                ShimStatus::Fresh => Status::Fresh,
            };
            shell.status(status, shim.shim.path_in(output_dir).display());
        }
    }

    shell.status(
        Status::Writing,
        format!(
            "{} shims in {} ({} created, {} updated, {} unchanged)",
            shims.len(),
            output_dir.display(),
            created,
            updated,
            fresh
        ),
    );
}

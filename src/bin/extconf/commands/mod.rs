//! Command implementations

pub mod clean;
pub mod completions;
pub mod configure;
pub mod doctor;
pub mod flags;

use anyhow::Result;

use crate::cli::ProjectArgs;
use extconf::ops::ConfigureOptions;
use extconf::util::fs::absolutize;
use extconf::util::{Config, GlobalContext};
use extconf::HostProbe;

/// Configuration and paths for one project, with CLI overrides applied.
pub struct Project {
    pub config: Config,
    pub options: ConfigureOptions,
}

/// Locate the project and merge global config, manifest and CLI options.
pub fn load_project(args: &ProjectArgs) -> Result<Project> {
    let ctx = GlobalContext::new()?;
    let root = ctx.project_root(args.root.as_deref());
    let mut config = ctx.load_config(&root)?;

    if let Some(name) = &args.name {
        config.package.name = Some(name.clone());
    }
    if let Some(out_dir) = &args.out_dir {
        config.build.out_dir = Some(absolutize(ctx.cwd(), out_dir));
    }
    if let Some(version) = &args.toolchain_version {
        config.build.toolchain_version = Some(version.clone());
    }

    tracing::debug!("project root {}", root.display());
    let options = ConfigureOptions::new(&config, root);
    Ok(Project { config, options })
}

/// Probe for the running host, or for the identifier given on the command line.
pub fn host_probe(args: &ProjectArgs) -> HostProbe {
    match &args.host_platform {
        Some(host) => HostProbe::new().with_host_identifier(host),
        None => HostProbe::new(),
    }
}

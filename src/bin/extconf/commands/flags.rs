//! `extconf flags` command

use anyhow::Result;

use super::{host_probe, load_project};
use crate::cli::FlagsArgs;
use extconf::ops::flags::{format_flags, resolve_project_flags, FlagsOptions};

pub fn execute(args: FlagsArgs) -> Result<()> {
    let mut project = load_project(&args.project)?;
    if args.enable_static_dependencies {
        project.config.build.static_dependencies = Some(true);
    }

    let probe = host_probe(&args.project);
    let (profile, flags) = resolve_project_flags(&project.config, &project.options, &probe)?;

    println!("# {} on {} ({})", project.config.package_name(), profile.platform(), profile.host());
    print!(
        "{}",
        format_flags(
            &flags,
            FlagsOptions {
                compile: args.compile,
                link: args.link,
            }
        )
    );

    Ok(())
}

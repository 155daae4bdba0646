//! `extconf configure` command

use std::sync::Arc;

use anyhow::Result;

use super::{host_probe, load_project};
use crate::cli::ConfigureArgs;
use extconf::ops::configure::configure;
use extconf::util::shell::{Shell, ShellMode, Status};

pub fn execute(args: ConfigureArgs, shell: &Arc<Shell>) -> Result<()> {
    let mut project = load_project(&args.project)?;
    if args.enable_static_dependencies {
        project.config.build.static_dependencies = Some(true);
    }
    project.options.plan_only = args.plan;

    let probe = host_probe(&args.project);

    if args.plan {
        // Human output would interleave with the JSON on stdout
        let json = Arc::new(Shell::new(ShellMode::Json));
        let outcome = configure(&project.config, &project.options, &probe, &json)?;
        json.json_event(&serde_json::to_value(&outcome)?);
        return Ok(());
    }

    let outcome = configure(&project.config, &project.options, &probe, shell)?;

    let features: Vec<&str> = outcome.dependencies.enabled_features().collect();
    if !features.is_empty() {
        shell.status(Status::Info, format!("enabled {}", features.join(", ")));
    }
    shell.note(format!(
        "run `make -C {}` to build {}",
        outcome.output_dir.display(),
        outcome.name
    ));

    Ok(())
}

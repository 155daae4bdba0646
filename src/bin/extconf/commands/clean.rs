//! `extconf clean` command

use std::sync::Arc;

use anyhow::Result;

use super::load_project;
use crate::cli::CleanArgs;
use extconf::ops::clean;
use extconf::util::shell::{Shell, Status};

pub fn execute(args: CleanArgs, shell: &Arc<Shell>) -> Result<()> {
    let project = load_project(&args.project)?;
    let output_dir = &project.options.output_dir;

    let removed = clean(&project.config.source_lists(), output_dir)?;

    if shell.is_verbose() {
        for file in &removed {
            shell.status(Status::Removed, file.display());
        }
    }
    if removed.is_empty() {
        shell.status(Status::Fresh, format!("nothing to clean in {}", output_dir.display()));
    } else {
        shell.status(
            Status::Removed,
            format!("{} files from {}", removed.len(), output_dir.display()),
        );
    }

    Ok(())
}

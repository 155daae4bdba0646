//! `extconf doctor` command

use anyhow::Result;

use super::{host_probe, load_project};
use crate::cli::DoctorArgs;
use extconf::ops::{doctor, format_report};

pub fn execute(args: DoctorArgs, verbose: bool) -> Result<()> {
    let project = load_project(&args.project)?;
    let probe = host_probe(&args.project);

    let report = doctor(&project.config, &project.options, &probe)?;

    // Print the formatted report
    print!("{}", format_report(&report, verbose));

    // Exit with error code if required checks failed
    if !report.all_required_passed() {
        std::process::exit(1);
    }

    Ok(())
}

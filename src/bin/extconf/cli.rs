//! CLI definitions using clap.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use extconf::util::shell::ColorChoice;

/// extconf - configure the Gosu native extension for this host
#[derive(Parser)]
#[command(name = "extconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the system and write the shims and the Makefile
    Configure(ConfigureArgs),

    /// Show the resolved compile and link flags
    Flags(FlagsArgs),

    /// Check the host for every tool and library configure needs
    Doctor(DoctorArgs),

    /// Remove the generated Makefile and shims
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options locating the project, shared by every command.
#[derive(Args, Clone)]
pub struct ProjectArgs {
    /// Project root (defaults to the directory holding extconf.toml)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory receiving the shims and the Makefile
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Library name (defaults to the manifest's, then `gosu`)
    #[arg(long)]
    pub name: Option<String>,

    /// Pretend to be this host platform identifier, e.g. `x64-mingw32`
    #[arg(long, value_name = "IDENTIFIER")]
    pub host_platform: Option<String>,

    /// Version of the makefile generator consuming the output
    #[arg(long, value_name = "VERSION")]
    pub toolchain_version: Option<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Link SDL2 from static archives on macOS
    #[arg(
        long,
        env = "EXTCONF_STATIC_DEPENDENCIES",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub enable_static_dependencies: bool,

    /// Print the configure plan as JSON without writing anything
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Resolve as if static dependencies were enabled
    #[arg(long)]
    pub enable_static_dependencies: bool,
}

#[derive(Args)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

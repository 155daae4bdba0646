//! Implementation of `extconf flags`.

use std::fmt::Write;

use anyhow::Result;

use crate::builder::resolve::{resolve_flags, ResolveOptions};
use crate::core::flags::{FlagSet, FlagVar};
use crate::core::platform::{detect_platform, PlatformProfile};
use crate::ops::configure::ConfigureOptions;
use crate::probe::SystemProbe;
use crate::util::config::Config;
use crate::util::fs::absolutize;

/// Which sections to print.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlagsOptions {
    /// Only compile variables
    pub compile: bool,
    /// Only link variables
    pub link: bool,
}

impl FlagsOptions {
    fn includes(&self, var: FlagVar) -> bool {
        match (self.compile, self.link) {
            (true, false) => var.is_compile(),
            (false, true) => !var.is_compile(),
            _ => true,
        }
    }
}

/// Resolve the flag set a configure run would use, writing nothing.
pub fn resolve_project_flags(
    config: &Config,
    options: &ConfigureOptions,
    probe: &dyn SystemProbe,
) -> Result<(PlatformProfile, FlagSet)> {
    let name = config.package_name();
    let profile = detect_platform(probe);
    profile.ensure_supported(name, config.windows_redirect())?;

    let source_root = absolutize(&options.project_root, &config.source_root());
    let resolve_options =
        ResolveOptions::from_config(config, &options.project_root, &source_root, &options.output_dir)?;
    let resolution = resolve_flags(&profile, probe, &resolve_options)?;

    Ok((profile, resolution.flags))
}

/// Render flags one section per variable, each flag annotated with where it
/// came from.
pub fn format_flags(flags: &FlagSet, options: FlagsOptions) -> String {
    let mut out = String::new();

    for var in FlagVar::ALL.into_iter().filter(|v| options.includes(*v)) {
        let _ = writeln!(out, "{}:", var);
        let entries = flags.entries(var);
        if entries.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for flag in entries {
            let _ = writeln!(out, "  {:<40} # from: {}", flag.value, flag.provenance);
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlagSet {
        FlagSet::new()
            .append(FlagVar::CFlags, "base", ["-DGOSU_DEPRECATED="])
            .append(FlagVar::IncFlags, "pkg-config sdl2", ["-I/usr/include/SDL2"])
            .with_lib("pkg-config sdl2", "SDL2")
    }

    #[test]
    fn test_format_all_sections() {
        let text = format_flags(&sample(), FlagsOptions::default());

        for var in FlagVar::ALL {
            assert!(text.contains(&format!("{}:\n", var)), "missing {}", var);
        }
        assert!(text.contains("-I/usr/include/SDL2"));
        assert!(text.contains("# from: pkg-config sdl2"));
        assert!(text.contains("# from: base"));
    }

    #[test]
    fn test_format_compile_only() {
        let text = format_flags(
            &sample(),
            FlagsOptions {
                compile: true,
                link: false,
            },
        );
        assert!(text.contains("CFLAGS:"));
        assert!(!text.contains("LIBS:"));
        assert!(!text.contains("-lSDL2"));
    }

    #[test]
    fn test_format_link_only() {
        let text = format_flags(
            &sample(),
            FlagsOptions {
                compile: false,
                link: true,
            },
        );
        assert!(text.contains("LIBS:\n  -lSDL2"));
        assert!(!text.contains("INCFLAGS:"));
    }

    #[test]
    fn test_resolve_project_flags() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = Config::default();
        let options = ConfigureOptions::new(&config, tmp.path());
        let probe = crate::test_support::MockProbe::macos("14.0.0");

        let (profile, flags) = resolve_project_flags(&config, &options, &probe).unwrap();
        assert_eq!(profile.kernel_major(), 14);
        assert!(flags.contains(FlagVar::LdFlags, "-liconv"));
        assert!(!tmp.path().join("ext").exists());
    }
}

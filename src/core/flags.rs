//! Compiler and linker flag sets.
//!
//! A `FlagSet` is built by folding steps over an immutable value: every
//! builder method consumes the set and returns the extended one. Flags keep
//! their insertion order because some toolchains are order-sensitive, and each
//! flag remembers where it came from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probe::PkgConfigFlags;

/// Makefile variable a flag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagVar {
    IncFlags,
    CppFlags,
    CFlags,
    CxxFlags,
    LdFlags,
    Libs,
}

impl FlagVar {
    /// Every variable, in makefile order.
    pub const ALL: [FlagVar; 6] = [
        FlagVar::IncFlags,
        FlagVar::CppFlags,
        FlagVar::CFlags,
        FlagVar::CxxFlags,
        FlagVar::LdFlags,
        FlagVar::Libs,
    ];

    /// Makefile variable name.
    pub fn name(&self) -> &'static str {
        match self {
            FlagVar::IncFlags => "INCFLAGS",
            FlagVar::CppFlags => "CPPFLAGS",
            FlagVar::CFlags => "CFLAGS",
            FlagVar::CxxFlags => "CXXFLAGS",
            FlagVar::LdFlags => "LDFLAGS",
            FlagVar::Libs => "LIBS",
        }
    }

    /// Whether the variable is used when compiling (as opposed to linking).
    pub fn is_compile(&self) -> bool {
        !matches!(self, FlagVar::LdFlags | FlagVar::Libs)
    }
}

impl fmt::Display for FlagVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single flag with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flag {
    pub value: String,
    pub provenance: String,
}

/// Flags inherited from the environment or configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainDefaults {
    pub cflags: Vec<String>,
    pub cxxflags: Vec<String>,
    pub ldflags: Vec<String>,
}

impl ToolchainDefaults {
    /// Read `CFLAGS`, `CXXFLAGS` and `LDFLAGS` from the environment and
    /// append configured extras.
    pub fn from_env(cflags: &[String], cxxflags: &[String], ldflags: &[String]) -> Self {
        let env_flags = |key: &str| {
            std::env::var(key)
                .map(|v| split_flags(&v))
                .unwrap_or_default()
        };

        ToolchainDefaults {
            cflags: env_flags("CFLAGS").into_iter().chain(cflags.iter().cloned()).collect(),
            cxxflags: env_flags("CXXFLAGS")
                .into_iter()
                .chain(cxxflags.iter().cloned())
                .collect(),
            ldflags: env_flags("LDFLAGS")
                .into_iter()
                .chain(ldflags.iter().cloned())
                .collect(),
        }
    }
}

/// Accumulated compiler and linker flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlagSet {
    incflags: Vec<Flag>,
    cppflags: Vec<Flag>,
    cflags: Vec<Flag>,
    cxxflags: Vec<Flag>,
    ldflags: Vec<Flag>,
    libs: Vec<Flag>,
}

/// Provenance of flags inherited from the toolchain defaults.
pub const DEFAULTS_PROVENANCE: &str = "toolchain defaults";

impl FlagSet {
    pub fn new() -> Self {
        FlagSet::default()
    }

    /// Seed a flag set with the toolchain defaults.
    pub fn from_defaults(defaults: &ToolchainDefaults) -> Self {
        FlagSet::new()
            .append(FlagVar::CFlags, DEFAULTS_PROVENANCE, &defaults.cflags)
            .append(FlagVar::CxxFlags, DEFAULTS_PROVENANCE, &defaults.cxxflags)
            .append(FlagVar::LdFlags, DEFAULTS_PROVENANCE, &defaults.ldflags)
    }

    fn entries_mut(&mut self, var: FlagVar) -> &mut Vec<Flag> {
        match var {
            FlagVar::IncFlags => &mut self.incflags,
            FlagVar::CppFlags => &mut self.cppflags,
            FlagVar::CFlags => &mut self.cflags,
            FlagVar::CxxFlags => &mut self.cxxflags,
            FlagVar::LdFlags => &mut self.ldflags,
            FlagVar::Libs => &mut self.libs,
        }
    }

    /// Flags of one variable, in insertion order.
    pub fn entries(&self, var: FlagVar) -> &[Flag] {
        match var {
            FlagVar::IncFlags => &self.incflags,
            FlagVar::CppFlags => &self.cppflags,
            FlagVar::CFlags => &self.cflags,
            FlagVar::CxxFlags => &self.cxxflags,
            FlagVar::LdFlags => &self.ldflags,
            FlagVar::Libs => &self.libs,
        }
    }

    /// Append flags to a variable.
    pub fn append<I, S>(mut self, var: FlagVar, provenance: &str, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = self.entries_mut(var);
        for flag in flags {
            let value = flag.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            entries.push(Flag {
                value: value.to_string(),
                provenance: provenance.to_string(),
            });
        }
        self
    }

    /// Append a whitespace-separated flag string to a variable.
    pub fn append_str(self, var: FlagVar, provenance: &str, flags: &str) -> Self {
        self.append(var, provenance, split_flags(flags))
    }

    /// Add a preprocessor define (`-DNAME`).
    pub fn with_define(self, provenance: &str, name: &str) -> Self {
        self.append(FlagVar::CppFlags, provenance, [format!("-D{}", name)])
    }

    /// Link a library by name. Libraries already present are not repeated.
    pub fn with_lib(mut self, provenance: &str, name: &str) -> Self {
        let value = if name.starts_with("-l") {
            name.to_string()
        } else {
            format!("-l{}", name)
        };

        if !self.libs.iter().any(|f| f.value == value) {
            self.libs.push(Flag {
                value,
                provenance: provenance.to_string(),
            });
        }
        self
    }

    /// Fold in the output of a pkg-config query.
    ///
    /// `-I` flags go to INCFLAGS, other compile flags to CFLAGS, `-l` flags
    /// to LIBS and other link flags to LDFLAGS.
    pub fn with_pkg_config(self, package: &str, pkg: &PkgConfigFlags) -> Self {
        let provenance = format!("pkg-config {}", package);
        let (includes, cflags): (Vec<&String>, Vec<&String>) =
            pkg.cflags.iter().partition(|f| f.starts_with("-I"));
        let (libs, ldflags): (Vec<&String>, Vec<&String>) =
            pkg.libs.iter().partition(|f| f.starts_with("-l"));

        let flags = self
            .append(FlagVar::IncFlags, &provenance, includes)
            .append(FlagVar::CFlags, &provenance, cflags)
            .append(FlagVar::LdFlags, &provenance, ldflags);

        libs.into_iter()
            .fold(flags, |flags, lib| flags.with_lib(&provenance, lib))
    }

    /// Prefix the C++ flags with the C flags.
    ///
    /// For makefile generators that ignore the C++-only variable.
    pub fn with_merged_cxxflags(mut self) -> Self {
        let mut merged = self.cflags.clone();
        merged.append(&mut self.cxxflags);
        self.cxxflags = merged;
        self
    }

    /// Whether a variable already contains a flag.
    pub fn contains(&self, var: FlagVar, value: &str) -> bool {
        self.entries(var).iter().any(|f| f.value == value)
    }

    /// Render one variable as a space-separated string.
    pub fn render(&self, var: FlagVar) -> String {
        self.entries(var)
            .iter()
            .map(|f| f.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Arguments for preprocessing or compiling a C test program.
    pub fn compile_args(&self) -> Vec<String> {
        [FlagVar::IncFlags, FlagVar::CppFlags, FlagVar::CFlags]
            .iter()
            .flat_map(|var| self.entries(*var))
            .map(|f| f.value.clone())
            .collect()
    }

    /// Arguments for linking a test program.
    pub fn link_args(&self) -> Vec<String> {
        [FlagVar::LdFlags, FlagVar::Libs]
            .iter()
            .flat_map(|var| self.entries(*var))
            .map(|f| f.value.clone())
            .collect()
    }

    /// Render every variable, for plans and comparisons.
    pub fn rendered(&self) -> RenderedFlags {
        RenderedFlags {
            incflags: self.render(FlagVar::IncFlags),
            cppflags: self.render(FlagVar::CppFlags),
            cflags: self.render(FlagVar::CFlags),
            cxxflags: self.render(FlagVar::CxxFlags),
            ldflags: self.render(FlagVar::LdFlags),
            libs: self.render(FlagVar::Libs),
        }
    }
}

/// Final flag strings, one per makefile variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedFlags {
    pub incflags: String,
    pub cppflags: String,
    pub cflags: String,
    pub cxxflags: String,
    pub ldflags: String,
    pub libs: String,
}

/// Split a flag string on whitespace.
pub fn split_flags(s: &str) -> Vec<String> {
    s.split_whitespace().map(str::to_string).collect()
}

/// Preprocessor symbol set when a header is found, e.g. `HAVE_AL_AL_H`.
pub fn header_define(header: &str) -> String {
    let symbol: String = header
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("HAVE_{}", symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let flags = FlagSet::new()
            .append_str(FlagVar::CxxFlags, "macos", "-x objective-c++")
            .append(FlagVar::CxxFlags, "macos", ["-std=gnu++11", "-stdlib=libc++"]);

        assert_eq!(
            flags.render(FlagVar::CxxFlags),
            "-x objective-c++ -std=gnu++11 -stdlib=libc++"
        );
    }

    #[test]
    fn test_append_skips_empty() {
        let flags = FlagSet::new().append(FlagVar::CFlags, "test", ["", "  ", "-O2"]);
        assert_eq!(flags.entries(FlagVar::CFlags).len(), 1);
    }

    #[test]
    fn test_from_defaults() {
        let defaults = ToolchainDefaults {
            cflags: vec!["-O2".to_string()],
            cxxflags: vec![],
            ldflags: vec!["-L/opt/lib".to_string()],
        };
        let flags = FlagSet::from_defaults(&defaults).append(FlagVar::CFlags, "base", ["-g"]);

        assert_eq!(flags.render(FlagVar::CFlags), "-O2 -g");
        assert_eq!(flags.entries(FlagVar::CFlags)[0].provenance, DEFAULTS_PROVENANCE);
        assert_eq!(flags.render(FlagVar::LdFlags), "-L/opt/lib");
    }

    #[test]
    fn test_libs_are_deduplicated() {
        let flags = FlagSet::new()
            .with_lib("a", "openal")
            .with_lib("b", "-lopenal")
            .with_lib("c", "SDL2_ttf");

        assert_eq!(flags.render(FlagVar::Libs), "-lopenal -lSDL2_ttf");
        assert_eq!(flags.entries(FlagVar::Libs)[0].provenance, "a");
    }

    #[test]
    fn test_pkg_config_partition() {
        let pkg = PkgConfigFlags {
            cflags: split_flags("-I/usr/include/SDL2 -D_REENTRANT"),
            libs: split_flags("-L/usr/lib -Wl,--as-needed -lSDL2"),
        };
        let flags = FlagSet::new().with_pkg_config("sdl2", &pkg);

        assert_eq!(flags.render(FlagVar::IncFlags), "-I/usr/include/SDL2");
        assert_eq!(flags.render(FlagVar::CFlags), "-D_REENTRANT");
        assert_eq!(flags.render(FlagVar::LdFlags), "-L/usr/lib -Wl,--as-needed");
        assert_eq!(flags.render(FlagVar::Libs), "-lSDL2");
        assert_eq!(flags.entries(FlagVar::Libs)[0].provenance, "pkg-config sdl2");
    }

    #[test]
    fn test_merged_cxxflags() {
        let flags = FlagSet::new()
            .append(FlagVar::CFlags, "base", ["-DGOSU_DEPRECATED="])
            .append(FlagVar::CxxFlags, "macos", ["-stdlib=libc++"])
            .with_merged_cxxflags();

        assert_eq!(
            flags.render(FlagVar::CxxFlags),
            "-DGOSU_DEPRECATED= -stdlib=libc++"
        );
        assert_eq!(flags.render(FlagVar::CFlags), "-DGOSU_DEPRECATED=");
    }

    #[test]
    fn test_compile_and_link_args() {
        let flags = FlagSet::new()
            .append(FlagVar::IncFlags, "t", ["-I/inc"])
            .with_define("t", "HAVE_X_H")
            .append(FlagVar::CFlags, "t", ["-O2"])
            .append(FlagVar::LdFlags, "t", ["-L/lib"])
            .with_lib("t", "m");

        assert_eq!(flags.compile_args(), vec!["-I/inc", "-DHAVE_X_H", "-O2"]);
        assert_eq!(flags.link_args(), vec!["-L/lib", "-lm"]);
    }

    #[test]
    fn test_header_define() {
        assert_eq!(header_define("SDL_ttf.h"), "HAVE_SDL_TTF_H");
        assert_eq!(header_define("AL/al.h"), "HAVE_AL_AL_H");
    }

    #[test]
    fn test_flag_var_names() {
        let names: Vec<_> = FlagVar::ALL.iter().map(FlagVar::name).collect();
        assert_eq!(
            names,
            vec!["INCFLAGS", "CPPFLAGS", "CFLAGS", "CXXFLAGS", "LDFLAGS", "LIBS"]
        );
        assert!(FlagVar::CxxFlags.is_compile());
        assert!(!FlagVar::Libs.is_compile());
    }
}

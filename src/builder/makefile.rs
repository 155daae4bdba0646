//! Makefile emission.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::shim::ShimFile;
use crate::core::errors::ConfigureError;
use crate::core::flags::{FlagSet, FlagVar};
use crate::core::platform::{Platform, PlatformProfile};
use crate::util::fs::write_atomic;

/// File name of the build descriptor.
pub const MAKEFILE_NAME: &str = "Makefile";

/// Object file name for a shim.
pub fn object_name(shim_name: &str) -> String {
    Path::new(shim_name)
        .with_extension("o")
        .to_string_lossy()
        .into_owned()
}

fn link_mode(platform: Platform) -> &'static str {
    match platform {
        Platform::MacOs => "-bundle -undefined dynamic_lookup",
        Platform::Linux | Platform::LinuxEmbedded | Platform::Windows => "-shared",
    }
}

fn pic_flag(platform: Platform) -> &'static str {
    match platform {
        Platform::Linux | Platform::LinuxEmbedded => "-fPIC",
        Platform::MacOs | Platform::Windows => "",
    }
}

fn assign(out: &mut String, var: &str, value: &str) {
    if value.is_empty() {
        out.push_str(&format!("{} =\n", var));
    } else {
        out.push_str(&format!("{} = {}\n", var, value));
    }
}

/// Render the makefile text.
pub fn render_makefile(
    name: &str,
    flags: &FlagSet,
    shims: &[ShimFile],
    platform: Platform,
) -> String {
    let srcs: Vec<&str> = shims.iter().map(|s| s.name.as_str()).collect();
    let objs: Vec<String> = shims.iter().map(|s| object_name(&s.name)).collect();

    let mut out = String::new();
    out.push_str(&format!(
        "# Generated by extconf for {} ({}). Changes are overwritten.\n\n",
        name, platform
    ));

    assign(&mut out, "TARGET", name);
    assign(&mut out, "DLEXT", platform.module_extension());
    assign(&mut out, "DLLIB", "$(TARGET).$(DLEXT)");
    out.push('\n');

    assign(&mut out, "CC", "cc");
    assign(&mut out, "CXX", "c++");
    assign(&mut out, "PICFLAG", pic_flag(platform));
    assign(&mut out, "DLDFLAGS", link_mode(platform));
    out.push('\n');

    for var in FlagVar::ALL {
        assign(&mut out, var.name(), &flags.render(var));
    }
    out.push('\n');

    assign(&mut out, "SRCS", &srcs.join(" "));
    assign(&mut out, "OBJS", &objs.join(" "));
    out.push('\n');

    out.push_str(
        "all: $(DLLIB)\n\
         \n\
         $(DLLIB): $(OBJS)\n\
         \t$(CXX) $(DLDFLAGS) -o $@ $(OBJS) $(LDFLAGS) $(LIBS)\n\
         \n\
         %.o: %.c\n\
         \t$(CC) $(INCFLAGS) $(CPPFLAGS) $(CFLAGS) $(PICFLAG) -c $< -o $@\n\
         \n\
         %.o: %.cpp\n\
         \t$(CXX) $(INCFLAGS) $(CPPFLAGS) $(CXXFLAGS) $(PICFLAG) -c $< -o $@\n\
         \n\
         clean:\n\
         \trm -f $(OBJS) $(DLLIB)\n\
         \n\
         .PHONY: all clean\n",
    );

    out
}

/// Write `output_dir/Makefile`, consuming the flag set.
pub fn emit_build_descriptor(
    name: &str,
    flags: FlagSet,
    shims: &[ShimFile],
    profile: &PlatformProfile,
    output_dir: &Path,
) -> Result<PathBuf, ConfigureError> {
    if profile.platform() == Platform::Windows {
        return Err(profile.unsupported(name));
    }

    let contents = render_makefile(name, &flags, shims, profile.platform());
    let path = output_dir.join(MAKEFILE_NAME);

    fs::create_dir_all(output_dir).map_err(|e| ConfigureError::filesystem(output_dir, e))?;
    write_atomic(&path, contents.as_bytes()).map_err(|e| ConfigureError::filesystem(&path, e))?;

    tracing::info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn shims() -> Vec<ShimFile> {
        vec![
            ShimFile::new(Path::new("Window.cpp"), "../../src"),
            ShimFile::new(Path::new("Audio/Audio.mm"), "../../src"),
            ShimFile::new(Path::new("stb_vorbis.c"), "../../src"),
        ]
    }

    fn flags() -> FlagSet {
        FlagSet::new()
            .append(FlagVar::CFlags, "base", ["-DGOSU_DEPRECATED="])
            .append(FlagVar::IncFlags, "base", ["-I../..", "-I../../src"])
            .with_define("header AL/al.h", "HAVE_AL_AL_H")
            .with_lib("pkg-config sdl2", "SDL2")
    }

    #[test]
    fn test_object_name() {
        assert_eq!(object_name("Graphics-Texture.cpp"), "Graphics-Texture.o");
        assert_eq!(object_name("stb_vorbis.c"), "stb_vorbis.o");
    }

    #[test]
    fn test_linux_makefile() {
        let text = render_makefile("gosu", &flags(), &shims(), Platform::Linux);

        assert!(text.contains("TARGET = gosu\n"));
        assert!(text.contains("DLEXT = so\n"));
        assert!(text.contains("PICFLAG = -fPIC\n"));
        assert!(text.contains("DLDFLAGS = -shared\n"));
        assert!(text.contains("INCFLAGS = -I../.. -I../../src\n"));
        assert!(text.contains("CPPFLAGS = -DHAVE_AL_AL_H\n"));
        assert!(text.contains("CFLAGS = -DGOSU_DEPRECATED=\n"));
        assert!(text.contains("CXXFLAGS =\n"));
        assert!(text.contains("LIBS = -lSDL2\n"));
        assert!(text.contains("SRCS = Window.cpp Audio-Audio.cpp stb_vorbis.c\n"));
        assert!(text.contains("OBJS = Window.o Audio-Audio.o stb_vorbis.o\n"));
        assert!(text.contains("%.o: %.c\n\t$(CC)"));
        assert!(text.contains("%.o: %.cpp\n\t$(CXX)"));
        assert!(text.contains("clean:\n\trm -f $(OBJS) $(DLLIB)\n"));
    }

    #[test]
    fn test_macos_makefile() {
        let text = render_makefile("gosu", &flags(), &shims(), Platform::MacOs);

        assert!(text.contains("DLEXT = bundle\n"));
        assert!(text.contains("DLDFLAGS = -bundle -undefined dynamic_lookup\n"));
        assert!(text.contains("PICFLAG =\n"));
    }

    #[test]
    fn test_emit_writes_makefile() {
        let tmp = TempDir::new().unwrap();
        let profile = PlatformProfile::new(Platform::Linux, "x86_64-linux", "6.1.0");
        let out = tmp.path().join("ext/gosu");

        let path = emit_build_descriptor("gosu", flags(), &shims(), &profile, &out).unwrap();

        assert_eq!(path, out.join(MAKEFILE_NAME));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# Generated by extconf for gosu (linux)"));
    }

    #[test]
    fn test_emit_refuses_windows() {
        let tmp = TempDir::new().unwrap();
        let profile = PlatformProfile::new(Platform::Windows, "x64-mingw32", "");

        let err = emit_build_descriptor("gosu", flags(), &shims(), &profile, tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigureError::UnsupportedPlatform { .. }));
        assert!(!tmp.path().join(MAKEFILE_NAME).exists());
    }
}

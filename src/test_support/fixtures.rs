//! Test fixtures for common test scenarios.
//!
//! Fixture projects are laid out the way configure expects them: sources
//! under `src/`, an optional `extconf.toml` at the root.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::core::source_set::SourceLists;
use crate::util::config::MANIFEST_NAME;

/// Write a placeholder translation unit for every path in `lists` under
/// `source_root`.
pub fn write_sources(source_root: &Path, lists: &SourceLists) -> std::io::Result<()> {
    for source in lists.all() {
        let path = source_root.join(&source);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("// {}\n", source.display()))?;
    }
    Ok(())
}

/// A temporary project containing every default Gosu source under `src/`.
pub fn gosu_project() -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_sources(&tmp.path().join("src"), &SourceLists::default())
        .expect("failed to write fixture sources");
    tmp
}

/// A temporary project with a manifest and the sources it lists.
pub fn project_with_manifest(manifest: &str) -> TempDir {
    let tmp = TempDir::new().expect("failed to create temp dir");
    fs::write(tmp.path().join(MANIFEST_NAME), manifest).expect("failed to write manifest");

    let config = crate::util::config::Config::load(&tmp.path().join(MANIFEST_NAME))
        .expect("fixture manifest must parse");
    write_sources(&tmp.path().join(config.source_root()), &config.source_lists())
        .expect("failed to write fixture sources");
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gosu_project_layout() {
        let project = gosu_project();
        assert!(project.path().join("src/Graphics/Texture.cpp").is_file());
        assert!(project.path().join("src/Audio/Audio.mm").is_file());
        assert!(project.path().join("src/stb_vorbis.c").is_file());
    }

    #[test]
    fn test_project_with_manifest() {
        let project = project_with_manifest(
            "[package]\nname = \"tiny\"\n\n[sources]\nroot = \"lib\"\nbase = [\"core.c\"]\nmacos = [\"mac.mm\"]\nlinux = [\"linux.cpp\"]\n",
        );
        assert!(project.path().join("lib/core.c").is_file());
        assert!(project.path().join("lib/mac.mm").is_file());
        assert!(project.path().join(MANIFEST_NAME).is_file());
    }
}

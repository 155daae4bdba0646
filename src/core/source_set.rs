//! Source file sets.
//!
//! A source set is the ordered list of translation units compiled for one
//! platform: the base subset followed by exactly one platform subset.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigureError;
use crate::core::platform::{Platform, PlatformProfile};

/// Sources compiled on every platform.
pub const BASE_SOURCES: &[&str] = &[
    "Bitmap/Bitmap.cpp",
    "Bitmap/BitmapIO.cpp",
    "DirectoriesUnix.cpp",
    "FileUnix.cpp",
    "Graphics/BlockAllocator.cpp",
    "Graphics/Color.cpp",
    "Graphics/Graphics.cpp",
    "Graphics/Image.cpp",
    "Graphics/LargeImageData.cpp",
    "Graphics/Macro.cpp",
    "Graphics/Resolution.cpp",
    "Graphics/TexChunk.cpp",
    "Graphics/Texture.cpp",
    "Graphics/Transform.cpp",
    "Input/Input.cpp",
    "Input/TextInput.cpp",
    "Inspection.cpp",
    "IO.cpp",
    "Math.cpp",
    "Text/Font.cpp",
    "Text/Text.cpp",
    "Utility.cpp",
    "Window.cpp",
    "stb_vorbis.c",
];

/// Sources compiled only on macOS.
pub const MACOS_SOURCES: &[&str] = &[
    "Audio/Audio.mm",
    "Graphics/ResolutionApple.mm",
    "Text/TextApple.mm",
    "TimingApple.cpp",
    "UtilityApple.mm",
];

/// Sources compiled only on Linux.
pub const LINUX_SOURCES: &[&str] = &["Audio/Audio.cpp", "Text/TextUnix.cpp", "TimingUnix.cpp"];

fn to_paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(|s| PathBuf::from(*s)).collect()
}

/// The configured source lists for every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLists {
    pub base: Vec<PathBuf>,
    pub macos: Vec<PathBuf>,
    pub linux: Vec<PathBuf>,
}

impl Default for SourceLists {
    fn default() -> Self {
        SourceLists {
            base: to_paths(BASE_SOURCES),
            macos: to_paths(MACOS_SOURCES),
            linux: to_paths(LINUX_SOURCES),
        }
    }
}

impl SourceLists {
    /// Every source of every platform, first occurrence wins.
    pub fn all(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        self.base
            .iter()
            .chain(&self.macos)
            .chain(&self.linux)
            .filter(|p| seen.insert(p.as_path()))
            .cloned()
            .collect()
    }
}

/// Ordered, duplicate-free set of sources for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFileSet {
    base: Vec<PathBuf>,
    platform: Vec<PathBuf>,
}

impl SourceFileSet {
    /// Create a source set, rejecting duplicates across both subsets.
    pub fn new(base: Vec<PathBuf>, platform: Vec<PathBuf>) -> Result<Self, ConfigureError> {
        let mut seen = HashSet::new();
        for path in base.iter().chain(&platform) {
            if !seen.insert(path.as_path()) {
                return Err(ConfigureError::DuplicateSource { path: path.clone() });
            }
        }

        Ok(SourceFileSet { base, platform })
    }

    /// Sources compiled on every platform.
    pub fn base(&self) -> &[PathBuf] {
        &self.base
    }

    /// Sources specific to the selected platform.
    pub fn platform(&self) -> &[PathBuf] {
        &self.platform
    }

    /// All sources, base first.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.base.iter().chain(&self.platform).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.platform.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.iter().any(|p| p == path)
    }

    /// Check that every source exists under `source_root`.
    pub fn verify_exists(&self, source_root: &Path) -> Result<(), ConfigureError> {
        for path in self.iter() {
            let full = source_root.join(path);
            if !full.is_file() {
                return Err(ConfigureError::MissingSource { path: full });
            }
        }
        Ok(())
    }
}

/// Select the sources for a platform: base plus exactly one platform subset.
pub fn select_source_set(
    profile: &PlatformProfile,
    lists: &SourceLists,
    name: &str,
) -> Result<SourceFileSet, ConfigureError> {
    let platform_sources = match profile.platform() {
        Platform::MacOs => &lists.macos,
        Platform::Linux | Platform::LinuxEmbedded => &lists.linux,
        Platform::Windows => return Err(profile.unsupported(name)),
    };

    SourceFileSet::new(lists.base.clone(), platform_sources.clone())
}
